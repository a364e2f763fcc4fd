//! # Domain Entities
//!
//! Core domain entities of the platform. All entities map directly to their
//! corresponding database tables.
//!
//! - **User**: account with optional password and Telegram identity
//! - **AuthCode**: one-time Telegram login code
//! - **Event / Task**: timed writing events and their assignments
//! - **Post / Comment**: published work and rated reviews
//! - **Subscription**: follower relation
//! - **Notification**: comment and subscription alerts
//! - **Report**: admin aggregates over published posts
//!
//! Each entity has an associated repository trait defining data access
//! operations, implemented in the infrastructure layer.

mod user;
mod auth_code;
mod event;
mod post;
mod comment;
mod subscription;
mod notification;
mod report;

pub use user::{NewUser, ProfileChanges, User, UserRepository, UserSummary, UserWithRole};

pub use auth_code::{normalize_code, AuthCode, AuthCodeRepository, CODE_LENGTH};

pub use event::{validate_window, Event, EventDraft, EventRepository, Task, TaskDraft, TaskRepository};

pub use post::{
    total_pages, NewPost, Post, PostChanges, PostPage, PostPeriod, PostQuery, PostRepository,
    PostSort, PostStatus, PostView, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

pub use comment::{Comment, CommentRepository, NewComment, RatedComment};

pub use subscription::{FollowCounts, SubscriptionRepository};

pub use notification::{NewNotification, Notification, NotificationKind, NotificationRepository};

pub use report::{
    round2, AuthorStanding, PostReport, PostStanding, ReportRange, ReportRepository, UserReport,
};

#[cfg(test)]
pub use user::MockUserRepository;
#[cfg(test)]
pub use auth_code::MockAuthCodeRepository;
#[cfg(test)]
pub(crate) use auth_code::in_memory::InMemoryAuthCodes;
#[cfg(test)]
pub use event::{MockEventRepository, MockTaskRepository};
#[cfg(test)]
pub use post::MockPostRepository;
#[cfg(test)]
pub use comment::MockCommentRepository;
#[cfg(test)]
pub use subscription::MockSubscriptionRepository;
#[cfg(test)]
pub use notification::MockNotificationRepository;
#[cfg(test)]
pub use report::MockReportRepository;
