//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **TokenService**: JWT signing and verification
//! - **AuthService**: Password registration, login, token refresh
//! - **TelegramAuthService**: One-time code issue and exchange
//! - **UserService**: Profiles and author pages
//! - **SubscriptionService**: Following authors
//! - **PostService / CommentService**: Posts, feed, rated reviews
//! - **EventService**: Events and their tasks
//! - **NotificationService**: Notification inbox
//! - **MediaService**: Avatar and cover uploads
//! - **AdminService / ReportService**: Role management and reports

pub mod token_service;
pub mod auth_service;
pub mod telegram_auth_service;
pub mod user_service;
pub mod subscription_service;
pub mod post_service;
pub mod comment_service;
pub mod event_service;
pub mod notification_service;
pub mod media_service;
pub mod admin_service;
pub mod report_service;

pub use token_service::{AuthTokens, Claims, TokenError, TokenKind, TokenService};

pub use auth_service::{AuthError, AuthService, AuthServiceImpl};

pub use telegram_auth_service::{
    code_message, IssuedCode, TelegramAuthError, TelegramAuthService, TelegramAuthServiceImpl,
    TelegramLogin, UNAVAILABLE_MESSAGE,
};

pub use user_service::{PublicProfile, UserError, UserService, UserServiceImpl};

pub use subscription_service::{SubscriptionError, SubscriptionService, SubscriptionServiceImpl};

pub use post_service::{created_message, PostError, PostService, PostServiceImpl};

pub use comment_service::{CommentError, CommentService, CommentServiceImpl};

pub use event_service::{EventError, EventForm, EventService, EventServiceImpl, TaskForm};

pub use notification_service::{NotificationError, NotificationService, NotificationServiceImpl};

pub use media_service::{MediaError, MediaService, MediaServiceImpl};

pub use admin_service::{AdminError, AdminService, AdminServiceImpl};

pub use report_service::{
    ExportFile, ExportFormat, PeriodReport, ReportError, ReportPeriod, ReportService,
    ReportServiceImpl, ReportType,
};
