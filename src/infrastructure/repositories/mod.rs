//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits. Each repository
//! owns a clone of the `PgPool` handed to it at construction.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use starsclub::infrastructure::repositories::{PgPostRepository, PgUserRepository};
//!
//! fn setup_repositories(pool: PgPool) {
//!     let user_repo = PgUserRepository::new(pool.clone());
//!     let post_repo = PgPostRepository::new(pool);
//! }
//! ```

pub mod user_repository;
pub mod auth_code_repository;
pub mod event_repository;
pub mod post_repository;
pub mod comment_repository;
pub mod subscription_repository;
pub mod notification_repository;
pub mod report_repository;

pub use user_repository::PgUserRepository;
pub use auth_code_repository::PgAuthCodeRepository;
pub use event_repository::{PgEventRepository, PgTaskRepository};
pub use post_repository::PgPostRepository;
pub use comment_repository::PgCommentRepository;
pub use subscription_repository::PgSubscriptionRepository;
pub use notification_repository::PgNotificationRepository;
pub use report_repository::PgReportRepository;
