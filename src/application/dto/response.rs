//! Response DTOs
//!
//! Data structures for API response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::{AuthTokens, TelegramLogin};
use crate::domain::{total_pages, Comment, Event, Notification, PostView, PostQuery, Role, Task, User};

/// Characters of content kept in a popular post preview.
pub const PREVIEW_CHARS: usize = 100;

/// Generic acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            success: true,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Login response (tokens plus the user id)
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenResponse,
    pub user_id: i64,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

/// Telegram code exchange response
#[derive(Debug, Serialize)]
pub struct TelegramLoginResponse {
    pub success: bool,
    #[serde(flatten)]
    pub login: TelegramLogin,
}

impl From<TelegramLogin> for TelegramLoginResponse {
    fn from(login: TelegramLogin) -> Self {
        Self {
            success: true,
            login,
        }
    }
}

/// Own profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub phone: Option<String>,
    pub role_id: i32,
    pub about: Option<String>,
    pub avatar: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            phone: user.phone,
            role_id: user.role_id,
            about: user.about,
            avatar: user.avatar,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub is_subscribed: bool,
}

/// Post creation or update acknowledgement
#[derive(Debug, Serialize)]
pub struct PostSavedResponse {
    pub message: String,
    pub post_id: i64,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: i64,
    pub total_posts: i64,
    pub items_per_page: u32,
}

impl Pagination {
    pub fn new(query: &PostQuery, total: i64) -> Self {
        Self {
            current_page: query.page,
            total_pages: total_pages(total, query.limit),
            total_posts: total,
            items_per_page: query.limit,
        }
    }
}

/// One page of the public feed
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<PostView>,
    pub pagination: Pagination,
}

/// Popular post card with a shortened body
#[derive(Debug, Serialize)]
pub struct PopularPostResponse {
    pub id: i64,
    pub title: String,
    pub preview: String,
    pub cover_image: Option<String>,
    pub views: i64,
    pub rating: f64,
    pub author_id: i64,
    pub author_username: String,
    pub author_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PostView> for PopularPostResponse {
    fn from(post: PostView) -> Self {
        Self {
            id: post.id,
            title: post.title,
            preview: preview(&post.content),
            cover_image: post.cover_image,
            views: post.views,
            rating: post.rating,
            author_id: post.author_id,
            author_username: post.author_username,
            author_avatar: post.author_avatar,
            created_at: post.created_at,
        }
    }
}

/// First `PREVIEW_CHARS` characters, with an ellipsis when cut.
pub fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[derive(Debug, Serialize)]
pub struct ViewsResponse {
    pub success: bool,
    pub views: i64,
}

#[derive(Debug, Serialize)]
pub struct RatedCommentData {
    pub comment: Comment,
    pub average_rating: f64,
}

#[derive(Debug, Serialize)]
pub struct CommentCreatedResponse {
    pub success: bool,
    pub data: RatedCommentData,
}

/// Event with its tasks
#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: Event,
    pub tasks: Vec<Task>,
}

/// Acknowledgement of a newly created row
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub success: bool,
    pub avatar: String,
}

#[derive(Debug, Serialize)]
pub struct CoverResponse {
    pub success: bool,
    pub cover_url: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub success: bool,
    pub count: usize,
    pub notifications: Vec<Notification>,
}

impl From<Vec<Notification>> for NotificationListResponse {
    fn from(notifications: Vec<Notification>) -> Self {
        Self {
            success: true,
            count: notifications.len(),
            notifications,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub success: bool,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckNewResponse {
    pub success: bool,
    pub has_new: bool,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub user_id: i64,
    pub role_id: i32,
    pub role_name: &'static str,
}

impl RoleUpdatedResponse {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self {
            success: true,
            message: "Role updated".into(),
            user_id,
            role_id: role.id(),
            role_name: role.name(),
        }
    }
}
