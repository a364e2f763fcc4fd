//! Request DTOs
//!
//! Data structures for API request bodies and query strings. Missing JSON
//! fields default to empty so the validator reports them as a 400.

use serde::Deserialize;
use validator::Validate;

use crate::domain::{PostPeriod, PostQuery, PostSort, PostStatus};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "Phone must be 1-20 characters"))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// `GET /api/verify-tg-code`
#[derive(Debug, Deserialize)]
pub struct VerifyCodeQuery {
    pub code: Option<String>,
}

/// Update own profile. Blank fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 50, message = "Username must be at most 50 characters"))]
    pub username: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 1000, message = "About must be at most 1000 characters"))]
    pub about: Option<String>,
}

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    pub status: Option<PostStatus>,
    pub cover_image: Option<String>,
    pub task_id: Option<i64>,
}

/// Update post request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    pub status: Option<PostStatus>,
    pub cover_image: Option<String>,
    pub task_id: Option<i64>,
}

/// Feed query parameters. Unknown sort or period values fall back to the
/// defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PostQueryParams {
    pub query: Option<String>,
    pub sort: Option<String>,
    pub period: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PostQueryParams {
    pub fn into_query(self) -> PostQuery {
        let defaults = PostQuery::default();
        let sort = match self.sort.as_deref().map(str::trim) {
            Some("oldest") => PostSort::Oldest,
            Some("popular") => PostSort::Popular,
            Some("rating") => PostSort::Rating,
            _ => PostSort::Newest,
        };
        let period = match self.period.as_deref().map(str::trim) {
            Some("today") => Some(PostPeriod::Today),
            Some("week") => Some(PostPeriod::Week),
            Some("month") => Some(PostPeriod::Month),
            Some("year") => Some(PostPeriod::Year),
            _ => None,
        };
        PostQuery {
            search: self.query,
            sort,
            period,
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Liked is required"))]
    pub liked: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Disliked is required"))]
    pub disliked: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Overall impression is required"))]
    pub overall_impression: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
}

/// Notification list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQueryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckNewQuery {
    pub last_checked: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CleanOldQuery {
    pub days: Option<i64>,
}

/// Role assignment request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(range(min = 1, message = "user_id is required"))]
    #[serde(default)]
    pub user_id: i64,

    #[validate(range(min = 1, message = "role_id is required"))]
    #[serde(default)]
    pub role_id: i32,
}

/// Report period query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReportQueryParams {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn missing_register_fields_fail_validation() {
        let body: RegisterRequest = serde_json::from_str(r#"{"username":"amy"}"#).unwrap();
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("username"));
    }

    #[test_case(0, false)]
    #[test_case(1, true)]
    #[test_case(5, true)]
    #[test_case(6, false)]
    fn comment_rating_range(rating: i32, valid: bool) {
        let body = CreateCommentRequest {
            liked: "plot".into(),
            disliked: "pacing".into(),
            overall_impression: "good".into(),
            rating,
        };
        assert_eq!(body.validate().is_ok(), valid);
    }

    #[test]
    fn feed_params_parse_sort_and_period() {
        let params: PostQueryParams =
            serde_json::from_str(r#"{"sort":"popular","period":"week","page":2}"#).unwrap();
        let query = params.into_query();
        assert_eq!(query.sort, PostSort::Popular);
        assert_eq!(query.period, Some(PostPeriod::Week));
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, crate::domain::DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn unknown_feed_values_fall_back() {
        let query = PostQueryParams {
            sort: Some("loudest".into()),
            period: Some("decade".into()),
            ..Default::default()
        }
        .into_query();
        assert_eq!(query.sort, PostSort::Newest);
        assert_eq!(query.period, None);
        assert_eq!(query.page, 1);
    }
}
