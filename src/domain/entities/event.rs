//! Event and task entities with their repository traits.
//!
//! Maps to the `events` and `tasks` tables. Events occupy non-overlapping
//! time windows; tasks belong to one event and are released inside it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::error::AppError;

/// A timed writing event.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Whether `at` falls inside the event window (inclusive).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }
}

/// Fields for inserting or fully replacing an event.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub image_path: Option<String>,
}

/// A numbered assignment inside an event.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub event_id: i64,
    pub task_number: i32,
    pub title: String,
    pub short_description: String,
    pub instructions: String,
    pub icon_path: Option<String>,
    pub release_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting or fully replacing a task.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub task_number: i32,
    pub title: String,
    pub short_description: String,
    pub instructions: String,
    pub icon_path: Option<String>,
    pub release_date: DateTime<Utc>,
}

/// Check that an event window is well formed.
pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::Validation(
            "end_date: must not be earlier than start_date".into(),
        ));
    }
    Ok(())
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events, latest start first.
    async fn list(&self) -> Result<Vec<Event>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError>;

    async fn create(&self, draft: &EventDraft) -> Result<Event, AppError>;

    async fn update(&self, id: i64, draft: &EventDraft) -> Result<Event, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Whether another event intersects `[start, end]`.
    async fn overlaps(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Tasks of an event ordered by task number.
    async fn list_for_event(&self, event_id: i64) -> Result<Vec<Task>, AppError>;

    async fn find(&self, event_id: i64, task_id: i64) -> Result<Option<Task>, AppError>;

    async fn create(&self, event_id: i64, draft: &TaskDraft) -> Result<Task, AppError>;

    async fn update(&self, task_id: i64, draft: &TaskDraft) -> Result<Task, AppError>;

    async fn delete(&self, event_id: i64, task_id: i64) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn window_must_not_be_reversed() {
        let now = Utc::now();
        assert!(validate_window(now, now).is_ok());
        assert!(validate_window(now, now + Duration::days(1)).is_ok());
        assert!(validate_window(now, now - Duration::seconds(1)).is_err());
    }

    #[test]
    fn contains_is_inclusive() {
        let start = Utc::now();
        let event = Event {
            id: 1,
            title: "Spring".into(),
            description: String::new(),
            start_date: start,
            end_date: start + Duration::days(7),
            image_path: None,
            created_at: start,
        };
        assert!(event.contains(start));
        assert!(event.contains(start + Duration::days(7)));
        assert!(!event.contains(start + Duration::days(8)));
        assert!(!event.contains(start - Duration::seconds(1)));
    }
}
