//! Event Repository Implementation
//!
//! PostgreSQL implementations of the EventRepository and TaskRepository
//! traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Event, EventDraft, EventRepository, Task, TaskDraft, TaskRepository};
use crate::shared::error::AppError;

const EVENT_COLUMNS: &str = "id, title, description, start_date, end_date, image_path, created_at";
const TASK_COLUMNS: &str = "id, event_id, task_number, title, short_description, instructions, icon_path, release_date, created_at";

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    title: String,
    description: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    image_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl EventRow {
    fn into_entity(self) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            image_path: self.image_path,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    event_id: i64,
    task_number: i32,
    title: String,
    short_description: String,
    instructions: String,
    icon_path: Option<String>,
    release_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_entity(self) -> Task {
        Task {
            id: self.id,
            event_id: self.event_id,
            task_number: self.task_number,
            title: self.title,
            short_description: self.short_description,
            instructions: self.instructions,
            icon_path: self.icon_path,
            release_date: self.release_date,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL event repository implementation.
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let sql = format!("SELECT {} FROM events ORDER BY start_date DESC", EVENT_COLUMNS);
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(EventRow::into_entity).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(EventRow::into_entity))
    }

    async fn create(&self, draft: &EventDraft) -> Result<Event, AppError> {
        let sql = format!(
            r#"
            INSERT INTO events (title, description, start_date, end_date, image_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.start_date)
            .bind(draft.end_date)
            .bind(&draft.image_path)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into_entity())
    }

    async fn update(&self, id: i64, draft: &EventDraft) -> Result<Event, AppError> {
        let sql = format!(
            r#"
            UPDATE events
            SET title = $2, description = $3, start_date = $4, end_date = $5, image_path = $6
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.start_date)
            .bind(draft.end_date)
            .bind(&draft.image_path)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
        Ok(row.into_entity())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn overlaps(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        let overlapping: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM events
                WHERE start_date <= $2 AND end_date >= $1
                  AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(overlapping)
    }
}

/// PostgreSQL task repository implementation.
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list_for_event(&self, event_id: i64) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE event_id = $1 ORDER BY task_number, id",
            TASK_COLUMNS
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TaskRow::into_entity).collect())
    }

    async fn find(&self, event_id: i64, task_id: i64) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE event_id = $1 AND id = $2",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(event_id)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(TaskRow::into_entity))
    }

    async fn create(&self, event_id: i64, draft: &TaskDraft) -> Result<Task, AppError> {
        let sql = format!(
            r#"
            INSERT INTO tasks (event_id, task_number, title, short_description, instructions, icon_path, release_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(event_id)
            .bind(draft.task_number)
            .bind(&draft.title)
            .bind(&draft.short_description)
            .bind(&draft.instructions)
            .bind(&draft.icon_path)
            .bind(draft.release_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::NotFound("Event not found".into())
                }
                _ => AppError::Database(e),
            })?;
        Ok(row.into_entity())
    }

    async fn update(&self, task_id: i64, draft: &TaskDraft) -> Result<Task, AppError> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET task_number = $2, title = $3, short_description = $4, instructions = $5,
                icon_path = $6, release_date = $7
            WHERE id = $1
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(task_id)
            .bind(draft.task_number)
            .bind(&draft.title)
            .bind(&draft.short_description)
            .bind(&draft.instructions)
            .bind(&draft.icon_path)
            .bind(draft.release_date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        Ok(row.into_entity())
    }

    async fn delete(&self, event_id: i64, task_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE event_id = $1 AND id = $2")
            .bind(event_id)
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
