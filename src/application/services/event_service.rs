//! Event Service
//!
//! Admin management of timed events and their tasks. Text fields arrive as
//! raw multipart strings and are validated here; images are written only
//! after validation passes and are deleted again when the write fails.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    validate_window, Event, EventDraft, EventRepository, Task, TaskDraft, TaskRepository,
};
use crate::infrastructure::storage::{LocalStorage, UploadKind, UploadedFile};
use crate::shared::error::AppError;
use crate::shared::validation::parse_timestamp;

/// Raw event form; every field is optional on update.
#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub image: Option<UploadedFile>,
}

/// Raw task form; every field is required on create.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub task_number: Option<String>,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub instructions: Option<String>,
    pub release_date: Option<String>,
    pub icon: Option<UploadedFile>,
}

#[async_trait]
pub trait EventService: Send + Sync {
    async fn list(&self) -> Result<Vec<Event>, EventError>;

    async fn get(&self, id: i64) -> Result<(Event, Vec<Task>), EventError>;

    async fn create(&self, form: EventForm) -> Result<Event, EventError>;

    async fn update(&self, id: i64, form: EventForm) -> Result<Event, EventError>;

    async fn delete(&self, id: i64) -> Result<(), EventError>;

    async fn list_tasks(&self, event_id: i64) -> Result<Vec<Task>, EventError>;

    async fn get_task(&self, event_id: i64, task_id: i64) -> Result<Task, EventError>;

    async fn create_task(&self, event_id: i64, form: TaskForm) -> Result<Task, EventError>;

    async fn update_task(&self, event_id: i64, task_id: i64, form: TaskForm)
        -> Result<Task, EventError>;

    async fn delete_task(&self, event_id: i64, task_id: i64) -> Result<(), EventError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Event not found")]
    EventNotFound,

    #[error("Task not found")]
    TaskNotFound,

    #[error("{0}")]
    Invalid(String),

    #[error("Event dates overlap with an existing event")]
    Overlap,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<EventError> for AppError {
    fn from(e: EventError) -> Self {
        match e {
            EventError::EventNotFound | EventError::TaskNotFound => AppError::NotFound(e.to_string()),
            EventError::Invalid(msg) => AppError::Validation(msg),
            EventError::Overlap => AppError::BadRequest(e.to_string()),
            EventError::Store(inner) => inner,
        }
    }
}

fn text(value: Option<&String>, field: &str) -> Result<String, EventError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| EventError::Invalid(format!("{}: field is required", field)))
}

fn timestamp(raw: &str, field: &str) -> Result<DateTime<Utc>, EventError> {
    parse_timestamp(raw).ok_or_else(|| EventError::Invalid(format!("{}: invalid date", field)))
}

/// Parse an optional field, keeping `current` when absent or blank.
fn merged_text(value: Option<&String>, current: &str) -> String {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map_or_else(|| current.to_string(), str::to_string)
}

fn merged_timestamp(
    value: Option<&String>,
    current: DateTime<Utc>,
    field: &str,
) -> Result<DateTime<Utc>, EventError> {
    match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => timestamp(raw, field),
        None => Ok(current),
    }
}

fn task_number(raw: &str) -> Result<i32, EventError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| EventError::Invalid("task_number: must be a positive integer".into()))
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), EventError> {
    validate_window(start, end).map_err(|e| match e {
        AppError::Validation(msg) => EventError::Invalid(msg),
        other => EventError::Store(other),
    })
}

fn check_release(event: &Event, release: DateTime<Utc>) -> Result<(), EventError> {
    if event.contains(release) {
        Ok(())
    } else {
        Err(EventError::Invalid(
            "release_date: must fall within the event dates".into(),
        ))
    }
}

pub struct EventServiceImpl<E, T>
where
    E: EventRepository,
    T: TaskRepository,
{
    events: Arc<E>,
    tasks: Arc<T>,
    storage: LocalStorage,
}

impl<E, T> EventServiceImpl<E, T>
where
    E: EventRepository,
    T: TaskRepository,
{
    pub fn new(events: Arc<E>, tasks: Arc<T>, storage: LocalStorage) -> Self {
        Self {
            events,
            tasks,
            storage,
        }
    }

    async fn require_event(&self, id: i64) -> Result<Event, EventError> {
        self.events.find_by_id(id).await?.ok_or(EventError::EventNotFound)
    }

    async fn require_task(&self, event_id: i64, task_id: i64) -> Result<Task, EventError> {
        self.tasks
            .find(event_id, task_id)
            .await?
            .ok_or(EventError::TaskNotFound)
    }

    async fn ensure_free(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<i64>,
    ) -> Result<(), EventError> {
        if self.events.overlaps(start, end, exclude).await? {
            return Err(EventError::Overlap);
        }
        Ok(())
    }

    async fn store_image(
        &self,
        kind: UploadKind,
        file: Option<&UploadedFile>,
    ) -> Result<Option<String>, EventError> {
        match file {
            Some(file) => Ok(Some(self.storage.store(kind, file).await?)),
            None => Ok(None),
        }
    }

    /// Run a write with a freshly stored image, removing the image if the
    /// write fails.
    async fn with_image<R, F, Fut>(&self, image: Option<String>, write: F) -> Result<R, EventError>
    where
        F: FnOnce(Option<String>) -> Fut + Send,
        Fut: std::future::Future<Output = Result<R, AppError>> + Send,
        R: Send,
    {
        match write(image.clone()).await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.storage.discard(image.as_deref()).await;
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl<E, T> EventService for EventServiceImpl<E, T>
where
    E: EventRepository + 'static,
    T: TaskRepository + 'static,
{
    async fn list(&self) -> Result<Vec<Event>, EventError> {
        Ok(self.events.list().await?)
    }

    async fn get(&self, id: i64) -> Result<(Event, Vec<Task>), EventError> {
        let event = self.require_event(id).await?;
        let tasks = self.tasks.list_for_event(id).await?;
        Ok((event, tasks))
    }

    async fn create(&self, form: EventForm) -> Result<Event, EventError> {
        let title = text(form.title.as_ref(), "title")?;
        let description = text(form.description.as_ref(), "description")?;
        let start = timestamp(&text(form.start_date.as_ref(), "start_date")?, "start_date")?;
        let end = timestamp(&text(form.end_date.as_ref(), "end_date")?, "end_date")?;
        check_window(start, end)?;
        self.ensure_free(start, end, None).await?;

        let image = self.store_image(UploadKind::EventImage, form.image.as_ref()).await?;
        let event = self
            .with_image(image, |image_path| async move {
                self.events
                    .create(&EventDraft {
                        title,
                        description,
                        start_date: start,
                        end_date: end,
                        image_path,
                    })
                    .await
            })
            .await?;

        tracing::info!(event_id = event.id, "Event created");
        Ok(event)
    }

    async fn update(&self, id: i64, form: EventForm) -> Result<Event, EventError> {
        let current = self.require_event(id).await?;

        let title = merged_text(form.title.as_ref(), &current.title);
        let description = merged_text(form.description.as_ref(), &current.description);
        let start = merged_timestamp(form.start_date.as_ref(), current.start_date, "start_date")?;
        let end = merged_timestamp(form.end_date.as_ref(), current.end_date, "end_date")?;
        check_window(start, end)?;
        self.ensure_free(start, end, Some(id)).await?;

        let new_image = self.store_image(UploadKind::EventImage, form.image.as_ref()).await?;
        let replaced = new_image.is_some();
        let keep = current.image_path.clone();

        let event = self
            .with_image(new_image, |image_path| async move {
                self.events
                    .update(
                        id,
                        &EventDraft {
                            title,
                            description,
                            start_date: start,
                            end_date: end,
                            image_path: image_path.or(keep),
                        },
                    )
                    .await
            })
            .await?;

        if replaced {
            self.storage.discard(current.image_path.as_deref()).await;
        }
        Ok(event)
    }

    async fn delete(&self, id: i64) -> Result<(), EventError> {
        let event = self.require_event(id).await?;
        let tasks = self.tasks.list_for_event(id).await?;

        if !self.events.delete(id).await? {
            return Err(EventError::EventNotFound);
        }

        self.storage.discard(event.image_path.as_deref()).await;
        for task in &tasks {
            self.storage.discard(task.icon_path.as_deref()).await;
        }
        tracing::info!(event_id = id, tasks = tasks.len(), "Event deleted");
        Ok(())
    }

    async fn list_tasks(&self, event_id: i64) -> Result<Vec<Task>, EventError> {
        self.require_event(event_id).await?;
        Ok(self.tasks.list_for_event(event_id).await?)
    }

    async fn get_task(&self, event_id: i64, task_id: i64) -> Result<Task, EventError> {
        self.require_task(event_id, task_id).await
    }

    async fn create_task(&self, event_id: i64, form: TaskForm) -> Result<Task, EventError> {
        let event = self.require_event(event_id).await?;

        let number = task_number(&text(form.task_number.as_ref(), "task_number")?)?;
        let title = text(form.title.as_ref(), "title")?;
        let short_description = text(form.short_description.as_ref(), "short_description")?;
        let instructions = text(form.instructions.as_ref(), "instructions")?;
        let release = timestamp(&text(form.release_date.as_ref(), "release_date")?, "release_date")?;
        check_release(&event, release)?;
        let icon = form
            .icon
            .as_ref()
            .ok_or_else(|| EventError::Invalid("icon: field is required".into()))?;

        let icon_path = self.store_image(UploadKind::TaskIcon, Some(icon)).await?;
        let task = self
            .with_image(icon_path, |icon_path| async move {
                self.tasks
                    .create(
                        event_id,
                        &TaskDraft {
                            task_number: number,
                            title,
                            short_description,
                            instructions,
                            icon_path,
                            release_date: release,
                        },
                    )
                    .await
            })
            .await?;

        tracing::info!(event_id, task_id = task.id, "Task created");
        Ok(task)
    }

    async fn update_task(
        &self,
        event_id: i64,
        task_id: i64,
        form: TaskForm,
    ) -> Result<Task, EventError> {
        let current = self.require_task(event_id, task_id).await?;
        let event = self.require_event(event_id).await?;

        let number = match form.task_number.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => task_number(raw)?,
            None => current.task_number,
        };
        let title = merged_text(form.title.as_ref(), &current.title);
        let short_description =
            merged_text(form.short_description.as_ref(), &current.short_description);
        let instructions = merged_text(form.instructions.as_ref(), &current.instructions);
        let release =
            merged_timestamp(form.release_date.as_ref(), current.release_date, "release_date")?;
        check_release(&event, release)?;

        let new_icon = self.store_image(UploadKind::TaskIcon, form.icon.as_ref()).await?;
        let replaced = new_icon.is_some();
        let keep = current.icon_path.clone();

        let task = self
            .with_image(new_icon, |icon_path| async move {
                self.tasks
                    .update(
                        task_id,
                        &TaskDraft {
                            task_number: number,
                            title,
                            short_description,
                            instructions,
                            icon_path: icon_path.or(keep),
                            release_date: release,
                        },
                    )
                    .await
            })
            .await?;

        if replaced {
            self.storage.discard(current.icon_path.as_deref()).await;
        }
        Ok(task)
    }

    async fn delete_task(&self, event_id: i64, task_id: i64) -> Result<(), EventError> {
        let task = self.require_task(event_id, task_id).await?;
        if !self.tasks.delete(event_id, task_id).await? {
            return Err(EventError::TaskNotFound);
        }
        self.storage.discard(task.icon_path.as_deref()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadSettings;
    use crate::domain::{MockEventRepository, MockTaskRepository};
    use axum::http::StatusCode;
    use chrono::Duration;
    use std::path::PathBuf;

    fn temp_storage() -> (LocalStorage, PathBuf) {
        let root = std::env::temp_dir().join(format!("starsclub-events-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(&UploadSettings {
            dir: root.to_string_lossy().into_owned(),
            max_file_size: 1024,
        });
        (storage, root)
    }

    fn png() -> UploadedFile {
        UploadedFile {
            content_type: "image/png".into(),
            data: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn form(start: &str, end: &str) -> EventForm {
        EventForm {
            title: Some("Winter prose".into()),
            description: Some("Short stories about snow".into()),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            image: None,
        }
    }

    fn event(id: i64) -> Event {
        let start = Utc::now();
        Event {
            id,
            title: "Winter prose".into(),
            description: "d".into(),
            start_date: start,
            end_date: start + Duration::days(10),
            image_path: None,
            created_at: start,
        }
    }

    fn service(
        events: MockEventRepository,
        tasks: MockTaskRepository,
        storage: LocalStorage,
    ) -> EventServiceImpl<MockEventRepository, MockTaskRepository> {
        EventServiceImpl::new(Arc::new(events), Arc::new(tasks), storage)
    }

    #[tokio::test]
    async fn reversed_dates_are_rejected_before_storage() {
        let (storage, _) = temp_storage();
        let mut events = MockEventRepository::new();
        events.expect_overlaps().never();
        events.expect_create().never();

        let err = service(events, MockTaskRepository::new(), storage)
            .create(form("2025-02-10", "2025-02-01"))
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unparseable_date_is_rejected() {
        let (storage, _) = temp_storage();
        let err = service(MockEventRepository::new(), MockTaskRepository::new(), storage)
            .create(form("soon", "2025-02-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Invalid(msg) if msg.starts_with("start_date")));
    }

    #[tokio::test]
    async fn overlapping_event_is_rejected() {
        let (storage, _) = temp_storage();
        let mut events = MockEventRepository::new();
        events.expect_overlaps().returning(|_, _, _| Ok(true));
        events.expect_create().never();

        let err = service(events, MockTaskRepository::new(), storage)
            .create(form("2025-02-01", "2025-02-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Overlap));
    }

    #[tokio::test]
    async fn image_is_removed_when_insert_fails() {
        let (storage, root) = temp_storage();
        let mut events = MockEventRepository::new();
        events.expect_overlaps().returning(|_, _, _| Ok(false));
        events
            .expect_create()
            .returning(|_| Err(AppError::Internal("insert failed".into())));

        let mut input = form("2025-02-01", "2025-02-10");
        input.image = Some(png());
        let result = service(events, MockTaskRepository::new(), storage)
            .create(input)
            .await;
        assert!(result.is_err());

        let mut entries = tokio::fs::read_dir(root.join("events")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn update_excludes_itself_from_overlap_check() {
        let (storage, _) = temp_storage();
        let mut events = MockEventRepository::new();
        events.expect_find_by_id().returning(|id| Ok(Some(event(id))));
        events
            .expect_overlaps()
            .withf(|_, _, exclude| *exclude == Some(4))
            .returning(|_, _, _| Ok(false));
        events
            .expect_update()
            .withf(|id, draft| *id == 4 && draft.title == "Renamed")
            .returning(|id, _| Ok(event(id)));

        let result = service(events, MockTaskRepository::new(), storage)
            .update(
                4,
                EventForm {
                    title: Some("Renamed".into()),
                    ..EventForm::default()
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn task_release_must_fall_inside_event() {
        let (storage, _) = temp_storage();
        let mut events = MockEventRepository::new();
        events.expect_find_by_id().returning(|id| Ok(Some(event(id))));
        let mut tasks = MockTaskRepository::new();
        tasks.expect_create().never();

        let late = (Utc::now() + Duration::days(30)).to_rfc3339();
        let err = service(events, tasks, storage)
            .create_task(
                1,
                TaskForm {
                    task_number: Some("1".into()),
                    title: Some("Opening line".into()),
                    short_description: Some("Start strong".into()),
                    instructions: Some("Write one sentence".into()),
                    release_date: Some(late),
                    icon: Some(png()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Invalid(msg) if msg.starts_with("release_date")));
    }

    #[tokio::test]
    async fn task_requires_icon() {
        let (storage, _) = temp_storage();
        let mut events = MockEventRepository::new();
        events.expect_find_by_id().returning(|id| Ok(Some(event(id))));

        let err = service(events, MockTaskRepository::new(), storage)
            .create_task(
                1,
                TaskForm {
                    task_number: Some("2".into()),
                    title: Some("t".into()),
                    short_description: Some("s".into()),
                    instructions: Some("i".into()),
                    release_date: Some((Utc::now() + Duration::days(1)).to_rfc3339()),
                    icon: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Invalid(msg) if msg.starts_with("icon")));
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let (storage, _) = temp_storage();
        let mut tasks = MockTaskRepository::new();
        tasks.expect_find().returning(|_, _| Ok(None));

        let err = service(MockEventRepository::new(), tasks, storage)
            .update_task(1, 2, TaskForm::default())
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::NOT_FOUND);
    }
}
