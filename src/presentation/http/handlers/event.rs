//! Event and Task Handlers
//!
//! Create and update endpoints take multipart forms so an image can ride
//! along with the fields.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::response::{CreatedResponse, EventDetailResponse, MessageResponse};
use crate::application::services::{EventForm, EventService, EventServiceImpl, TaskForm};
use crate::domain::{Event, Task};
use crate::infrastructure::repositories::{PgEventRepository, PgTaskRepository};
use crate::presentation::http::multipart::FormData;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn event_service(state: &AppState) -> EventServiceImpl<PgEventRepository, PgTaskRepository> {
    EventServiceImpl::new(
        Arc::new(PgEventRepository::new(state.db.clone())),
        Arc::new(PgTaskRepository::new(state.db.clone())),
        state.storage.clone(),
    )
}

fn event_form(mut form: FormData) -> EventForm {
    EventForm {
        title: form.text("title"),
        description: form.text("description"),
        start_date: form.text("start_date"),
        end_date: form.text("end_date"),
        image: form.take_file("image"),
    }
}

fn task_form(mut form: FormData) -> TaskForm {
    TaskForm {
        task_number: form.text("task_number"),
        title: form.text("title"),
        short_description: form.text("short_description"),
        instructions: form.text("instructions"),
        release_date: form.text("release_date"),
        icon: form.take_file("icon"),
    }
}

/// `GET /api/events`
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(event_service(&state).list().await?))
}

/// `GET /api/events/{id}`
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EventDetailResponse>, AppError> {
    let (event, tasks) = event_service(&state).get(id).await?;
    Ok(Json(EventDetailResponse { event, tasks }))
}

/// `POST /api/events`
pub async fn create_event(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let form = event_form(FormData::read(multipart).await?);
    let event = event_service(&state).create(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Event created".into(),
            id: event.id,
        }),
    ))
}

/// `PUT /api/events/{id}`
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Event>, AppError> {
    let form = event_form(FormData::read(multipart).await?);
    Ok(Json(event_service(&state).update(id, form).await?))
}

/// `DELETE /api/events/{id}`
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    event_service(&state).delete(id).await?;
    Ok(Json(MessageResponse::new("Event deleted")))
}

/// `GET /api/events/{id}/tasks`
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(event_service(&state).list_tasks(event_id).await?))
}

/// `GET /api/events/{event_id}/tasks/{task_id}`
pub async fn get_task(
    State(state): State<AppState>,
    Path((event_id, task_id)): Path<(i64, i64)>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(event_service(&state).get_task(event_id, task_id).await?))
}

/// `POST /api/events/{id}/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let form = task_form(FormData::read(multipart).await?);
    let task = event_service(&state).create_task(event_id, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Task added".into(),
            id: task.id,
        }),
    ))
}

/// `PUT /api/events/{event_id}/tasks/{task_id}`
pub async fn update_task(
    State(state): State<AppState>,
    Path((event_id, task_id)): Path<(i64, i64)>,
    multipart: Multipart,
) -> Result<Json<Task>, AppError> {
    let form = task_form(FormData::read(multipart).await?);
    Ok(Json(
        event_service(&state)
            .update_task(event_id, task_id, form)
            .await?,
    ))
}

/// `DELETE /api/events/{event_id}/tasks/{task_id}`
pub async fn delete_task(
    State(state): State<AppState>,
    Path((event_id, task_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, AppError> {
    event_service(&state).delete_task(event_id, task_id).await?;
    Ok(Json(MessageResponse::new("Task deleted")))
}
