use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::Error;
use crate::mcp::{
    CreateEventRequest, CreateNoteRequest, CreateReminderRequest, FindConflictsRequest,
    FlagReminderRequest, ListEventsRequest, ListNotesRequest, ListRemindersRequest, NewEvent,
    SetReminderPriorityRequest, UpdateEventRequest, UpdateNoteRequest, UpdateReminderRequest,
};
use crate::models::*;
use crate::services::ServiceRegistry;

type Registry = State<Arc<ServiceRegistry>>;
type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a service error to a status code. Host failures are logged in full
/// and reported as a bad gateway.
fn api_error(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Permission(_) => StatusCode::FORBIDDEN,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Adapter(_) => StatusCode::BAD_GATEWAY,
    };

    if status == StatusCode::BAD_GATEWAY {
        tracing::error!("Host error: {}", e);
    } else {
        tracing::warn!("Request failed ({}): {}", status, e);
    }
    (status, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(registry): Registry) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "backend": registry.bridge().id() }))
}

// ============================================================
// Reminders
// ============================================================

pub async fn list_reminders(
    State(registry): Registry,
    Query(query): Query<ListRemindersRequest>,
) -> ApiResult<Json<Vec<Reminder>>> {
    let filter = ReminderFilter::try_from(query).map_err(api_error)?;
    registry
        .reminders()
        .list_reminders(Some(&filter))
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn create_reminder(
    State(registry): Registry,
    Json(input): Json<CreateReminderRequest>,
) -> ApiResult<(StatusCode, Json<Reminder>)> {
    input.validate().map_err(api_error)?;
    registry
        .reminders()
        .create_reminder(&input.title, &input.content)
        .await
        .map(|r| (StatusCode::CREATED, Json(r)))
        .map_err(api_error)
}

pub async fn update_reminder(
    State(registry): Registry,
    Path(id): Path<String>,
    Json(input): Json<UpdateReminderRequest>,
) -> ApiResult<Json<Reminder>> {
    let update = UpdateReminderInput::try_from(input).map_err(api_error)?;
    registry
        .reminders()
        .update_reminder(&id, update)
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn complete_reminder(
    State(registry): Registry,
    Path(id): Path<String>,
) -> ApiResult<Json<Reminder>> {
    registry
        .reminders()
        .complete_reminder(&id)
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn flag_reminder(
    State(registry): Registry,
    Path(id): Path<String>,
    Json(input): Json<FlagReminderRequest>,
) -> ApiResult<Json<Reminder>> {
    registry
        .reminders()
        .flag_reminder(&id, input.flagged)
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn set_reminder_priority(
    State(registry): Registry,
    Path(id): Path<String>,
    Json(input): Json<SetReminderPriorityRequest>,
) -> ApiResult<Json<Reminder>> {
    registry
        .reminders()
        .set_priority(&id, input.priority)
        .await
        .map(Json)
        .map_err(api_error)
}

// ============================================================
// Notes
// ============================================================

pub async fn list_notes(
    State(registry): Registry,
    Query(query): Query<ListNotesRequest>,
) -> ApiResult<Json<Vec<Note>>> {
    let filter = NoteFilter::try_from(query).map_err(api_error)?;
    registry
        .notes()
        .list_notes(Some(&filter))
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn create_note(
    State(registry): Registry,
    Json(input): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    input.validate().map_err(api_error)?;
    registry
        .notes()
        .create_note(&input.title, &input.content, input.container_name.as_deref())
        .await
        .map(|n| (StatusCode::CREATED, Json(n)))
        .map_err(api_error)
}

pub async fn update_note(
    State(registry): Registry,
    Path(id): Path<String>,
    Json(input): Json<UpdateNoteRequest>,
) -> ApiResult<Json<Note>> {
    registry
        .notes()
        .update_note(&id, input.into())
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn list_note_folders(State(registry): Registry) -> ApiResult<Json<Vec<Folder>>> {
    registry
        .notes()
        .list_folders()
        .await
        .map(Json)
        .map_err(api_error)
}

// ============================================================
// Calendar
// ============================================================

pub async fn list_calendars(State(registry): Registry) -> ApiResult<Json<Vec<Calendar>>> {
    registry
        .calendar()
        .list_calendars()
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn list_events(
    State(registry): Registry,
    Query(query): Query<ListEventsRequest>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let filter = EventFilter::try_from(query).map_err(api_error)?;
    registry
        .calendar()
        .list_events(Some(&filter))
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn create_event(
    State(registry): Registry,
    Json(input): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<CalendarEvent>)> {
    let new = NewEvent::try_from(input).map_err(api_error)?;
    registry
        .calendar()
        .create_event(
            &new.calendar_name,
            &new.summary,
            new.start,
            new.end,
            new.allday,
            new.options,
        )
        .await
        .map(|e| (StatusCode::CREATED, Json(e)))
        .map_err(api_error)
}

pub async fn update_event(
    State(registry): Registry,
    Path(id): Path<String>,
    Json(input): Json<UpdateEventRequest>,
) -> ApiResult<Json<CalendarEvent>> {
    let update = UpdateEventInput::try_from(input).map_err(api_error)?;
    registry
        .calendar()
        .update_event(&id, update)
        .await
        .map(Json)
        .map_err(api_error)
}

pub async fn find_conflicts(
    State(registry): Registry,
    Json(input): Json<FindConflictsRequest>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let (start, end) = input.window().map_err(api_error)?;
    registry
        .calendar()
        .find_conflicts(start, end, &input.calendar_names)
        .await
        .map(Json)
        .map_err(api_error)
}
