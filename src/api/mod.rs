mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::ServiceRegistry;

pub fn create_router(registry: Arc<ServiceRegistry>) -> Router {
    let api = Router::new()
        // Reminders
        .route("/reminders", get(handlers::list_reminders))
        .route("/reminders", post(handlers::create_reminder))
        .route("/reminders/{id}", patch(handlers::update_reminder))
        .route("/reminders/{id}/complete", post(handlers::complete_reminder))
        .route("/reminders/{id}/flag", put(handlers::flag_reminder))
        .route("/reminders/{id}/priority", put(handlers::set_reminder_priority))
        // Notes
        .route("/notes", get(handlers::list_notes))
        .route("/notes", post(handlers::create_note))
        .route("/notes/folders", get(handlers::list_note_folders))
        .route("/notes/{id}", patch(handlers::update_note))
        // Calendar
        .route("/calendars", get(handlers::list_calendars))
        .route("/events", get(handlers::list_events))
        .route("/events", post(handlers::create_event))
        .route("/events/conflicts", post(handlers::find_conflicts))
        .route("/events/{id}", patch(handlers::update_event))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(registry)
}
