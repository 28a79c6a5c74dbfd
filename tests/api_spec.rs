use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use productive_suite::api::create_router;
use productive_suite::bridge::{HostApp, MemoryBridge, SharedBridge};
use productive_suite::models::*;
use productive_suite::services::ServiceRegistry;
use serde_json::json;

fn setup() -> (TestServer, Arc<MemoryBridge>) {
    let bridge = Arc::new(MemoryBridge::new());
    let registry = Arc::new(ServiceRegistry::new(bridge.clone() as SharedBridge));
    let app = create_router(registry);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, bridge)
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_the_backend() {
        let (server, _) = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok", "backend": "memory" }));
    }
}

mod reminders {
    use super::*;

    #[tokio::test]
    async fn create_returns_created() {
        let (server, bridge) = setup();
        bridge.add_reminder_list("Inbox");

        let response = server
            .post("/api/v1/reminders")
            .json(&json!({ "title": "Buy milk", "content": "2 liters" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let reminder: Reminder = response.json();
        assert_eq!(reminder.name, "Buy milk");
        assert!(!reminder.completed);
    }

    #[tokio::test]
    async fn create_with_blank_title_is_bad_request() {
        let (server, bridge) = setup();
        bridge.add_reminder_list("Inbox");

        let response = server
            .post("/api/v1/reminders")
            .json(&json!({ "title": "", "content": "2 liters" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_accepts_query_filters() {
        let (server, bridge) = setup();
        let inbox = bridge.add_reminder_list("Inbox");
        bridge.add_reminder(&inbox, "Pay rent", |r| {
            r.flagged = true;
            r.priority = 1;
        });
        bridge.add_reminder(&inbox, "Water plants", |_| {});

        let response = server
            .get("/api/v1/reminders")
            .add_query_param("flagged", "true")
            .add_query_param("priority", "1")
            .await;

        response.assert_status_ok();
        let reminders: Vec<Reminder> = response.json();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].name, "Pay rent");
    }

    #[tokio::test]
    async fn patch_applies_a_sparse_update() {
        let (server, bridge) = setup();
        let inbox = bridge.add_reminder_list("Inbox");
        let id = bridge.add_reminder(&inbox, "Pay rent", |r| r.priority = 9);

        let response = server
            .patch(&format!("/api/v1/reminders/{}", id))
            .json(&json!({ "dueDate": "2024-03-05T09:00:00Z" }))
            .await;

        response.assert_status_ok();
        let reminder: Reminder = response.json();
        assert_eq!(reminder.priority, 9);
        assert_eq!(
            reminder.due_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn patch_unknown_reminder_is_not_found() {
        let (server, bridge) = setup();
        bridge.add_reminder_list("Inbox");

        let response = server
            .patch("/api/v1/reminders/nonexistent-id")
            .json(&json!({ "flagged": true }))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn complete_flag_and_priority_routes() {
        let (server, bridge) = setup();
        let inbox = bridge.add_reminder_list("Inbox");
        let id = bridge.add_reminder(&inbox, "Laundry", |_| {});

        server
            .post(&format!("/api/v1/reminders/{}/complete", id))
            .await
            .assert_status_ok();
        server
            .put(&format!("/api/v1/reminders/{}/flag", id))
            .json(&json!({ "flagged": true }))
            .await
            .assert_status_ok();
        server
            .put(&format!("/api/v1/reminders/{}/priority", id))
            .json(&json!({ "priority": 1 }))
            .await
            .assert_status_ok();

        let stored = bridge.reminder(&id).expect("reminder should exist");
        assert!(stored.completed);
        assert!(stored.flagged);
        assert_eq!(stored.priority, 1);
    }

    #[tokio::test]
    async fn denied_access_is_forbidden() {
        let (server, bridge) = setup();
        bridge.deny(HostApp::Reminders);

        let response = server.get("/api/v1/reminders").await;

        response.assert_status(StatusCode::FORBIDDEN);
    }
}

mod notes {
    use super::*;

    #[tokio::test]
    async fn folders_route_is_not_shadowed_by_note_ids() {
        let (server, bridge) = setup();
        bridge.add_folder("Notes");
        bridge.add_folder("Work");

        let response = server.get("/api/v1/notes/folders").await;

        response.assert_status_ok();
        let folders: Vec<Folder> = response.json();
        assert_eq!(folders.len(), 2);
    }

    #[tokio::test]
    async fn create_in_unknown_folder_is_not_found() {
        let (server, bridge) = setup();
        bridge.add_folder("Notes");

        let response = server
            .post("/api/v1/notes")
            .json(&json!({ "title": "Agenda", "content": "Q3", "containerName": "Archive" }))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn list_narrows_by_container_name() {
        let (server, bridge) = setup();
        let personal = bridge.add_folder("Notes");
        let work = bridge.add_folder("Work");
        bridge.add_note(&personal, "Groceries", "Eggs");
        bridge.add_note(&work, "Standup", "Notes from standup");

        let response = server
            .get("/api/v1/notes")
            .add_query_param("containerName", "Work")
            .await;

        response.assert_status_ok();
        let notes: Vec<Note> = response.json();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].name, "Standup");
    }

    #[tokio::test]
    async fn patch_renames_a_note() {
        let (server, bridge) = setup();
        let folder = bridge.add_folder("Notes");
        let id = bridge.add_note(&folder, "Groceries", "Eggs");

        let response = server
            .patch(&format!("/api/v1/notes/{}", id))
            .json(&json!({ "title": "Shopping" }))
            .await;

        response.assert_status_ok();
        let note: Note = response.json();
        assert_eq!(note.name, "Shopping");
        assert_eq!(note.body, "Eggs");
    }
}

mod events {
    use super::*;

    #[tokio::test]
    async fn create_in_read_only_calendar_is_bad_gateway() {
        let (server, bridge) = setup();
        bridge.add_calendar("Holidays", false);

        let response = server
            .post("/api/v1/events")
            .json(&json!({
                "calendarName": "Holidays",
                "summary": "Day off",
                "startDate": "2024-03-01",
                "endDate": "2024-03-02"
            }))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn create_then_list_by_status() {
        let (server, bridge) = setup();
        bridge.add_calendar("Work", true);

        server
            .post("/api/v1/events")
            .json(&json!({
                "calendarName": "Work",
                "summary": "Planning",
                "startDate": "2024-03-01T10:00:00Z",
                "endDate": "2024-03-01T11:00:00Z"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/v1/events")
            .add_query_param("status", "none")
            .await;

        response.assert_status_ok();
        let events: Vec<CalendarEvent> = response.json();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Planning");
    }

    #[tokio::test]
    async fn list_with_bad_status_is_bad_request() {
        let (server, _) = setup();

        let response = server
            .get("/api/v1/events")
            .add_query_param("status", "maybe")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_updates_the_location() {
        let (server, bridge) = setup();
        let work = bridge.add_calendar("Work", true);
        let at = |h| Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap();
        let id = bridge.add_event(&work, "Standup", at(9), at(10), |_| {});

        let response = server
            .patch(&format!("/api/v1/events/{}", id))
            .json(&json!({ "location": "Room 7" }))
            .await;

        response.assert_status_ok();
        let event: CalendarEvent = response.json();
        assert_eq!(event.location, "Room 7");
    }

    #[tokio::test]
    async fn conflicts_route_is_not_shadowed_by_event_ids() {
        let (server, bridge) = setup();
        let work = bridge.add_calendar("Work", true);
        let at = |h| Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap();
        bridge.add_event(&work, "Standup", at(9), at(11), |_| {});

        let response = server
            .post("/api/v1/events/conflicts")
            .json(&json!({
                "startDate": "2024-03-01T10:00:00Z",
                "endDate": "2024-03-01T12:00:00Z",
                "calendarNames": ["Work"]
            }))
            .await;

        response.assert_status_ok();
        let events: Vec<CalendarEvent> = response.json();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn calendars_route_lists_writability() {
        let (server, bridge) = setup();
        bridge.add_calendar("Work", true);

        let response = server.get("/api/v1/calendars").await;

        response.assert_status_ok();
        let calendars: Vec<Calendar> = response.json();
        assert_eq!(calendars.len(), 1);
        assert!(calendars[0].writable);
    }
}
