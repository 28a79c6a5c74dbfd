//! MCP server integration tests.
//!
//! Tool logic is exercised through the `run_*` methods against the
//! in-memory host; the wire format is covered by `mcp_protocol_spec.rs`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use productive_suite::bridge::{MemoryBridge, Script, SharedBridge};
use productive_suite::mcp::*;
use productive_suite::services::ServiceRegistry;
use productive_suite::Error;

/// Helper to create a test MCP server over an empty in-memory host.
fn setup() -> (McpServer, Arc<MemoryBridge>) {
    let bridge = Arc::new(MemoryBridge::new());
    let registry = Arc::new(ServiceRegistry::new(bridge.clone() as SharedBridge));
    (McpServer::new(registry), bridge)
}

// ============================================================
// Reminder Tools
// ============================================================

mod reminder_tools {
    use super::*;

    mod create_reminder {
        use super::*;

        #[tokio::test]
        async fn returns_summary_and_record() {
            let (server, bridge) = setup();
            bridge.add_reminder_list("Inbox");

            let output = server
                .run_create_reminder(CreateReminderRequest {
                    title: "Buy milk".to_string(),
                    content: "2 liters".to_string(),
                })
                .await
                .unwrap();

            assert_eq!(
                output.summary,
                format!("Created reminder {}: Buy milk", output.data.id)
            );
            assert_eq!(output.data.body, "2 liters");
        }

        #[tokio::test]
        async fn rejects_empty_content_before_calling_the_host() {
            let (server, bridge) = setup();
            bridge.add_reminder_list("Inbox");

            let err = server
                .run_create_reminder(CreateReminderRequest {
                    title: "Buy milk".to_string(),
                    content: String::new(),
                })
                .await
                .unwrap_err();

            assert!(matches!(err, Error::Validation(_)), "got {:?}", err);
            assert!(bridge.calls().is_empty());
        }
    }

    mod list_reminders {
        use super::*;

        #[tokio::test]
        async fn summarizes_each_reminder() {
            let (server, bridge) = setup();
            let inbox = bridge.add_reminder_list("Inbox");
            bridge.add_reminder(&inbox, "Pay rent", |r| {
                r.flagged = true;
                r.priority = 1;
            });
            bridge.add_reminder(&inbox, "Water plants", |r| r.completed = true);

            let output = server
                .run_list_reminders(ListRemindersRequest::default())
                .await
                .unwrap();

            assert_eq!(
                output.summary,
                "Found 2 reminders:\n- Pay rent (pending, flagged, priority 1)\n- Water plants (completed)"
            );
        }

        #[tokio::test]
        async fn parses_date_bounds() {
            let (server, bridge) = setup();
            let inbox = bridge.add_reminder_list("Inbox");
            bridge.add_reminder(&inbox, "Dentist", |r| {
                r.due_date = Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap());
            });
            bridge.add_reminder(&inbox, "Someday", |_| {});

            let output = server
                .run_list_reminders(ListRemindersRequest {
                    due_after: Some("2024-03-01".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();

            assert_eq!(output.data.len(), 1);
            assert_eq!(output.data[0].name, "Dentist");
        }

        #[tokio::test]
        async fn rejects_malformed_dates() {
            let (server, bridge) = setup();

            let err = server
                .run_list_reminders(ListRemindersRequest {
                    due_before: Some("tomorrow-ish".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap_err();

            assert!(matches!(err, Error::Validation(_)), "got {:?}", err);
            assert!(bridge.calls().is_empty());
        }
    }

    mod update_reminder {
        use super::*;

        #[tokio::test]
        async fn requires_an_id() {
            let (server, _) = setup();

            let err = server
                .run_update_reminder(UpdateReminderRequest::default())
                .await
                .unwrap_err();

            assert!(err.to_string().contains("Reminder ID is required"));
        }

        #[tokio::test]
        async fn unknown_id_is_not_found() {
            let (server, bridge) = setup();
            bridge.add_reminder_list("Inbox");

            let err = server
                .run_update_reminder(UpdateReminderRequest {
                    id: "nonexistent-id".to_string(),
                    flagged: Some(true),
                    ..Default::default()
                })
                .await
                .unwrap_err();

            assert!(matches!(err, Error::NotFound(_)), "got {:?}", err);
        }
    }

    #[tokio::test]
    async fn complete_flag_and_priority_summaries() {
        let (server, bridge) = setup();
        let inbox = bridge.add_reminder_list("Inbox");
        let id = bridge.add_reminder(&inbox, "Laundry", |_| {});

        let completed = server
            .run_complete_reminder(CompleteReminderRequest { id: id.clone() })
            .await
            .unwrap();
        assert_eq!(
            completed.summary,
            format!("Marked reminder {}: Laundry as completed", id)
        );

        let flagged = server
            .run_flag_reminder(FlagReminderRequest {
                id: id.clone(),
                flagged: true,
            })
            .await
            .unwrap();
        assert_eq!(flagged.summary, format!("Flagged reminder {}: Laundry", id));

        let prioritized = server
            .run_set_reminder_priority(SetReminderPriorityRequest {
                id: id.clone(),
                priority: 5,
            })
            .await
            .unwrap();
        assert_eq!(
            prioritized.summary,
            format!("Set priority of reminder {}: Laundry to 5", id)
        );
    }
}

// ============================================================
// Note Tools
// ============================================================

mod note_tools {
    use super::*;

    #[tokio::test]
    async fn create_note_reports_the_folder() {
        let (server, bridge) = setup();
        bridge.add_folder("Notes");
        bridge.add_folder("Work");

        let output = server
            .run_create_note(CreateNoteRequest {
                title: "Agenda".to_string(),
                content: "Q3 plans".to_string(),
                container_name: Some("Work".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(output.summary, "Created note \"Agenda\" in Work");
    }

    #[tokio::test]
    async fn create_note_requires_a_title() {
        let (server, bridge) = setup();
        bridge.add_folder("Notes");

        let err = server
            .run_create_note(CreateNoteRequest {
                title: " ".to_string(),
                content: "Q3 plans".to_string(),
                container_name: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)), "got {:?}", err);
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn update_note_maps_title_and_content() {
        let (server, bridge) = setup();
        let folder = bridge.add_folder("Notes");
        let id = bridge.add_note(&folder, "Groceries", "Eggs");

        let output = server
            .run_update_note(UpdateNoteRequest {
                id: id.clone(),
                title: Some("Shopping".to_string()),
                content: Some("Eggs, milk".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(output.summary, "Updated note \"Shopping\" in Notes");
        let stored = bridge.note(&id).expect("note should exist");
        assert_eq!(stored.body.as_deref(), Some("Eggs, milk"));
    }

    #[tokio::test]
    async fn list_notes_with_unknown_folder_is_empty() {
        let (server, bridge) = setup();
        let folder = bridge.add_folder("Notes");
        bridge.add_note(&folder, "Groceries", "Eggs");

        let output = server
            .run_list_notes(ListNotesRequest {
                container_name: Some("Work".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(output.data.is_empty());
        assert_eq!(output.summary, "Found 0 notes:");
    }

    #[tokio::test]
    async fn list_note_folders_names_each_folder() {
        let (server, bridge) = setup();
        bridge.add_folder("Notes");
        bridge.add_folder("Work");

        let output = server.run_list_note_folders().await.unwrap();

        assert_eq!(output.summary, "Found 2 folders:\n- Notes\n- Work");
    }
}

// ============================================================
// Calendar Tools
// ============================================================

mod calendar_tools {
    use super::*;

    fn create_request(calendar: &str, start: &str, end: &str) -> CreateEventRequest {
        CreateEventRequest {
            calendar_name: calendar.to_string(),
            summary: "Planning".to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            allday_event: false,
            description: None,
            location: Some("Room 4".to_string()),
            url: None,
            recurrence: None,
        }
    }

    #[tokio::test]
    async fn create_event_formats_times_in_utc() {
        let (server, bridge) = setup();
        bridge.add_calendar("Work", true);

        let output = server
            .run_create_event(create_request(
                "Work",
                "2024-03-01T10:00:00+01:00",
                "2024-03-01T11:00:00+01:00",
            ))
            .await
            .unwrap();

        assert_eq!(
            output.summary,
            "Created event \"Planning\" in Work (2024-03-01 09:00 UTC - 2024-03-01 10:00 UTC)"
        );
        assert_eq!(output.data.location, "Room 4");
    }

    #[tokio::test]
    async fn create_event_rejects_a_missing_end_date() {
        let (server, bridge) = setup();
        bridge.add_calendar("Work", true);

        let err = server
            .run_create_event(create_request("Work", "2024-03-01T10:00:00Z", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)), "got {:?}", err);
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn update_event_rejects_unknown_status() {
        let (server, bridge) = setup();

        let err = server
            .run_update_event(UpdateEventRequest {
                id: "E1".to_string(),
                status: Some("postponed".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)), "got {:?}", err);
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn find_conflicts_lists_overlapping_events() {
        let (server, bridge) = setup();
        let work = bridge.add_calendar("Work", true);
        let at = |h| Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap();
        bridge.add_event(&work, "Standup", at(9), at(10), |_| {});
        bridge.add_event(&work, "Review", at(10), at(12), |e| {
            e.location = Some("Room 4".to_string());
        });

        let output = server
            .run_find_conflicts(FindConflictsRequest {
                start_date: "2024-03-01T10:00:00Z".to_string(),
                end_date: "2024-03-01T11:00:00Z".to_string(),
                calendar_names: vec![],
            })
            .await
            .unwrap();

        assert_eq!(
            output.summary,
            "Found 1 conflicting events:\n- Review (in Work, 2024-03-01 10:00 UTC - 2024-03-01 12:00 UTC) at Room 4"
        );
        assert_eq!(bridge.calls(), vec![Script::ListEvents]);
    }

    #[tokio::test]
    async fn list_calendars_marks_read_only_calendars() {
        let (server, bridge) = setup();
        bridge.add_calendar("Work", true);
        bridge.add_calendar("Holidays", false);

        let output = server.run_list_calendars().await.unwrap();

        assert_eq!(output.summary, "Found 2 calendars:\n- Work\n- Holidays (read-only)");
    }
}

// ============================================================
// Call Results
// ============================================================

mod call_results {
    use super::*;

    #[tokio::test]
    async fn carry_summary_then_pretty_json() {
        let (server, bridge) = setup();
        bridge.add_folder("Notes");

        let result = server
            .run_list_note_folders()
            .await
            .unwrap()
            .into_call_result()
            .unwrap();

        let value = serde_json::to_value(&result).unwrap();
        let content = value["content"].as_array().expect("content array");
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["text"], "Found 1 folders:\n- Notes");

        let folders: serde_json::Value =
            serde_json::from_str(content[1]["text"].as_str().unwrap()).unwrap();
        assert_eq!(folders[0]["name"], "Notes");
    }
}
