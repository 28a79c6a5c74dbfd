//! Request types for MCP tools, and their conversion into service inputs.
//!
//! Requests are flat camelCase property bags with dates as ISO-8601
//! strings. The same types back the HTTP query strings, which is why none of
//! them use `#[serde(flatten)]`.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{
    parse_optional_timestamp, BaseFilter, CreateEventOptions, EventFilter,
    EventStatus, NoteFilter, ReminderFilter, Timestamp, UpdateEventInput, UpdateNoteInput,
    UpdateReminderInput,
};

fn parse_status(status: Option<&str>) -> Result<Option<EventStatus>> {
    match status {
        None | Some("") => Ok(None),
        Some(s) => EventStatus::from_str(s).map(Some).ok_or_else(|| {
            Error::validation(format!(
                "status must be one of cancelled, confirmed, none, tentative; got '{}'",
                s
            ))
        }),
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_timestamp(field: &str, value: &str) -> Result<Timestamp> {
    parse_optional_timestamp(field, Some(value))?
        .ok_or_else(|| Error::validation(format!("{} is required", field)))
}

#[allow(clippy::too_many_arguments)]
fn base_filter(
    name: Option<String>,
    body: Option<String>,
    created_after: Option<&str>,
    created_before: Option<&str>,
    modified_after: Option<&str>,
    modified_before: Option<&str>,
) -> Result<BaseFilter> {
    Ok(BaseFilter {
        name,
        body,
        created_after: parse_optional_timestamp("createdAfter", created_after)?,
        created_before: parse_optional_timestamp("createdBefore", created_before)?,
        modified_after: parse_optional_timestamp("modifiedAfter", modified_after)?,
        modified_before: parse_optional_timestamp("modifiedBefore", modified_before)?,
    })
}

// ============================================================
// Reminders
// ============================================================

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListRemindersRequest {
    #[schemars(description = "Filter by title (case-insensitive substring)")]
    pub name: Option<String>,
    #[schemars(description = "Filter by notes text (case-insensitive substring)")]
    pub body: Option<String>,
    #[schemars(description = "Filter by completion status")]
    pub completed: Option<bool>,
    #[schemars(description = "Filter by flag status")]
    pub flagged: Option<bool>,
    #[schemars(description = "Filter by priority level")]
    pub priority: Option<i64>,
    #[schemars(description = "ISO date string to filter reminders due after this date")]
    pub due_after: Option<String>,
    #[schemars(description = "ISO date string to filter reminders due before this date")]
    pub due_before: Option<String>,
    #[schemars(description = "ISO date string to filter reminders created after this date")]
    pub created_after: Option<String>,
    #[schemars(description = "ISO date string to filter reminders created before this date")]
    pub created_before: Option<String>,
    #[schemars(description = "ISO date string to filter reminders modified after this date")]
    pub modified_after: Option<String>,
    #[schemars(description = "ISO date string to filter reminders modified before this date")]
    pub modified_before: Option<String>,
}

impl TryFrom<ListRemindersRequest> for ReminderFilter {
    type Error = Error;

    fn try_from(req: ListRemindersRequest) -> Result<Self> {
        Ok(ReminderFilter {
            base: base_filter(
                req.name,
                req.body,
                req.created_after.as_deref(),
                req.created_before.as_deref(),
                req.modified_after.as_deref(),
                req.modified_before.as_deref(),
            )?,
            completed: req.completed,
            flagged: req.flagged,
            priority: req.priority,
            due_after: parse_optional_timestamp("dueAfter", req.due_after.as_deref())?,
            due_before: parse_optional_timestamp("dueBefore", req.due_before.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateReminderRequest {
    #[schemars(description = "Title of the reminder")]
    pub title: String,
    #[schemars(description = "Text content of the reminder")]
    pub content: String,
}

impl CreateReminderRequest {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReminderRequest {
    #[schemars(description = "ID of the reminder to update")]
    #[serde(default)]
    pub id: String,
    #[schemars(description = "New title for the reminder")]
    pub name: Option<String>,
    #[schemars(description = "New content for the reminder")]
    pub body: Option<String>,
    #[schemars(description = "New completion status")]
    pub completed: Option<bool>,
    #[schemars(description = "New priority level")]
    pub priority: Option<i64>,
    #[schemars(description = "New flag status")]
    pub flagged: Option<bool>,
    #[schemars(description = "New due date (ISO date string)")]
    pub due_date: Option<String>,
    #[schemars(description = "New reminder alert date (ISO date string)")]
    pub remind_me_date: Option<String>,
}

impl TryFrom<UpdateReminderRequest> for UpdateReminderInput {
    type Error = Error;

    fn try_from(req: UpdateReminderRequest) -> Result<Self> {
        Ok(UpdateReminderInput {
            name: req.name,
            body: req.body,
            completed: req.completed,
            priority: req.priority,
            flagged: req.flagged,
            due_date: parse_optional_timestamp("dueDate", req.due_date.as_deref())?,
            remind_me_date: parse_optional_timestamp("remindMeDate", req.remind_me_date.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompleteReminderRequest {
    #[schemars(description = "ID of the reminder to complete")]
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FlagReminderRequest {
    #[schemars(description = "ID of the reminder")]
    #[serde(default)]
    pub id: String,
    #[schemars(description = "New flag status")]
    pub flagged: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SetReminderPriorityRequest {
    #[schemars(description = "ID of the reminder")]
    #[serde(default)]
    pub id: String,
    #[schemars(description = "New priority level (0 none, 1 high, 5 medium, 9 low)")]
    pub priority: i64,
}

// ============================================================
// Notes
// ============================================================

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesRequest {
    #[schemars(description = "Filter by note title (case-insensitive)")]
    pub name: Option<String>,
    #[schemars(description = "Filter by note content (case-insensitive)")]
    pub body: Option<String>,
    #[schemars(description = "ISO date string to filter notes created after this date")]
    pub created_after: Option<String>,
    #[schemars(description = "ISO date string to filter notes created before this date")]
    pub created_before: Option<String>,
    #[schemars(description = "ISO date string to filter notes modified after this date")]
    pub modified_after: Option<String>,
    #[schemars(description = "ISO date string to filter notes modified before this date")]
    pub modified_before: Option<String>,
    #[schemars(description = "Filter by folder ID")]
    pub container_id: Option<String>,
    #[schemars(description = "Filter by folder name")]
    pub container_name: Option<String>,
}

impl TryFrom<ListNotesRequest> for NoteFilter {
    type Error = Error;

    fn try_from(req: ListNotesRequest) -> Result<Self> {
        Ok(NoteFilter {
            base: base_filter(
                req.name,
                req.body,
                req.created_after.as_deref(),
                req.created_before.as_deref(),
                req.modified_after.as_deref(),
                req.modified_before.as_deref(),
            )?,
            container_id: req.container_id,
            container_name: req.container_name,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[schemars(description = "Title of the note")]
    pub title: String,
    #[schemars(description = "Text content of the note")]
    pub content: String,
    #[schemars(description = "Name of the folder to create the note in")]
    pub container_name: Option<String>,
}

impl CreateNoteRequest {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct UpdateNoteRequest {
    #[schemars(description = "ID of the note to update")]
    #[serde(default)]
    pub id: String,
    #[schemars(description = "New title for the note")]
    pub title: Option<String>,
    #[schemars(description = "New content for the note")]
    pub content: Option<String>,
}

impl From<UpdateNoteRequest> for UpdateNoteInput {
    fn from(req: UpdateNoteRequest) -> Self {
        UpdateNoteInput {
            name: req.title,
            body: req.content,
        }
    }
}

// ============================================================
// Calendar
// ============================================================

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsRequest {
    #[schemars(description = "Filter by event title (case-insensitive)")]
    pub name: Option<String>,
    #[schemars(description = "Filter by event content (case-insensitive)")]
    pub body: Option<String>,
    #[schemars(description = "ISO date string to filter events last modified after this date")]
    pub modified_after: Option<String>,
    #[schemars(description = "ISO date string to filter events last modified before this date")]
    pub modified_before: Option<String>,
    #[schemars(description = "ISO date string to filter events starting after this date")]
    pub start_after: Option<String>,
    #[schemars(description = "ISO date string to filter events starting before this date")]
    pub start_before: Option<String>,
    #[schemars(description = "ISO date string to filter events ending after this date")]
    pub end_after: Option<String>,
    #[schemars(description = "ISO date string to filter events ending before this date")]
    pub end_before: Option<String>,
    #[schemars(description = "Filter by calendar ID")]
    pub calendar_id: Option<String>,
    #[schemars(description = "Filter by calendar name")]
    pub calendar_name: Option<String>,
    #[schemars(description = "Filter by event status: 'cancelled', 'confirmed', 'none' or 'tentative'")]
    pub status: Option<String>,
    #[schemars(description = "Filter by event location (case-insensitive)")]
    pub location: Option<String>,
}

impl TryFrom<ListEventsRequest> for EventFilter {
    type Error = Error;

    fn try_from(req: ListEventsRequest) -> Result<Self> {
        Ok(EventFilter {
            base: base_filter(
                req.name,
                req.body,
                None,
                None,
                req.modified_after.as_deref(),
                req.modified_before.as_deref(),
            )?,
            start_after: parse_optional_timestamp("startAfter", req.start_after.as_deref())?,
            start_before: parse_optional_timestamp("startBefore", req.start_before.as_deref())?,
            end_after: parse_optional_timestamp("endAfter", req.end_after.as_deref())?,
            end_before: parse_optional_timestamp("endBefore", req.end_before.as_deref())?,
            calendar_id: req.calendar_id,
            calendar_name: req.calendar_name,
            status: parse_status(req.status.as_deref())?,
            location: req.location,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[schemars(description = "Name of the calendar")]
    pub calendar_name: String,
    #[schemars(description = "Summary of the event")]
    pub summary: String,
    #[schemars(description = "ISO date string for the event start")]
    pub start_date: String,
    #[schemars(description = "ISO date string for the event end")]
    pub end_date: String,
    #[schemars(description = "Whether the event is all day")]
    #[serde(default)]
    pub allday_event: bool,
    #[schemars(description = "Detailed description of the event")]
    pub description: Option<String>,
    #[schemars(description = "Location of the event")]
    pub location: Option<String>,
    #[schemars(description = "URL associated with the event")]
    pub url: Option<String>,
    #[schemars(description = "Recurrence rule for the event")]
    pub recurrence: Option<String>,
}

/// A create-event request with its dates parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub calendar_name: String,
    pub summary: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub allday: bool,
    pub options: CreateEventOptions,
}

impl TryFrom<CreateEventRequest> for NewEvent {
    type Error = Error;

    fn try_from(req: CreateEventRequest) -> Result<Self> {
        require_text("calendarName", &req.calendar_name)?;
        require_text("summary", &req.summary)?;
        Ok(NewEvent {
            start: require_timestamp("startDate", &req.start_date)?,
            end: require_timestamp("endDate", &req.end_date)?,
            calendar_name: req.calendar_name,
            summary: req.summary,
            allday: req.allday_event,
            options: CreateEventOptions {
                description: req.description,
                location: req.location,
                url: req.url,
                recurrence: req.recurrence,
            },
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[schemars(description = "ID of the event to update")]
    #[serde(default)]
    pub id: String,
    #[schemars(description = "New summary for the event")]
    pub summary: Option<String>,
    #[schemars(description = "Alias for summary; ignored when summary is also given")]
    pub name: Option<String>,
    #[schemars(description = "New detailed description of the event")]
    pub description: Option<String>,
    #[schemars(description = "Alias for description; ignored when description is also given")]
    pub body: Option<String>,
    #[schemars(description = "New ISO date string for the event start")]
    pub start_date: Option<String>,
    #[schemars(description = "New ISO date string for the event end")]
    pub end_date: Option<String>,
    #[schemars(description = "Whether the event is all day")]
    pub allday_event: Option<bool>,
    #[schemars(description = "New recurrence rule for the event")]
    pub recurrence: Option<String>,
    #[schemars(description = "New status: 'cancelled', 'confirmed', 'none' or 'tentative'")]
    pub status: Option<String>,
    #[schemars(description = "New location of the event")]
    pub location: Option<String>,
    #[schemars(description = "New URL associated with the event")]
    pub url: Option<String>,
}

impl TryFrom<UpdateEventRequest> for UpdateEventInput {
    type Error = Error;

    fn try_from(req: UpdateEventRequest) -> Result<Self> {
        Ok(UpdateEventInput {
            name: req.name,
            body: req.body,
            description: req.description,
            start_date: parse_optional_timestamp("startDate", req.start_date.as_deref())?,
            end_date: parse_optional_timestamp("endDate", req.end_date.as_deref())?,
            allday_event: req.allday_event,
            recurrence: req.recurrence,
            status: parse_status(req.status.as_deref())?,
            summary: req.summary,
            location: req.location,
            url: req.url,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindConflictsRequest {
    #[schemars(description = "ISO date string for the start of the time window")]
    pub start_date: String,
    #[schemars(description = "ISO date string for the end of the time window")]
    pub end_date: String,
    #[schemars(description = "Only check calendars with these names")]
    #[serde(default)]
    pub calendar_names: Vec<String>,
}

impl FindConflictsRequest {
    pub fn window(&self) -> Result<(Timestamp, Timestamp)> {
        Ok((
            require_timestamp("startDate", &self.start_date)?,
            require_timestamp("endDate", &self.end_date)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_is_rejected() {
        let req = CreateReminderRequest {
            title: "  ".to_string(),
            content: "milk".to_string(),
        };
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let req = ListEventsRequest {
            status: Some("maybe".to_string()),
            ..Default::default()
        };
        let err = EventFilter::try_from(req).unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_list_events_request_parses_dates_and_status() {
        let req = ListEventsRequest {
            start_after: Some("2024-03-01T09:00:00Z".to_string()),
            status: Some("confirmed".to_string()),
            calendar_name: Some("Work".to_string()),
            ..Default::default()
        };
        let filter = EventFilter::try_from(req).unwrap();
        assert_eq!(filter.status, Some(EventStatus::Confirmed));
        assert_eq!(
            filter.start_after.map(|t| t.to_rfc3339()),
            Some("2024-03-01T09:00:00+00:00".to_string())
        );
        assert_eq!(filter.calendar_name.as_deref(), Some("Work"));
    }

    #[test]
    fn test_bad_due_date_names_the_field() {
        let req = UpdateReminderRequest {
            id: "r1".to_string(),
            due_date: Some("next tuesday".to_string()),
            ..Default::default()
        };
        let err = UpdateReminderInput::try_from(req).unwrap_err();
        assert!(err.to_string().contains("dueDate"));
    }

    #[test]
    fn test_update_note_maps_title_and_content() {
        let input = UpdateNoteInput::from(UpdateNoteRequest {
            id: "n1".to_string(),
            title: Some("Groceries".to_string()),
            content: None,
        });
        assert_eq!(input.name.as_deref(), Some("Groceries"));
        assert_eq!(input.body, None);
    }

    #[test]
    fn test_conflict_window_requires_both_dates() {
        let req = FindConflictsRequest {
            start_date: "2024-03-01T09:00:00Z".to_string(),
            end_date: String::new(),
            calendar_names: vec![],
        };
        assert!(matches!(req.window(), Err(Error::Validation(_))));
    }
}
