//! Raw records as the host scripts return them, and their conversion into
//! the domain model.
//!
//! Host property names are kept verbatim (`completionDate`, `plaintext`),
//! and anything the host may report as missing is optional here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::capability::{
    decode_field, optional_timestamp_value, timestamp_value, Container, HostField, Readable,
    Writable,
};
use super::BridgeError;
use crate::models::{
    Calendar, CalendarEvent, ContainerRef, EventStatus, Note, Reminder, Timestamp,
};

// ============================================================
// Reminders
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completion_date: Option<Timestamp>,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub allday_due_date: Option<Timestamp>,
    #[serde(default)]
    pub remind_me_date: Option<Timestamp>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub creation_date: Option<Timestamp>,
    #[serde(default)]
    pub modification_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderField {
    Name,
    Body,
    Completed,
    Priority,
    Flagged,
    DueDate,
    RemindMeDate,
}

impl HostField for ReminderField {
    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Body,
        Self::Completed,
        Self::Priority,
        Self::Flagged,
        Self::DueDate,
        Self::RemindMeDate,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Body => "body",
            Self::Completed => "completed",
            Self::Priority => "priority",
            Self::Flagged => "flagged",
            Self::DueDate => "dueDate",
            Self::RemindMeDate => "remindMeDate",
        }
    }
}

impl Readable for ReminderRecord {
    type Field = ReminderField;

    fn get(&self, field: ReminderField) -> Value {
        match field {
            ReminderField::Name => Value::from(self.name.as_str()),
            ReminderField::Body => Value::from(self.body.clone().unwrap_or_default()),
            ReminderField::Completed => Value::from(self.completed),
            ReminderField::Priority => Value::from(self.priority),
            ReminderField::Flagged => Value::from(self.flagged),
            ReminderField::DueDate => optional_timestamp_value(self.due_date),
            ReminderField::RemindMeDate => optional_timestamp_value(self.remind_me_date),
        }
    }
}

impl Writable for ReminderRecord {
    fn set(&mut self, field: ReminderField, value: Value) -> Result<(), BridgeError> {
        match field {
            ReminderField::Name => self.name = decode_field(field, value)?,
            ReminderField::Body => self.body = Some(decode_field(field, value)?),
            ReminderField::Completed => self.completed = decode_field(field, value)?,
            ReminderField::Priority => self.priority = decode_field(field, value)?,
            ReminderField::Flagged => self.flagged = decode_field(field, value)?,
            ReminderField::DueDate => self.due_date = decode_field(field, value)?,
            ReminderField::RemindMeDate => self.remind_me_date = decode_field(field, value)?,
        }
        Ok(())
    }
}

impl From<ReminderRecord> for Reminder {
    fn from(record: ReminderRecord) -> Self {
        Reminder {
            id: record.id,
            name: record.name,
            body: record.body.unwrap_or_default(),
            completed: record.completed,
            completed_date: record.completion_date,
            due_date: record.due_date,
            allday_due_date: record.allday_due_date,
            remind_me_date: record.remind_me_date,
            priority: record.priority,
            flagged: record.flagged,
            creation_date: record.creation_date,
            modification_date: record.modification_date,
        }
    }
}

// ============================================================
// Notes
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub plaintext: Option<String>,
    pub creation_date: Timestamp,
    pub modification_date: Timestamp,
    pub container: ContainerRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Name,
    Body,
}

impl HostField for NoteField {
    const ALL: &'static [Self] = &[Self::Name, Self::Body];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Body => "body",
        }
    }
}

impl Readable for NoteRecord {
    type Field = NoteField;

    fn get(&self, field: NoteField) -> Value {
        match field {
            NoteField::Name => Value::from(self.name.as_str()),
            NoteField::Body => Value::from(self.body.clone().unwrap_or_default()),
        }
    }
}

impl Writable for NoteRecord {
    fn set(&mut self, field: NoteField, value: Value) -> Result<(), BridgeError> {
        match field {
            NoteField::Name => self.name = decode_field(field, value)?,
            NoteField::Body => {
                let body: String = decode_field(field, value)?;
                self.plaintext = Some(body.clone());
                self.body = Some(body);
            }
        }
        Ok(())
    }
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        let body = record.body.unwrap_or_default();
        Note {
            id: record.id,
            name: record.name,
            plain_text: record.plaintext.unwrap_or_else(|| body.clone()),
            body,
            creation_date: record.creation_date,
            modification_date: record.modification_date,
            container: record.container,
        }
    }
}

// ============================================================
// Calendar
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub writable: bool,
}

impl Container for CalendarRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl From<CalendarRecord> for Calendar {
    fn from(record: CalendarRecord) -> Self {
        let description = record.description.unwrap_or_default();
        Calendar {
            id: record.id,
            name: record.name,
            body: description.clone(),
            description,
            writable: record.writable,
        }
    }
}

/// An event as Calendar reports it. The host has no title or body of its
/// own for events; those are derived from `summary` and `description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub uid: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    #[serde(default)]
    pub allday_event: bool,
    #[serde(default)]
    pub recurrence: Option<String>,
    #[serde(default)]
    pub sequence: i64,
    #[serde(default)]
    pub stamp_date: Option<Timestamp>,
    #[serde(default)]
    pub excluded_dates: Vec<Timestamp>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub calendar: ContainerRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    Summary,
    Description,
    StartDate,
    EndDate,
    AlldayEvent,
    Recurrence,
    Status,
    Location,
    Url,
}

impl HostField for EventField {
    const ALL: &'static [Self] = &[
        Self::Summary,
        Self::Description,
        Self::StartDate,
        Self::EndDate,
        Self::AlldayEvent,
        Self::Recurrence,
        Self::Status,
        Self::Location,
        Self::Url,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Description => "description",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::AlldayEvent => "alldayEvent",
            Self::Recurrence => "recurrence",
            Self::Status => "status",
            Self::Location => "location",
            Self::Url => "url",
        }
    }
}

fn text_value(text: &Option<String>) -> Value {
    Value::from(text.clone().unwrap_or_default())
}

impl Readable for EventRecord {
    type Field = EventField;

    fn get(&self, field: EventField) -> Value {
        match field {
            EventField::Summary => text_value(&self.summary),
            EventField::Description => text_value(&self.description),
            EventField::StartDate => timestamp_value(self.start_date),
            EventField::EndDate => timestamp_value(self.end_date),
            EventField::AlldayEvent => Value::from(self.allday_event),
            EventField::Recurrence => text_value(&self.recurrence),
            EventField::Status => {
                Value::from(self.status.unwrap_or(EventStatus::None).as_str())
            }
            EventField::Location => text_value(&self.location),
            EventField::Url => text_value(&self.url),
        }
    }
}

impl Writable for EventRecord {
    fn set(&mut self, field: EventField, value: Value) -> Result<(), BridgeError> {
        match field {
            EventField::Summary => self.summary = Some(decode_field(field, value)?),
            EventField::Description => self.description = Some(decode_field(field, value)?),
            EventField::StartDate => self.start_date = decode_field(field, value)?,
            EventField::EndDate => self.end_date = decode_field(field, value)?,
            EventField::AlldayEvent => self.allday_event = decode_field(field, value)?,
            EventField::Recurrence => self.recurrence = Some(decode_field(field, value)?),
            EventField::Status => self.status = Some(decode_field(field, value)?),
            EventField::Location => self.location = Some(decode_field(field, value)?),
            EventField::Url => self.url = Some(decode_field(field, value)?),
        }
        Ok(())
    }
}

impl From<EventRecord> for CalendarEvent {
    fn from(record: EventRecord) -> Self {
        let summary = record.summary.unwrap_or_default();
        let description = record.description.unwrap_or_default();
        CalendarEvent {
            id: record.id,
            name: summary.clone(),
            body: description.clone(),
            description,
            start_date: record.start_date,
            end_date: record.end_date,
            allday_event: record.allday_event,
            recurrence: record.recurrence.unwrap_or_default(),
            sequence: record.sequence,
            stamp_date: record.stamp_date,
            excluded_dates: record.excluded_dates,
            status: record.status.unwrap_or(EventStatus::None),
            summary,
            location: record.location.unwrap_or_default(),
            uid: record.uid,
            url: record.url.unwrap_or_default(),
            calendar: record.calendar,
        }
    }
}

/// Properties sent with `CreateEvent`. Optional fields left as `None` keep
/// the host default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventProperties {
    pub summary: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub allday_event: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub recurrence: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Patch;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn reminder_record() -> ReminderRecord {
        serde_json::from_value(json!({
            "id": "x-apple-reminder://1",
            "name": "Buy milk",
            "body": null,
            "completed": false,
            "completionDate": null,
            "dueDate": "2024-01-02T09:00:00.000Z",
            "priority": 0,
            "flagged": false
        }))
        .unwrap()
    }

    #[test]
    fn host_nulls_become_empty_strings() {
        let reminder = Reminder::from(reminder_record());
        assert_eq!(reminder.body, "");
        assert_eq!(
            reminder.due_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn retain_changes_drops_unchanged_fields() {
        let record = reminder_record();
        let mut patch = Patch::new();
        patch.set(ReminderField::Name, json!("Buy milk"));
        patch.set(ReminderField::Flagged, json!(true));
        patch.set_timestamp(
            ReminderField::DueDate,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()),
        );

        let patch = patch.retain_changes(&record);

        assert_eq!(patch.fields(), vec![ReminderField::Flagged]);
    }

    #[test]
    fn patch_rejects_read_only_fields() {
        let result = Patch::<EventField>::from_value(&json!({ "uid": "abc" }));
        assert!(result.is_err());
    }

    #[test]
    fn event_name_and_body_follow_summary_and_description() {
        let record: EventRecord = serde_json::from_value(json!({
            "id": "E1",
            "uid": "E1",
            "summary": "Standup",
            "description": "Daily sync",
            "startDate": "2024-01-01T10:00:00Z",
            "endDate": "2024-01-01T10:15:00Z",
            "status": "confirmed",
            "calendar": { "id": "C1", "name": "Work" }
        }))
        .unwrap();

        let event = CalendarEvent::from(record);

        assert_eq!(event.name, "Standup");
        assert_eq!(event.body, "Daily sync");
        assert_eq!(event.status, EventStatus::Confirmed);
        assert!(event.excluded_dates.is_empty());
    }
}
