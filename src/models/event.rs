use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::{contains_text, equals, within_range, Matches};
use super::{BaseFilter, BaseObject, ContainerRef, Timestamp};

/// An event from the Calendar application.
///
/// The host has no separate title/body for events: `name` mirrors `summary`
/// and `body` mirrors `description`. `sequence`, `stamp_date`, `uid` and
/// `calendar` are host-owned and never written by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub name: String,
    pub body: String,
    pub description: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub allday_event: bool,
    /// iCalendar recurrence rule, empty when the event does not repeat.
    pub recurrence: String,
    pub sequence: i64,
    pub stamp_date: Option<Timestamp>,
    pub excluded_dates: Vec<Timestamp>,
    pub status: EventStatus,
    pub summary: String,
    pub location: String,
    pub uid: String,
    pub url: String,
    pub calendar: ContainerRef,
}

impl CalendarEvent {
    /// Whether the event's half-open interval overlaps `[start, end)`.
    pub fn overlaps(&self, start: Timestamp, end: Timestamp) -> bool {
        overlaps(self.start_date, self.end_date, start, end)
    }
}

impl BaseObject for CalendarEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn modified(&self) -> Option<Timestamp> {
        self.stamp_date
    }
}

/// Three-case overlap test over half-open intervals.
///
/// An event conflicts with the window when it starts inside it, ends inside
/// it, or strictly spans it. Touching endpoints do not conflict, which also
/// holds for a zero-width window.
pub fn overlaps(
    event_start: Timestamp,
    event_end: Timestamp,
    start: Timestamp,
    end: Timestamp,
) -> bool {
    let starts_inside = event_start >= start && event_start < end;
    let ends_inside = event_end > start && event_end <= end;
    let spans = event_start < start && event_end > end;
    starts_inside || ends_inside || spans
}

/// The confirmation status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Cancelled,
    Confirmed,
    None,
    Tentative,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Confirmed => "confirmed",
            Self::None => "none",
            Self::Tentative => "tentative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cancelled" => Some(Self::Cancelled),
            "confirmed" => Some(Self::Confirmed),
            "none" => Some(Self::None),
            "tentative" => Some(Self::Tentative),
            _ => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar from the Calendar application.
///
/// Events can only be created in calendars with `writable == true`; the host
/// rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    pub name: String,
    pub body: String,
    pub description: String,
    pub writable: bool,
}

/// Filter for listing events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    pub start_after: Option<Timestamp>,
    pub start_before: Option<Timestamp>,
    pub end_after: Option<Timestamp>,
    pub end_before: Option<Timestamp>,
    pub calendar_id: Option<String>,
    pub calendar_name: Option<String>,
    pub status: Option<EventStatus>,
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
}

impl EventFilter {
    pub fn narrows_calendars(&self) -> bool {
        self.calendar_id.is_some() || self.calendar_name.is_some()
    }

    pub fn accepts_calendar(&self, id: &str, name: &str) -> bool {
        equals(id, self.calendar_id.as_deref()) && equals(name, self.calendar_name.as_deref())
    }
}

impl Matches<CalendarEvent> for EventFilter {
    fn matches(&self, event: &CalendarEvent) -> bool {
        self.base.matches_base(event)
            && within_range(Some(event.start_date), self.start_after, self.start_before)
            && within_range(Some(event.end_date), self.end_after, self.end_before)
            && self.accepts_calendar(&event.calendar.id, &event.calendar.name)
            && equals(&event.status, self.status.as_ref())
            && contains_text(&event.location, self.location.as_deref())
    }
}

/// Optional properties for a new event. Omitted fields keep the host default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventOptions {
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub recurrence: Option<String>,
}

/// Sparse update for an event.
///
/// `name`/`summary` and `body`/`description` address the same host
/// properties; when both of a pair are set, `summary` and `description` win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    pub name: Option<String>,
    pub body: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub allday_event: Option<bool>,
    pub recurrence: Option<String>,
    pub status: Option<EventStatus>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
}
