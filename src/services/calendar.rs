use serde_json::Value;

use super::narrowed_ids;
use crate::bridge::{
    invoke_as, BridgeError, CalendarRecord, EventField, EventRecord, NewEventProperties, Patch,
    Script, SharedBridge,
};
use crate::error::{Error, Result};
use crate::models::filter::apply;
use crate::models::{
    Calendar, CalendarEvent, CreateEventOptions, EventFilter, EventStatus, Timestamp,
    UpdateEventInput,
};

/// Calendars and their events.
pub struct CalendarService {
    bridge: SharedBridge,
}

impl CalendarService {
    pub fn new(bridge: SharedBridge) -> Self {
        Self { bridge }
    }

    pub async fn list_calendars(&self) -> Result<Vec<Calendar>> {
        let calendars = self.fetch_calendars().await?;
        Ok(calendars.into_iter().map(Calendar::from).collect())
    }

    /// Creates an event in the calendar named `calendar_name`.
    ///
    /// Read-only calendars are refused by the host and surface as
    /// [`Error::Adapter`].
    pub async fn create_event(
        &self,
        calendar_name: &str,
        summary: &str,
        start: Timestamp,
        end: Timestamp,
        allday: bool,
        options: CreateEventOptions,
    ) -> Result<CalendarEvent> {
        let calendar = self
            .fetch_calendars()
            .await?
            .into_iter()
            .find(|c| c.name == calendar_name)
            .ok_or_else(|| Error::not_found(format!("Calendar named {}", calendar_name)))?;

        let props = NewEventProperties {
            summary: summary.to_string(),
            start_date: start,
            end_date: end,
            allday_event: allday,
            description: options.description,
            location: options.location,
            url: options.url,
            recurrence: options.recurrence,
        };
        let props = serde_json::to_value(&props).map_err(BridgeError::from)?;
        let record: EventRecord = invoke_as(
            self.bridge.as_ref(),
            Script::CreateEvent,
            vec![Value::from(calendar.id.as_str()), props],
        )
        .await?;

        tracing::debug!(id = %record.id, calendar = %calendar.name, "created event");
        Ok(record.into())
    }

    pub async fn list_events(&self, filter: Option<&EventFilter>) -> Result<Vec<CalendarEvent>> {
        let calendar_ids = match filter {
            Some(f) if f.narrows_calendars() => {
                let calendars = self.fetch_calendars().await?;
                let ids = narrowed_ids(&calendars, |id, name| f.accepts_calendar(id, name));
                if ids.is_empty() {
                    tracing::debug!("no calendar matches the calendar filter");
                    return Ok(Vec::new());
                }
                Some(ids)
            }
            _ => None,
        };

        let events = self.fetch_events(calendar_ids).await?;
        let total = events.len();
        let events = apply(events, filter);

        tracing::debug!(total, matched = events.len(), "listed events");
        Ok(events)
    }

    /// Applies a sparse update to the event with `id` in whichever calendar
    /// holds it.
    pub async fn update_event(&self, id: &str, update: UpdateEventInput) -> Result<CalendarEvent> {
        let current: EventRecord = invoke_as::<Vec<EventRecord>>(
            self.bridge.as_ref(),
            Script::ListEvents,
            vec![Value::Null],
        )
        .await?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| Error::not_found(format!("Event with id {}", id)))?;

        let patch = event_patch(update).retain_changes(&current);
        if patch.is_empty() {
            tracing::debug!(id, "event already up to date");
            return Ok(current.into());
        }

        tracing::debug!(id, fields = ?patch.fields(), "updating event");
        let record: EventRecord = invoke_as(
            self.bridge.as_ref(),
            Script::UpdateEvent,
            vec![
                Value::from(current.calendar.id.as_str()),
                Value::from(id),
                patch.to_value(),
            ],
        )
        .await?;
        Ok(record.into())
    }

    /// Events that overlap `[start, end)`, ignoring cancelled ones.
    ///
    /// `calendar_names` keeps only calendars whose name is in the list; an
    /// empty list searches every calendar.
    pub async fn find_conflicts(
        &self,
        start: Timestamp,
        end: Timestamp,
        calendar_names: &[String],
    ) -> Result<Vec<CalendarEvent>> {
        if end < start {
            return Err(Error::validation("endDate must not be before startDate"));
        }

        let calendar_ids = if calendar_names.is_empty() {
            None
        } else {
            let calendars = self.fetch_calendars().await?;
            let ids = narrowed_ids(&calendars, |_, name| {
                calendar_names.iter().any(|n| n == name)
            });
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            Some(ids)
        };

        let conflicts: Vec<CalendarEvent> = self
            .fetch_events(calendar_ids)
            .await?
            .into_iter()
            .filter(|e| e.status != EventStatus::Cancelled && e.overlaps(start, end))
            .collect();

        tracing::debug!(%start, %end, conflicts = conflicts.len(), "checked for conflicts");
        Ok(conflicts)
    }

    async fn fetch_calendars(&self) -> Result<Vec<CalendarRecord>> {
        Ok(invoke_as(self.bridge.as_ref(), Script::ListCalendars, vec![]).await?)
    }

    async fn fetch_events(&self, calendar_ids: Option<Vec<String>>) -> Result<Vec<CalendarEvent>> {
        let scope = calendar_ids.map(Value::from).unwrap_or(Value::Null);
        let records: Vec<EventRecord> =
            invoke_as(self.bridge.as_ref(), Script::ListEvents, vec![scope]).await?;
        Ok(records.into_iter().map(CalendarEvent::from).collect())
    }
}

/// Builds the host patch, folding `name` into `summary` and `body` into
/// `description`. The host-named field wins when both are given.
fn event_patch(update: UpdateEventInput) -> Patch<EventField> {
    let mut patch = Patch::new();
    patch.set_some(EventField::Summary, update.summary.or(update.name));
    patch.set_some(EventField::Description, update.description.or(update.body));
    patch.set_timestamp(EventField::StartDate, update.start_date);
    patch.set_timestamp(EventField::EndDate, update.end_date);
    patch.set_some(EventField::AlldayEvent, update.allday_event);
    patch.set_some(EventField::Recurrence, update.recurrence);
    patch.set_some(EventField::Status, update.status.map(|s| s.as_str()));
    patch.set_some(EventField::Location, update.location);
    patch.set_some(EventField::Url, update.url);
    patch
}
