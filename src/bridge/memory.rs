//! In-process stand-in for the three host applications.
//!
//! `MemoryBridge` answers the same scripts as [`super::OsascriptBridge`] from
//! in-memory state, including the host-owned behaviors: ids are minted here,
//! completing a reminder stamps its completion date, every write bumps the
//! modification date, and read-only calendars refuse new events. It also
//! records each script it runs so callers can count round-trips.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::capability::Patch;
use super::records::*;
use super::{Bridge, BridgeError, HostApp, Script};
use crate::models::{ContainerRef, EventStatus, Timestamp};

#[derive(Debug)]
struct ReminderList {
    container: ContainerRef,
    reminders: Vec<ReminderRecord>,
}

#[derive(Debug)]
struct NoteFolder {
    container: ContainerRef,
    notes: Vec<NoteRecord>,
}

#[derive(Debug)]
struct CalendarBucket {
    calendar: CalendarRecord,
    events: Vec<EventRecord>,
}

#[derive(Debug, Default)]
struct HostState {
    lists: Vec<ReminderList>,
    default_list: Option<String>,
    folders: Vec<NoteFolder>,
    default_folder: Option<String>,
    calendars: Vec<CalendarBucket>,
    denied: HashSet<HostApp>,
    calls: Vec<Script>,
}

#[derive(Debug, Default)]
pub struct MemoryBridge {
    state: Mutex<HostState>,
}

fn mint_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small populated host for running the server without macOS.
    pub fn with_sample_data() -> Self {
        let bridge = Self::new();
        let now = Utc::now();

        let inbox = bridge.add_reminder_list("Reminders");
        bridge.add_reminder(&inbox, "Renew passport", |r| {
            r.priority = 1;
            r.flagged = true;
            r.due_date = Some(now + Duration::days(14));
        });
        bridge.add_reminder(&inbox, "Call the plumber", |r| {
            r.body = Some("Kitchen sink is leaking".to_string());
        });

        let notes = bridge.add_folder("Notes");
        let work = bridge.add_folder("Work");
        bridge.add_note(&notes, "Groceries", "Eggs, coffee, rice");
        bridge.add_note(&work, "Release checklist", "Tag, build, publish");

        let personal = bridge.add_calendar("Home", true);
        let office = bridge.add_calendar("Work", true);
        bridge.add_calendar("Holidays", false);
        bridge.add_event(
            &office,
            "Team standup",
            now + Duration::hours(1),
            now + Duration::hours(1) + Duration::minutes(15),
            |e| e.status = Some(EventStatus::Confirmed),
        );
        bridge.add_event(
            &personal,
            "Dentist",
            now + Duration::days(2),
            now + Duration::days(2) + Duration::hours(1),
            |e| e.location = Some("Main Street 12".to_string()),
        );

        bridge
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().expect("host state lock poisoned")
    }

    // ============================================================
    // Seeding
    // ============================================================

    /// Adds a reminder list. The first list added becomes the default.
    pub fn add_reminder_list(&self, name: &str) -> String {
        let mut state = self.lock();
        let id = mint_id("list");
        state.lists.push(ReminderList {
            container: ContainerRef::new(id.clone(), name),
            reminders: Vec::new(),
        });
        state.default_list.get_or_insert_with(|| id.clone());
        id
    }

    pub fn set_default_reminder_list(&self, list_id: Option<&str>) {
        self.lock().default_list = list_id.map(str::to_string);
    }

    /// # Panics
    ///
    /// Panics if `list_id` was not returned by [`Self::add_reminder_list`].
    pub fn add_reminder(
        &self,
        list_id: &str,
        name: &str,
        customize: impl FnOnce(&mut ReminderRecord),
    ) -> String {
        let mut record = new_reminder(name, "");
        customize(&mut record);
        let id = record.id.clone();
        let mut state = self.lock();
        let list = state
            .lists
            .iter_mut()
            .find(|l| l.container.id == list_id)
            .expect("unknown reminder list");
        list.reminders.push(record);
        id
    }

    /// Adds a notes folder. The first folder added becomes the default.
    pub fn add_folder(&self, name: &str) -> String {
        let mut state = self.lock();
        let id = mint_id("folder");
        state.folders.push(NoteFolder {
            container: ContainerRef::new(id.clone(), name),
            notes: Vec::new(),
        });
        state.default_folder.get_or_insert_with(|| id.clone());
        id
    }

    pub fn add_note(&self, folder_id: &str, name: &str, body: &str) -> String {
        self.add_note_with(folder_id, name, body, |_| {})
    }

    /// # Panics
    ///
    /// Panics if `folder_id` was not returned by [`Self::add_folder`].
    pub fn add_note_with(
        &self,
        folder_id: &str,
        name: &str,
        body: &str,
        customize: impl FnOnce(&mut NoteRecord),
    ) -> String {
        let mut state = self.lock();
        let folder = state
            .folders
            .iter_mut()
            .find(|f| f.container.id == folder_id)
            .expect("unknown notes folder");
        let mut record = new_note(name, body, folder.container.clone());
        customize(&mut record);
        let id = record.id.clone();
        folder.notes.push(record);
        id
    }

    pub fn add_calendar(&self, name: &str, writable: bool) -> String {
        let mut state = self.lock();
        let id = mint_id("calendar");
        state.calendars.push(CalendarBucket {
            calendar: CalendarRecord {
                id: id.clone(),
                name: name.to_string(),
                description: None,
                writable,
            },
            events: Vec::new(),
        });
        id
    }

    /// # Panics
    ///
    /// Panics if `calendar_id` was not returned by [`Self::add_calendar`].
    pub fn add_event(
        &self,
        calendar_id: &str,
        summary: &str,
        start: Timestamp,
        end: Timestamp,
        customize: impl FnOnce(&mut EventRecord),
    ) -> String {
        let mut state = self.lock();
        let bucket = state
            .calendars
            .iter_mut()
            .find(|c| c.calendar.id == calendar_id)
            .expect("unknown calendar");
        let mut record = new_event(
            &bucket.calendar,
            NewEventProperties {
                summary: summary.to_string(),
                start_date: start,
                end_date: end,
                allday_event: false,
                description: None,
                location: None,
                url: None,
                recurrence: None,
            },
        );
        customize(&mut record);
        let id = record.id.clone();
        bucket.events.push(record);
        id
    }

    /// Makes every script for `app` fail as if automation access was refused.
    pub fn deny(&self, app: HostApp) {
        self.lock().denied.insert(app);
    }

    // ============================================================
    // Inspection
    // ============================================================

    /// Scripts run so far, in order.
    pub fn calls(&self) -> Vec<Script> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn reminder(&self, id: &str) -> Option<ReminderRecord> {
        self.lock()
            .lists
            .iter()
            .flat_map(|l| l.reminders.iter())
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn note(&self, id: &str) -> Option<NoteRecord> {
        self.lock()
            .folders
            .iter()
            .flat_map(|f| f.notes.iter())
            .find(|n| n.id == id)
            .cloned()
    }

    pub fn event(&self, id: &str) -> Option<EventRecord> {
        self.lock()
            .calendars
            .iter()
            .flat_map(|c| c.events.iter())
            .find(|e| e.id == id)
            .cloned()
    }
}

#[async_trait]
impl Bridge for MemoryBridge {
    fn id(&self) -> &str {
        "memory"
    }

    async fn invoke(&self, script: Script, args: Vec<Value>) -> Result<Value, BridgeError> {
        let mut state = self.lock();
        state.calls.push(script);

        if state.denied.contains(&script.app()) {
            return Err(BridgeError::PermissionDenied(format!(
                "Automation access to {} was denied",
                script.app()
            )));
        }

        let args = Args(args);
        match script {
            Script::ListReminders => to_json(&state.all_reminders()),
            Script::CreateReminder => {
                let record = state.create_reminder(&args.string(0)?, &args.string(1)?)?;
                to_json(&record)
            }
            Script::UpdateReminder => {
                let patch = Patch::from_value(args.value(1))?;
                to_json(&state.update_reminder(&args.string(0)?, &patch)?)
            }
            Script::ListFolders => {
                let folders: Vec<&ContainerRef> =
                    state.folders.iter().map(|f| &f.container).collect();
                to_json(&folders)
            }
            Script::ListNotes => to_json(&state.notes_in(args.string_list(0).as_deref())),
            Script::CreateNote => {
                let record = state.create_note(
                    &args.string(0)?,
                    &args.string(1)?,
                    args.optional_string(2).as_deref(),
                )?;
                to_json(&record)
            }
            Script::UpdateNote => {
                let patch = Patch::from_value(args.value(1))?;
                to_json(&state.update_note(&args.string(0)?, &patch)?)
            }
            Script::ListCalendars => {
                let calendars: Vec<&CalendarRecord> =
                    state.calendars.iter().map(|c| &c.calendar).collect();
                to_json(&calendars)
            }
            Script::ListEvents => to_json(&state.events_in(args.string_list(0).as_deref())),
            Script::CreateEvent => {
                let props: NewEventProperties = serde_json::from_value(args.value(1).clone())?;
                to_json(&state.create_event(&args.string(0)?, props)?)
            }
            Script::UpdateEvent => {
                let patch = Patch::from_value(args.value(2))?;
                to_json(&state.update_event(&args.string(0)?, &args.string(1)?, &patch)?)
            }
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, BridgeError> {
    Ok(serde_json::to_value(value)?)
}

/// Positional script arguments.
struct Args(Vec<Value>);

impl Args {
    fn value(&self, index: usize) -> &Value {
        self.0.get(index).unwrap_or(&Value::Null)
    }

    fn string(&self, index: usize) -> Result<String, BridgeError> {
        self.optional_string(index)
            .ok_or_else(|| BridgeError::Script(format!("Argument {} must be a string", index)))
    }

    fn optional_string(&self, index: usize) -> Option<String> {
        self.value(index).as_str().map(str::to_string)
    }

    fn string_list(&self, index: usize) -> Option<Vec<String>> {
        self.value(index).as_array().map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
    }
}

fn new_reminder(name: &str, body: &str) -> ReminderRecord {
    let now = Utc::now();
    ReminderRecord {
        id: mint_id("x-apple-reminder"),
        name: name.to_string(),
        body: Some(body.to_string()),
        completed: false,
        completion_date: None,
        due_date: None,
        allday_due_date: None,
        remind_me_date: None,
        priority: 0,
        flagged: false,
        creation_date: Some(now),
        modification_date: Some(now),
    }
}

fn new_note(name: &str, body: &str, container: ContainerRef) -> NoteRecord {
    let now = Utc::now();
    NoteRecord {
        id: mint_id("x-coredata-note"),
        name: name.to_string(),
        body: Some(body.to_string()),
        plaintext: Some(body.to_string()),
        creation_date: now,
        modification_date: now,
        container,
    }
}

fn new_event(calendar: &CalendarRecord, props: NewEventProperties) -> EventRecord {
    let uid = Uuid::new_v4().to_string().to_uppercase();
    EventRecord {
        id: uid.clone(),
        uid,
        summary: Some(props.summary),
        description: props.description,
        start_date: props.start_date,
        end_date: props.end_date,
        allday_event: props.allday_event,
        recurrence: props.recurrence,
        sequence: 0,
        stamp_date: Some(Utc::now()),
        excluded_dates: Vec::new(),
        status: Some(EventStatus::None),
        location: props.location,
        url: props.url,
        calendar: ContainerRef::new(calendar.id.clone(), calendar.name.clone()),
    }
}

impl HostState {
    fn all_reminders(&self) -> Vec<&ReminderRecord> {
        self.lists.iter().flat_map(|l| l.reminders.iter()).collect()
    }

    fn create_reminder(&mut self, name: &str, body: &str) -> Result<ReminderRecord, BridgeError> {
        let list = match self.default_list.as_deref() {
            Some(id) => self.lists.iter_mut().find(|l| l.container.id == id),
            None => None,
        }
        .ok_or_else(|| {
            BridgeError::Script("Reminders: No default reminder list found".to_string())
        })?;
        let record = new_reminder(name, body);
        list.reminders.push(record.clone());
        Ok(record)
    }

    fn update_reminder(
        &mut self,
        id: &str,
        patch: &Patch<ReminderField>,
    ) -> Result<ReminderRecord, BridgeError> {
        let record = self
            .lists
            .iter_mut()
            .flat_map(|l| l.reminders.iter_mut())
            .find(|r| r.id == id)
            .ok_or_else(|| BridgeError::NotFound(format!("Reminder {}", id)))?;

        let was_completed = record.completed;
        patch.apply_to(record)?;

        let now = Utc::now();
        match (was_completed, record.completed) {
            (false, true) => record.completion_date = Some(now),
            (true, false) => record.completion_date = None,
            _ => {}
        }
        record.modification_date = Some(now);
        Ok(record.clone())
    }

    fn notes_in(&self, folder_ids: Option<&[String]>) -> Vec<&NoteRecord> {
        self.folders
            .iter()
            .filter(|f| folder_ids.map_or(true, |ids| ids.contains(&f.container.id)))
            .flat_map(|f| f.notes.iter())
            .collect()
    }

    fn create_note(
        &mut self,
        name: &str,
        body: &str,
        folder_id: Option<&str>,
    ) -> Result<NoteRecord, BridgeError> {
        let target = match folder_id {
            Some(id) => id.to_string(),
            None => self
                .default_folder
                .clone()
                .ok_or_else(|| BridgeError::Script("Notes: No default folder".to_string()))?,
        };
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.container.id == target)
            .ok_or_else(|| BridgeError::NotFound(format!("Folder {}", target)))?;
        let record = new_note(name, body, folder.container.clone());
        folder.notes.push(record.clone());
        Ok(record)
    }

    fn update_note(&mut self, id: &str, patch: &Patch<NoteField>) -> Result<NoteRecord, BridgeError> {
        let record = self
            .folders
            .iter_mut()
            .flat_map(|f| f.notes.iter_mut())
            .find(|n| n.id == id)
            .ok_or_else(|| BridgeError::NotFound(format!("Note {}", id)))?;
        patch.apply_to(record)?;
        record.modification_date = Utc::now();
        Ok(record.clone())
    }

    fn events_in(&self, calendar_ids: Option<&[String]>) -> Vec<&EventRecord> {
        self.calendars
            .iter()
            .filter(|c| calendar_ids.map_or(true, |ids| ids.contains(&c.calendar.id)))
            .flat_map(|c| c.events.iter())
            .collect()
    }

    fn calendar_mut(&mut self, calendar_id: &str) -> Result<&mut CalendarBucket, BridgeError> {
        self.calendars
            .iter_mut()
            .find(|c| c.calendar.id == calendar_id)
            .ok_or_else(|| BridgeError::NotFound(format!("Calendar {}", calendar_id)))
    }

    fn create_event(
        &mut self,
        calendar_id: &str,
        props: NewEventProperties,
    ) -> Result<EventRecord, BridgeError> {
        let bucket = self.calendar_mut(calendar_id)?;
        if !bucket.calendar.writable {
            return Err(BridgeError::Script(format!(
                "Calendar: Calendar {} is read-only",
                bucket.calendar.name
            )));
        }
        let record = new_event(&bucket.calendar, props);
        bucket.events.push(record.clone());
        Ok(record)
    }

    fn update_event(
        &mut self,
        calendar_id: &str,
        id: &str,
        patch: &Patch<EventField>,
    ) -> Result<EventRecord, BridgeError> {
        let bucket = self.calendar_mut(calendar_id)?;
        let record = bucket
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| BridgeError::NotFound(format!("Event {}", id)))?;
        patch.apply_to(record)?;
        record.sequence += 1;
        record.stamp_date = Some(Utc::now());
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completing_a_reminder_stamps_the_completion_date() {
        let bridge = MemoryBridge::new();
        let list = bridge.add_reminder_list("Inbox");
        let id = bridge.add_reminder(&list, "Pay rent", |_| {});

        let value = tokio_test::block_on(
            bridge.invoke(Script::UpdateReminder, vec![json!(id), json!({ "completed": true })]),
        )
        .unwrap();

        assert_eq!(value["completed"], true);
        assert!(value["completionDate"].is_string());
        assert_eq!(bridge.calls(), vec![Script::UpdateReminder]);
    }

    #[test]
    fn denied_apps_fail_every_script() {
        let bridge = MemoryBridge::with_sample_data();
        bridge.deny(HostApp::Notes);

        let err = tokio_test::block_on(bridge.invoke(Script::ListFolders, vec![])).unwrap_err();

        assert!(matches!(err, BridgeError::PermissionDenied(_)));
        assert!(tokio_test::block_on(bridge.invoke(Script::ListCalendars, vec![])).is_ok());
    }

    #[test]
    #[should_panic(expected = "unknown reminder list")]
    fn seeding_into_an_unknown_list_panics() {
        MemoryBridge::new().add_reminder("missing", "Orphan", |_| {});
    }

    #[test]
    #[should_panic(expected = "unknown notes folder")]
    fn seeding_into_an_unknown_folder_panics() {
        MemoryBridge::new().add_note("missing", "Orphan", "");
    }

    #[test]
    #[should_panic(expected = "unknown calendar")]
    fn seeding_into_an_unknown_calendar_panics() {
        let now = Utc::now();
        MemoryBridge::new().add_event("missing", "Orphan", now, now, |_| {});
    }
}
