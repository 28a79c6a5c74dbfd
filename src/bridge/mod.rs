//! Remote object adapter.
//!
//! Everything the services know about the host applications goes through
//! [`Bridge::invoke`]: a named [`Script`] runs inside the host with JSON
//! arguments and returns a JSON value. Two implementations exist:
//!
//! - [`OsascriptBridge`] runs JXA through `osascript` against the real apps.
//! - [`MemoryBridge`] simulates the three apps in process.
//!
//! Each list-style script returns every field of every candidate in one
//! round-trip; writes carry only the fields that change.

mod capability;
mod memory;
mod osascript;
mod records;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use capability::*;
pub use memory::*;
pub use osascript::*;
pub use records::*;

/// Bridge failures, classified by what the host reported.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Script(String),

    #[error("Failed to launch automation bridge: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Unexpected host response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The application a script runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostApp {
    Reminders,
    Notes,
    Calendar,
}

impl HostApp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reminders => "Reminders",
            Self::Notes => "Notes",
            Self::Calendar => "Calendar",
        }
    }
}

impl fmt::Display for HostApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The snippets the bridge knows how to run.
///
/// | Script            | Arguments                      | Result               |
/// |-------------------|--------------------------------|----------------------|
/// | `ListReminders`   | –                              | `[ReminderRecord]`   |
/// | `CreateReminder`  | name, body                     | `ReminderRecord`     |
/// | `UpdateReminder`  | id, patch                      | `ReminderRecord`     |
/// | `ListFolders`     | –                              | `[Folder]`           |
/// | `ListNotes`       | folder ids or null             | `[NoteRecord]`       |
/// | `CreateNote`      | name, body, folder id or null  | `NoteRecord`         |
/// | `UpdateNote`      | id, patch                      | `NoteRecord`         |
/// | `ListCalendars`   | –                              | `[CalendarRecord]`   |
/// | `ListEvents`      | calendar ids or null           | `[EventRecord]`      |
/// | `CreateEvent`     | calendar id, properties        | `EventRecord`        |
/// | `UpdateEvent`     | calendar id, id, patch         | `EventRecord`        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    ListReminders,
    CreateReminder,
    UpdateReminder,
    ListFolders,
    ListNotes,
    CreateNote,
    UpdateNote,
    ListCalendars,
    ListEvents,
    CreateEvent,
    UpdateEvent,
}

impl Script {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListReminders => "list_reminders",
            Self::CreateReminder => "create_reminder",
            Self::UpdateReminder => "update_reminder",
            Self::ListFolders => "list_folders",
            Self::ListNotes => "list_notes",
            Self::CreateNote => "create_note",
            Self::UpdateNote => "update_note",
            Self::ListCalendars => "list_calendars",
            Self::ListEvents => "list_events",
            Self::CreateEvent => "create_event",
            Self::UpdateEvent => "update_event",
        }
    }

    pub fn app(&self) -> HostApp {
        match self {
            Self::ListReminders | Self::CreateReminder | Self::UpdateReminder => HostApp::Reminders,
            Self::ListFolders | Self::ListNotes | Self::CreateNote | Self::UpdateNote => {
                HostApp::Notes
            }
            Self::ListCalendars | Self::ListEvents | Self::CreateEvent | Self::UpdateEvent => {
                HostApp::Calendar
            }
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Executes scripts inside the host applications.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Backend identifier used in logs.
    fn id(&self) -> &str;

    async fn invoke(&self, script: Script, args: Vec<Value>) -> Result<Value, BridgeError>;
}

pub type SharedBridge = Arc<dyn Bridge>;

/// Invokes `script` and decodes the result.
pub async fn invoke_as<T: DeserializeOwned>(
    bridge: &dyn Bridge,
    script: Script,
    args: Vec<Value>,
) -> Result<T, BridgeError> {
    tracing::trace!(bridge = bridge.id(), %script, "invoking host script");
    let value = bridge.invoke(script, args).await?;
    Ok(serde_json::from_value(value)?)
}
