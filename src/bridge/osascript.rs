//! Runs scripts against the real applications through `osascript`.
//!
//! Each invocation spawns `osascript -l JavaScript` with the composed script
//! (shared prelude + the script's `main` + a runner). Arguments travel as
//! JSON strings in `argv` and the result comes back as JSON on stdout.
//! Scripts signal a missing entity by throwing `NOT_FOUND: <what>` and refused
//! access by throwing `PERMISSION: <what>`.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use super::{Bridge, BridgeError, HostApp, Script};

const PRELUDE: &str = include_str!("scripts/prelude.js");
const RUNNER: &str = include_str!("scripts/runner.js");

const NOT_FOUND_MARKER: &str = "NOT_FOUND:";
const PERMISSION_MARKER: &str = "PERMISSION:";

/// errAEEventNotPermitted: the user has not granted automation access.
const PERMISSION_CODE: &str = "(-1743)";

fn script_body(script: Script) -> &'static str {
    match script {
        Script::ListReminders => include_str!("scripts/list_reminders.js"),
        Script::CreateReminder => include_str!("scripts/create_reminder.js"),
        Script::UpdateReminder => include_str!("scripts/update_reminder.js"),
        Script::ListFolders => include_str!("scripts/list_folders.js"),
        Script::ListNotes => include_str!("scripts/list_notes.js"),
        Script::CreateNote => include_str!("scripts/create_note.js"),
        Script::UpdateNote => include_str!("scripts/update_note.js"),
        Script::ListCalendars => include_str!("scripts/list_calendars.js"),
        Script::ListEvents => include_str!("scripts/list_events.js"),
        Script::CreateEvent => include_str!("scripts/create_event.js"),
        Script::UpdateEvent => include_str!("scripts/update_event.js"),
    }
}

/// Full JXA source for a script.
pub fn compose_script(script: Script) -> String {
    format!("{}\n{}\n{}", PRELUDE, script_body(script), RUNNER)
}

#[derive(Debug, Clone)]
pub struct OsascriptBridge {
    program: PathBuf,
}

impl OsascriptBridge {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for OsascriptBridge {
    fn default() -> Self {
        Self::new("osascript")
    }
}

#[async_trait]
impl Bridge for OsascriptBridge {
    fn id(&self) -> &str {
        "osascript"
    }

    async fn invoke(&self, script: Script, args: Vec<Value>) -> Result<Value, BridgeError> {
        let mut command = Command::new(&self.program);
        command
            .arg("-l")
            .arg("JavaScript")
            .arg("-e")
            .arg(compose_script(script));
        for arg in &args {
            command.arg(arg.to_string());
        }

        let output = command.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(%script, stderr = %stderr.trim(), "host script failed");
            return Err(classify_failure(script.app(), &stderr));
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Maps osascript's stderr onto a [`BridgeError`].
///
/// Typical input: `execution error: Error: NOT_FOUND: Reminder x (-2700)`.
pub fn classify_failure(app: HostApp, stderr: &str) -> BridgeError {
    let stderr = stderr.trim();

    if let Some(index) = stderr.find(NOT_FOUND_MARKER) {
        let what = strip_error_code(&stderr[index + NOT_FOUND_MARKER.len()..]);
        return BridgeError::NotFound(what.to_string());
    }

    if stderr.contains(PERMISSION_CODE)
        || stderr.contains(PERMISSION_MARKER)
        || stderr.contains("Not authorized to send Apple events")
    {
        return BridgeError::PermissionDenied(format!(
            "Automation access to {} was denied. Grant it in System Settings > Privacy & Security > Automation",
            app
        ));
    }

    let message = stderr
        .strip_prefix("execution error:")
        .map(str::trim)
        .unwrap_or(stderr);
    let message = message.strip_prefix("Error:").map(str::trim).unwrap_or(message);
    BridgeError::Script(format!("{}: {}", app, strip_error_code(message)))
}

/// Drops a trailing AppleScript error number such as ` (-2700)`.
fn strip_error_code(message: &str) -> &str {
    let message = message.trim();
    match message.rfind(" (-") {
        Some(index) if message.ends_with(')') => message[..index].trim(),
        _ => message,
    }
}

/// Parses the script's stdout. Empty output means the script returned nothing.
pub fn parse_output(stdout: &str) -> Result<Value, BridgeError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(stdout)?)
}
