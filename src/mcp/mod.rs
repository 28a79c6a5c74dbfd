//! MCP server exposing Reminders, Notes and Calendar as tools.

pub mod render;
mod types;

use std::sync::Arc;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;

use crate::error::Error;
use crate::models::*;
use crate::services::ServiceRegistry;

/// What a tool produces: a summary line for the agent and the records behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput<T> {
    pub summary: String,
    pub data: T,
}

impl<T: Serialize> ToolOutput<T> {
    fn new(summary: String, data: T) -> Self {
        Self { summary, data }
    }

    /// Two text items: the summary, then the data as pretty JSON.
    pub fn into_call_result(self) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![
            Content::text(self.summary),
            Content::text(json),
        ]))
    }
}

fn to_mcp_error(tool: &str, err: Error) -> McpError {
    tracing::warn!(tool, error = %err, "tool call failed");
    match err {
        Error::Validation(_) => McpError::invalid_params(err.to_string(), None),
        Error::NotFound(_) => McpError::resource_not_found(err.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn require_id(kind: &str, id: &str) -> crate::Result<()> {
    if id.trim().is_empty() {
        return Err(Error::validation(format!("{} ID is required", kind)));
    }
    Ok(())
}

#[derive(Clone)]
pub struct McpServer {
    registry: Arc<ServiceRegistry>,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            tool_router: Self::tool_router(),
        }
    }

    // ============================================================
    // Tool logic, callable without a transport
    // ============================================================

    pub async fn run_list_reminders(
        &self,
        req: ListRemindersRequest,
    ) -> crate::Result<ToolOutput<Vec<Reminder>>> {
        let filter = ReminderFilter::try_from(req)?;
        let reminders = self.registry.reminders().list_reminders(Some(&filter)).await?;
        Ok(ToolOutput::new(render::reminder_list(&reminders), reminders))
    }

    pub async fn run_create_reminder(
        &self,
        req: CreateReminderRequest,
    ) -> crate::Result<ToolOutput<Reminder>> {
        req.validate()?;
        let reminder = self
            .registry
            .reminders()
            .create_reminder(&req.title, &req.content)
            .await?;
        Ok(ToolOutput::new(render::reminder_created(&reminder), reminder))
    }

    pub async fn run_update_reminder(
        &self,
        req: UpdateReminderRequest,
    ) -> crate::Result<ToolOutput<Reminder>> {
        require_id("Reminder", &req.id)?;
        let id = req.id.clone();
        let update = UpdateReminderInput::try_from(req)?;
        let reminder = self.registry.reminders().update_reminder(&id, update).await?;
        Ok(ToolOutput::new(render::reminder_updated(&reminder), reminder))
    }

    pub async fn run_complete_reminder(
        &self,
        req: CompleteReminderRequest,
    ) -> crate::Result<ToolOutput<Reminder>> {
        require_id("Reminder", &req.id)?;
        let reminder = self.registry.reminders().complete_reminder(&req.id).await?;
        Ok(ToolOutput::new(render::reminder_completed(&reminder), reminder))
    }

    pub async fn run_flag_reminder(&self, req: FlagReminderRequest) -> crate::Result<ToolOutput<Reminder>> {
        require_id("Reminder", &req.id)?;
        let reminder = self
            .registry
            .reminders()
            .flag_reminder(&req.id, req.flagged)
            .await?;
        Ok(ToolOutput::new(render::reminder_flagged(&reminder), reminder))
    }

    pub async fn run_set_reminder_priority(
        &self,
        req: SetReminderPriorityRequest,
    ) -> crate::Result<ToolOutput<Reminder>> {
        require_id("Reminder", &req.id)?;
        let reminder = self
            .registry
            .reminders()
            .set_priority(&req.id, req.priority)
            .await?;
        Ok(ToolOutput::new(render::reminder_priority(&reminder), reminder))
    }

    pub async fn run_list_notes(&self, req: ListNotesRequest) -> crate::Result<ToolOutput<Vec<Note>>> {
        let filter = NoteFilter::try_from(req)?;
        let notes = self.registry.notes().list_notes(Some(&filter)).await?;
        Ok(ToolOutput::new(render::note_list(&notes), notes))
    }

    pub async fn run_create_note(&self, req: CreateNoteRequest) -> crate::Result<ToolOutput<Note>> {
        req.validate()?;
        let note = self
            .registry
            .notes()
            .create_note(&req.title, &req.content, req.container_name.as_deref())
            .await?;
        Ok(ToolOutput::new(render::note_created(&note), note))
    }

    pub async fn run_update_note(&self, req: UpdateNoteRequest) -> crate::Result<ToolOutput<Note>> {
        require_id("Note", &req.id)?;
        let id = req.id.clone();
        let note = self.registry.notes().update_note(&id, req.into()).await?;
        Ok(ToolOutput::new(render::note_updated(&note), note))
    }

    pub async fn run_list_note_folders(&self) -> crate::Result<ToolOutput<Vec<Folder>>> {
        let folders = self.registry.notes().list_folders().await?;
        Ok(ToolOutput::new(render::folder_list(&folders), folders))
    }

    pub async fn run_list_events(
        &self,
        req: ListEventsRequest,
    ) -> crate::Result<ToolOutput<Vec<CalendarEvent>>> {
        let filter = EventFilter::try_from(req)?;
        let events = self.registry.calendar().list_events(Some(&filter)).await?;
        Ok(ToolOutput::new(render::event_list(&events), events))
    }

    pub async fn run_create_event(
        &self,
        req: CreateEventRequest,
    ) -> crate::Result<ToolOutput<CalendarEvent>> {
        let new = NewEvent::try_from(req)?;
        let event = self
            .registry
            .calendar()
            .create_event(
                &new.calendar_name,
                &new.summary,
                new.start,
                new.end,
                new.allday,
                new.options,
            )
            .await?;
        Ok(ToolOutput::new(render::event_created(&event), event))
    }

    pub async fn run_update_event(
        &self,
        req: UpdateEventRequest,
    ) -> crate::Result<ToolOutput<CalendarEvent>> {
        require_id("Event", &req.id)?;
        let id = req.id.clone();
        let update = UpdateEventInput::try_from(req)?;
        let event = self.registry.calendar().update_event(&id, update).await?;
        Ok(ToolOutput::new(render::event_updated(&event), event))
    }

    pub async fn run_find_conflicts(
        &self,
        req: FindConflictsRequest,
    ) -> crate::Result<ToolOutput<Vec<CalendarEvent>>> {
        let (start, end) = req.window()?;
        let events = self
            .registry
            .calendar()
            .find_conflicts(start, end, &req.calendar_names)
            .await?;
        Ok(ToolOutput::new(render::conflict_list(&events), events))
    }

    pub async fn run_list_calendars(&self) -> crate::Result<ToolOutput<Vec<Calendar>>> {
        let calendars = self.registry.calendar().list_calendars().await?;
        Ok(ToolOutput::new(render::calendar_list(&calendars), calendars))
    }
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Reminders
    // ============================================================

    #[tool(
        description = "List reminders from every list. All filters are optional and combine with AND; name/body match case-insensitive substrings, date bounds are inclusive ISO-8601 strings."
    )]
    async fn list_reminders(
        &self,
        params: Parameters<ListRemindersRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_list_reminders(params.0)
            .await
            .map_err(|e| to_mcp_error("list_reminders", e))?
            .into_call_result()
    }

    #[tool(
        description = "Create a new reminder in the default list. The reminder starts incomplete, unflagged and without priority. Returns the created reminder with its ID."
    )]
    async fn create_reminder(
        &self,
        params: Parameters<CreateReminderRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_create_reminder(params.0)
            .await
            .map_err(|e| to_mcp_error("create_reminder", e))?
            .into_call_result()
    }

    #[tool(
        description = "Update an existing reminder. Only the fields you pass are changed; everything else is left untouched."
    )]
    async fn update_reminder(
        &self,
        params: Parameters<UpdateReminderRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_update_reminder(params.0)
            .await
            .map_err(|e| to_mcp_error("update_reminder", e))?
            .into_call_result()
    }

    #[tool(description = "Mark a reminder as completed. The host records the completion date.")]
    async fn complete_reminder(
        &self,
        params: Parameters<CompleteReminderRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_complete_reminder(params.0)
            .await
            .map_err(|e| to_mcp_error("complete_reminder", e))?
            .into_call_result()
    }

    #[tool(description = "Set the flag status of a reminder")]
    async fn flag_reminder(
        &self,
        params: Parameters<FlagReminderRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_flag_reminder(params.0)
            .await
            .map_err(|e| to_mcp_error("flag_reminder", e))?
            .into_call_result()
    }

    #[tool(description = "Set the priority of a reminder (0 none, 1 high, 5 medium, 9 low)")]
    async fn set_reminder_priority(
        &self,
        params: Parameters<SetReminderPriorityRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_set_reminder_priority(params.0)
            .await
            .map_err(|e| to_mcp_error("set_reminder_priority", e))?
            .into_call_result()
    }

    // ============================================================
    // Notes
    // ============================================================

    #[tool(
        description = "Search and list notes. containerId and containerName restrict the folders searched; when both are given a folder must match both. An unknown folder yields an empty list."
    )]
    async fn list_notes(
        &self,
        params: Parameters<ListNotesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_list_notes(params.0)
            .await
            .map_err(|e| to_mcp_error("list_notes", e))?
            .into_call_result()
    }

    #[tool(
        description = "Create a new note. Pass containerName to choose the folder (it must exist); otherwise the note goes to the default folder."
    )]
    async fn create_note(
        &self,
        params: Parameters<CreateNoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_create_note(params.0)
            .await
            .map_err(|e| to_mcp_error("create_note", e))?
            .into_call_result()
    }

    #[tool(description = "Update the title or content of an existing note")]
    async fn update_note(
        &self,
        params: Parameters<UpdateNoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_update_note(params.0)
            .await
            .map_err(|e| to_mcp_error("update_note", e))?
            .into_call_result()
    }

    #[tool(description = "List all note folders")]
    async fn list_note_folders(&self) -> Result<CallToolResult, McpError> {
        self.run_list_note_folders()
            .await
            .map_err(|e| to_mcp_error("list_note_folders", e))?
            .into_call_result()
    }

    // ============================================================
    // Calendar
    // ============================================================

    #[tool(
        description = "Search and list calendar events. calendarId and calendarName restrict the calendars searched; status is one of cancelled, confirmed, none, tentative."
    )]
    async fn list_events(
        &self,
        params: Parameters<ListEventsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_list_events(params.0)
            .await
            .map_err(|e| to_mcp_error("list_events", e))?
            .into_call_result()
    }

    #[tool(
        description = "Create a new calendar event in the named calendar. The calendar must exist and be writable."
    )]
    async fn create_event(
        &self,
        params: Parameters<CreateEventRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_create_event(params.0)
            .await
            .map_err(|e| to_mcp_error("create_event", e))?
            .into_call_result()
    }

    #[tool(
        description = "Update an existing calendar event. Only the fields you pass are changed."
    )]
    async fn update_event(
        &self,
        params: Parameters<UpdateEventRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_update_event(params.0)
            .await
            .map_err(|e| to_mcp_error("update_event", e))?
            .into_call_result()
    }

    #[tool(
        description = "Find events that overlap a time window. Cancelled events are ignored, and events that merely touch the window's start or end do not count. calendarNames limits the search to those calendars."
    )]
    async fn find_conflicts(
        &self,
        params: Parameters<FindConflictsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_find_conflicts(params.0)
            .await
            .map_err(|e| to_mcp_error("find_conflicts", e))?
            .into_call_result()
    }

    #[tool(description = "List all calendars and whether new events can be added to them")]
    async fn list_calendars(&self) -> Result<CallToolResult, McpError> {
        self.run_list_calendars()
            .await
            .map_err(|e| to_mcp_error("list_calendars", e))?
            .into_call_result()
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "productive-suite".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Tools for the macOS Reminders, Notes and Calendar applications.

Every tool returns a one-line summary followed by the affected records as JSON.
Use the IDs from list_* results when updating.

DATES:
- ISO-8601 strings. "2024-03-01T09:00:00Z" and "2024-03-01T10:00:00+01:00" are exact.
- "2024-03-01T09:00:00" (no offset) is read in the server's local time.
- "2024-03-01" is midnight UTC.

UPDATES are sparse: omitted fields keep their current value.

CALENDAR:
- Events can only be created in writable calendars (see list_calendars).
- find_conflicts ignores cancelled events; back-to-back events do not conflict."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(registry: Arc<ServiceRegistry>) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!(bridge = registry.bridge().id(), "Starting MCP server via stdio");

    let service = McpServer::new(registry);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
