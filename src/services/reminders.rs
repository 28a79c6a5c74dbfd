use serde_json::Value;

use crate::bridge::{invoke_as, Patch, ReminderField, ReminderRecord, Script, SharedBridge};
use crate::error::{Error, Result};
use crate::models::filter::apply;
use crate::models::{Reminder, ReminderFilter, UpdateReminderInput};

/// Reminders across every list of the Reminders application.
pub struct RemindersService {
    bridge: SharedBridge,
}

impl RemindersService {
    pub fn new(bridge: SharedBridge) -> Self {
        Self { bridge }
    }

    /// Creates a reminder in the host's default list.
    ///
    /// The new reminder starts incomplete, unflagged and without priority.
    pub async fn create_reminder(&self, name: &str, body: &str) -> Result<Reminder> {
        let record: ReminderRecord = invoke_as(
            self.bridge.as_ref(),
            Script::CreateReminder,
            vec![Value::from(name), Value::from(body)],
        )
        .await?;

        tracing::debug!(id = %record.id, "created reminder");
        Ok(record.into())
    }

    /// Lists reminders from every list, in host order.
    pub async fn list_reminders(&self, filter: Option<&ReminderFilter>) -> Result<Vec<Reminder>> {
        let reminders: Vec<Reminder> = self.fetch_all().await?.into_iter().map(Reminder::from).collect();
        let total = reminders.len();
        let reminders = apply(reminders, filter);

        tracing::debug!(total, matched = reminders.len(), "listed reminders");
        Ok(reminders)
    }

    /// Applies a sparse update and returns the reminder as the host now has it.
    ///
    /// Fails with [`Error::NotFound`] before any write when no list holds `id`.
    pub async fn update_reminder(&self, id: &str, update: UpdateReminderInput) -> Result<Reminder> {
        let current = self
            .fetch_all()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::not_found(format!("Reminder with id {}", id)))?;

        let patch = reminder_patch(&update).retain_changes(&current);
        if patch.is_empty() {
            tracing::debug!(id, "reminder already up to date");
            return Ok(current.into());
        }

        tracing::debug!(id, fields = ?patch.fields(), "updating reminder");
        let record: ReminderRecord = invoke_as(
            self.bridge.as_ref(),
            Script::UpdateReminder,
            vec![Value::from(id), patch.to_value()],
        )
        .await?;
        Ok(record.into())
    }

    pub async fn complete_reminder(&self, id: &str) -> Result<Reminder> {
        self.update_reminder(
            id,
            UpdateReminderInput {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn flag_reminder(&self, id: &str, flagged: bool) -> Result<Reminder> {
        self.update_reminder(
            id,
            UpdateReminderInput {
                flagged: Some(flagged),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_priority(&self, id: &str, priority: i64) -> Result<Reminder> {
        self.update_reminder(
            id,
            UpdateReminderInput {
                priority: Some(priority),
                ..Default::default()
            },
        )
        .await
    }

    async fn fetch_all(&self) -> Result<Vec<ReminderRecord>> {
        Ok(invoke_as(self.bridge.as_ref(), Script::ListReminders, vec![]).await?)
    }
}

fn reminder_patch(update: &UpdateReminderInput) -> Patch<ReminderField> {
    let mut patch = Patch::new();
    patch.set_some(ReminderField::Name, update.name.clone());
    patch.set_some(ReminderField::Body, update.body.clone());
    patch.set_some(ReminderField::Completed, update.completed);
    patch.set_some(ReminderField::Priority, update.priority);
    patch.set_some(ReminderField::Flagged, update.flagged);
    patch.set_timestamp(ReminderField::DueDate, update.due_date);
    patch.set_timestamp(ReminderField::RemindMeDate, update.remind_me_date);
    patch
}
