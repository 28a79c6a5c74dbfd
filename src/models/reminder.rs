use serde::{Deserialize, Serialize};

use super::filter::{equals, within_range, Matches};
use super::{BaseFilter, BaseObject, Timestamp};

/// A to-do item from the Reminders application.
///
/// `completed_date` is maintained by the host: completing a reminder sets it,
/// this crate never writes it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub name: String,
    pub body: String,
    pub completed: bool,
    pub completed_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub allday_due_date: Option<Timestamp>,
    pub remind_me_date: Option<Timestamp>,
    /// 0 means no priority; otherwise the host's ordinal urgency.
    pub priority: i64,
    pub flagged: bool,
    pub creation_date: Option<Timestamp>,
    pub modification_date: Option<Timestamp>,
}

impl BaseObject for Reminder {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn created(&self) -> Option<Timestamp> {
        self.creation_date
    }

    fn modified(&self) -> Option<Timestamp> {
        self.modification_date
    }
}

/// Filter for listing reminders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    pub completed: Option<bool>,
    pub flagged: Option<bool>,
    pub priority: Option<i64>,
    pub due_after: Option<Timestamp>,
    pub due_before: Option<Timestamp>,
}

impl Matches<Reminder> for ReminderFilter {
    fn matches(&self, reminder: &Reminder) -> bool {
        self.base.matches_base(reminder)
            && equals(&reminder.completed, self.completed.as_ref())
            && equals(&reminder.flagged, self.flagged.as_ref())
            && equals(&reminder.priority, self.priority.as_ref())
            && within_range(reminder.due_date, self.due_after, self.due_before)
    }
}

/// Sparse update for a reminder. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReminderInput {
    pub name: Option<String>,
    pub body: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<i64>,
    pub flagged: Option<bool>,
    pub due_date: Option<Timestamp>,
    pub remind_me_date: Option<Timestamp>,
}

impl UpdateReminderInput {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
