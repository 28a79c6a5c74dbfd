use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::{CalendarService, NotesService, RemindersService};
use crate::bridge::SharedBridge;

/// Hands out one instance per service type.
///
/// Each accessor creates its service on first use and returns the same
/// instance for the lifetime of the registry. Nothing is ever evicted.
pub struct ServiceRegistry {
    bridge: SharedBridge,
    reminders: OnceCell<Arc<RemindersService>>,
    notes: OnceCell<Arc<NotesService>>,
    calendar: OnceCell<Arc<CalendarService>>,
}

impl ServiceRegistry {
    pub fn new(bridge: SharedBridge) -> Self {
        Self {
            bridge,
            reminders: OnceCell::new(),
            notes: OnceCell::new(),
            calendar: OnceCell::new(),
        }
    }

    pub fn bridge(&self) -> &SharedBridge {
        &self.bridge
    }

    pub fn reminders(&self) -> Arc<RemindersService> {
        self.reminders
            .get_or_init(|| {
                tracing::debug!(bridge = self.bridge.id(), "initializing reminders service");
                Arc::new(RemindersService::new(self.bridge.clone()))
            })
            .clone()
    }

    pub fn notes(&self) -> Arc<NotesService> {
        self.notes
            .get_or_init(|| {
                tracing::debug!(bridge = self.bridge.id(), "initializing notes service");
                Arc::new(NotesService::new(self.bridge.clone()))
            })
            .clone()
    }

    pub fn calendar(&self) -> Arc<CalendarService> {
        self.calendar
            .get_or_init(|| {
                tracing::debug!(bridge = self.bridge.id(), "initializing calendar service");
                Arc::new(CalendarService::new(self.bridge.clone()))
            })
            .clone()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("bridge", &self.bridge.id())
            .finish_non_exhaustive()
    }
}
