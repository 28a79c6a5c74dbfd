//! Entity services and the registry that hands them out.
//!
//! Services hold no entity state: every call re-reads the host through the
//! shared [`Bridge`](crate::bridge::Bridge). A list or locate step is a single
//! bulk round-trip; filtering and patch diffing happen here; a write sends
//! only the fields that change.

mod calendar;
mod notes;
mod registry;
mod reminders;

pub use calendar::CalendarService;
pub use notes::NotesService;
pub use registry::ServiceRegistry;
pub use reminders::RemindersService;

use crate::bridge::Container;

/// Ids of the containers accepted by `accept(id, name)`.
fn narrowed_ids<C: Container>(containers: &[C], accept: impl Fn(&str, &str) -> bool) -> Vec<String> {
    containers
        .iter()
        .filter(|c| accept(c.id(), c.name()))
        .map(|c| c.id().to_string())
        .collect()
}
