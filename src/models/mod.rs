//! Domain models for the productive suite.
//!
//! # Core Concepts
//!
//! Every entity lives inside a host application (Reminders, Notes or Calendar)
//! which is the system of record. Nothing here is persisted locally; each
//! operation re-reads the host's object graph.
//!
//! - [`Reminder`]: a to-do item inside a reminder list.
//! - [`Note`]: a note inside exactly one [`Folder`].
//! - [`CalendarEvent`]: an event inside exactly one [`Calendar`].
//!
//! All three share the [`BaseObject`] shape (`id`, `name`, `body`) and are
//! filtered through [`BaseFilter`] plus an entity-specific extension.

mod event;
pub mod filter;
mod note;
mod reminder;
mod shared;
mod time;

pub use event::*;
pub use filter::Matches;
pub use note::*;
pub use reminder::*;
pub use shared::*;
pub use time::*;
