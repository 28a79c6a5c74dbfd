//! Reminders, Notes and Calendar for AI agents.
//!
//! The crate is layered leaf to root:
//!
//! - [`models`]: domain records, filters and sparse updates.
//! - [`bridge`]: the remote object adapter that runs scripts inside the host
//!   applications (or an in-memory stand-in).
//! - [`services`]: per-entity services plus the [`services::ServiceRegistry`].
//! - [`mcp`] and [`api`]: dispatch surfaces over the registry.

pub mod api;
pub mod bridge;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod services;

pub use error::{Error, Result};
