//! Process configuration, read from the environment.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::bridge::{MemoryBridge, OsascriptBridge, SharedBridge};

/// Which host the services talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The real applications, driven through `osascript`.
    Osascript,
    /// An in-process host seeded with sample data.
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Osascript => "osascript",
            Self::Memory => "memory",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "osascript" => Some(Self::Osascript),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }

    /// `osascript` where it exists, `memory` everywhere else.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::Osascript
        } else {
            Self::Memory
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PSUITE_BACKEND must be `osascript` or `memory`, got `{0}`")]
    InvalidBackend(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub osascript: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::platform_default(),
            osascript: PathBuf::from("osascript"),
        }
    }
}

impl Config {
    /// Reads `PSUITE_BACKEND` and `PSUITE_OSASCRIPT`, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("PSUITE_BACKEND") {
            config.backend =
                Backend::from_str(value.trim()).ok_or(ConfigError::InvalidBackend(value))?;
        }
        if let Some(path) = lookup("PSUITE_OSASCRIPT").filter(|p| !p.is_empty()) {
            config.osascript = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn with_backend(mut self, backend: Option<Backend>) -> Self {
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self
    }

    pub fn build_bridge(&self) -> SharedBridge {
        tracing::info!(backend = self.backend.as_str(), "using host backend");
        match self.backend {
            Backend::Osascript => Arc::new(OsascriptBridge::new(self.osascript.clone())),
            Backend::Memory => Arc::new(MemoryBridge::with_sample_data()),
        }
    }
}
