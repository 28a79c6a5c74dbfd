use thiserror::Error;

use crate::bridge::BridgeError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the entity services.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Host application error: {0}")]
    Adapter(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<BridgeError> for Error {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotFound(msg) => Self::NotFound(msg),
            BridgeError::PermissionDenied(msg) => Self::Permission(msg),
            other => Self::Adapter(other.to_string()),
        }
    }
}
