//! Error types for plotmine

use thiserror::Error;

/// Main error type for the mine engine
#[derive(Debug, Error)]
pub enum Error {
    /// Missing template anchor, unknown tier, invalid settings.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Operation invoked against state that does not exist (or already exists).
    #[error("State violation: {0}")]
    State(String),

    /// An external collaborator (economy, protection) refused or failed.
    #[error("Service error: {0}")]
    Service(String),
}

impl Error {
    /// Read/write failures on templates or persisted records.
    ///
    /// These abort the current operation and are never retried internally.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Serde(_))
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        Error::State(msg.into())
    }
}
