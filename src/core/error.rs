//! Error types shared by the model client, role catalog and
//! conversation orchestrator.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing credentials or an unknown model id. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model API rejected the call because a quota was exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Error generating response: {0}")]
    GenerationFailed(String),

    #[error("Role {0} not found")]
    RoleNotFound(String),

    #[error("Speaker {0} is not an active role in this conversation")]
    SpeakerNotFound(String),

    #[error("Role {0} already exists")]
    RoleExists(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading or writing the role catalog file failed
    #[error("Failed to persist role catalog: {0}")]
    CatalogPersistence(String),
}

impl Error {
    /// True for the error class the model client retries with backoff.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Error::QuotaExceeded(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::CatalogPersistence(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::CatalogPersistence(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::GenerationFailed(err.to_string())
    }
}
