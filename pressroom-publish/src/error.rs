//! Error types for pressroom-publish.

use pressroom_core::ConfigError;
use pressroom_github::RemoteError;
use serde::Serialize;
use thiserror::Error;

/// All errors that can arise from publishing or reading through the service.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Bad input: missing draft fields, empty or oversized batch.
    #[error("{0}")]
    Validation(String),

    /// Required settings are absent or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A worker task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),
}

impl From<ConfigError> for PublishError {
    fn from(err: ConfigError) -> Self {
        PublishError::Config(err.to_string())
    }
}

/// Coarse failure classification reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Validation,
    Upstream,
    Configuration,
}

impl ErrorClass {
    pub fn status(self) -> u16 {
        match self {
            ErrorClass::Validation => 400,
            ErrorClass::Upstream => 502,
            ErrorClass::Configuration => 500,
        }
    }
}

impl PublishError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PublishError::Validation(_) => ErrorClass::Validation,
            PublishError::Config(_) => ErrorClass::Configuration,
            PublishError::Remote(_) | PublishError::Task(_) => ErrorClass::Upstream,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        PublishError::Validation(message.into())
    }
}
