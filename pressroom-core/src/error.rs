//! Error types for pressroom-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::DraftId;

/// All errors that can arise from draft store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (save path).
    #[error("draft JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store file exists but is not a JSON list of drafts.
    #[error("failed to parse draft store at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.pressroom/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("draft not found: {id}")]
    DraftNotFound { id: DraftId },
}

/// All errors that can arise while resolving [`crate::config::Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required settings were absent from every source.
    #[error("missing required settings: {}", keys.join(", "))]
    Missing { keys: Vec<&'static str> },

    /// A setting was present but unusable.
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error in the config file, with path and line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
