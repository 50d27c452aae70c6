//! Error types for pressroom-github.

use thiserror::Error;

/// All errors that can arise from remote repository calls.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// 4xx response. Never retried.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Non-success, non-4xx response after exhausting retries.
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// Connection-level failure after exhausting retries.
    #[error("network error: {0}")]
    Network(String),

    /// Every branch candidate failed.
    #[error("no accessible branches found; tried: {}", tried.join(", "))]
    NoAccessibleBranch { tried: Vec<String> },

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported content encoding '{encoding}' for {path}")]
    UnsupportedEncoding { path: String, encoding: String },

    #[error("invalid base64 content for {path}: {source}")]
    Base64 {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("content of {path} is not valid UTF-8")]
    Utf8 { path: String },

    #[error("{path} is a directory, not a file")]
    NotAFile { path: String },

    #[error("invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl RemoteError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Api { status, .. } | RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The remote side reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Api { status: 404, .. })
    }

    /// Server-side or network failure (already retried).
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Http { .. } | RemoteError::Network(_))
    }
}
