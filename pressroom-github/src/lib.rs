//! Remote repository client for a GitHub-hosted Markdown collection.
//!
//! - [`client`] — [`RepoClient`]: branch fallback, tree listing, contents I/O
//! - [`retry`] — retry-with-backoff policy around every request
//! - [`listing`] — Markdown filtering, stats and folder grouping
//! - [`transport`] — the [`HttpTransport`] seam and its `ureq` implementation
//! - [`models`] — typed response shapes
//!
//! Enable the `mock` feature for [`mock::MockTransport`].

pub mod client;
pub mod error;
pub mod listing;
pub mod models;
pub mod retry;
pub mod transport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{RepoClient, FALLBACK_BRANCHES};
pub use error::RemoteError;
pub use listing::{FileListing, ListingStats, MarkdownFile, MARKDOWN_EXTENSIONS};
pub use models::{BranchCommit, CommitInfo, EntryKind, RemoteContent, RemoteFile, WriteOutcome};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError, UreqTransport};
