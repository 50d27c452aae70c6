//! Publish pipeline: draft → Markdown document → repository commit.
//!
//! - [`publisher`] — [`publish_one`]: filename, metadata, existence check, write
//! - [`batch`] — [`publish_batch`] and [`read_many`] with per-item isolation
//! - [`pool`] — semaphore-bounded fan-out used by both batch operations
//! - [`api`] — [`Service`], returning JSON-ready [`ApiResponse`]s
//! - [`error`] — [`PublishError`] and its [`ErrorClass`]

pub mod api;
pub mod batch;
pub mod error;
pub mod pool;
pub mod publisher;

pub use api::{ApiError, ApiResponse, FilesBody, ListQuery, PublishRequest, ReadBody, Service};
pub use batch::{publish_batch, read_many, BatchPublishResult, ReadItem, ReadManyResult, ReadOutcome};
pub use error::{ErrorClass, PublishError};
pub use publisher::{
    publish_one, DraftInput, PublishOptions, PublishOutcome, PublishResult, Published, WriteMode,
};
