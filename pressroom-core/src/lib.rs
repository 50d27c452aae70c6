//! Pressroom core library — domain types, settings, draft store, errors.
//!
//! - [`types`] — [`Draft`], [`DraftId`], [`Slug`] and [`slugify`]
//! - [`config`] — [`Settings`] resolution from file + environment
//! - [`drafts`] — [`DraftStore`], the local JSON-backed draft collection
//! - [`error`] — [`StoreError`], [`ConfigError`]

pub mod config;
pub mod drafts;
pub mod error;
pub mod types;

pub use config::{RetrySettings, Settings};
pub use drafts::{DraftStore, ImportReport};
pub use error::{ConfigError, StoreError};
pub use types::{slugify, Draft, DraftId, DraftUpdate, Slug};
