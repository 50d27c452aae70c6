//! Domain types for the local draft workspace.
//!
//! `Draft` serializes with camelCase keys so an exported draft list reads the
//! same as the browser-side store it replaces.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque, store-assigned identifier of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(pub String);

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DraftId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DraftId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Filename-safe projection of a title.
///
/// Always lowercase ASCII alphanumerics separated by single hyphens, with no
/// leading or trailing hyphen. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Slugify `title`; `None` when nothing alphanumeric survives.
    pub fn from_title(title: &str) -> Option<Self> {
        let slug = slugify(title);
        if slug.is_empty() {
            None
        } else {
            Some(Self(slug))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lowercase `input`, collapse every run of non `[a-z0-9]` characters into a
/// single `-`, then strip leading and trailing hyphens.
///
/// Idempotent: `slugify(&slugify(x)) == slugify(x)`.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Default title for drafts created without one.
pub const UNTITLED_DRAFT: &str = "Untitled Draft";

/// A locally stored, unpublished post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: DraftId,
    pub title: String,
    /// Raw Markdown body.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
}

/// Partial edit applied by [`crate::drafts::DraftStore::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
