//! Single-draft publish: filename, document, existence check, commit.
//!
//! ```text
//! draft ─▶ validate ─▶ filename ─▶ serialize ─▶ find_file ─┬─ found ─▶ PUT with sha ("Update post")
//!                                                          └─ absent ─▶ PUT without sha ("Add new post")
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use pressroom_codec::{serialize, Frontmatter};
use pressroom_core::{slugify, Draft, DraftId};
use pressroom_github::{CommitInfo, RepoClient};
use serde::{Deserialize, Serialize};

use crate::error::PublishError;

/// Extension appended to filenames that lack one.
pub const EXTENSION: &str = ".md";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The fields of a draft that publishing needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftInput {
    #[serde(default)]
    pub id: Option<DraftId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl From<&Draft> for DraftInput {
    fn from(draft: &Draft) -> Self {
        Self {
            id: Some(draft.id.clone()),
            title: draft.title.clone(),
            content: draft.content.clone(),
            slug: draft.slug.as_ref().map(|s| s.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishOptions {
    /// Target path override; `.md` is appended when missing.
    pub filename: Option<String>,
    /// Caller metadata, merged over the generated fields.
    pub metadata: Frontmatter,
    /// Add a `publishedAt` timestamp.
    pub published_at: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            filename: None,
            metadata: Frontmatter::new(),
            published_at: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Created,
    Updated,
}

/// A successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Published {
    pub draft_id: Option<DraftId>,
    pub filename: String,
    pub mode: WriteMode,
    pub commit: CommitInfo,
    /// Browser URL of the committed file, when it is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Per-item entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub draft_id: Option<DraftId>,
    pub filename: String,
    #[serde(flatten)]
    pub outcome: PublishOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    Committed {
        mode: WriteMode,
        commit: CommitInfo,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl PublishResult {
    pub fn is_committed(&self) -> bool {
        matches!(self.outcome, PublishOutcome::Committed { .. })
    }

    /// Record `err` against `draft`, keeping whatever filename can be derived.
    pub fn failed(draft: &DraftInput, options: &PublishOptions, err: &PublishError) -> Self {
        Self {
            draft_id: draft.id.clone(),
            filename: target_filename(draft, options.filename.as_deref()).unwrap_or_default(),
            outcome: PublishOutcome::Failed {
                error: err.to_string(),
            },
        }
    }
}

impl From<Published> for PublishResult {
    fn from(published: Published) -> Self {
        Self {
            draft_id: published.draft_id,
            filename: published.filename,
            outcome: PublishOutcome::Committed {
                mode: published.mode,
                commit: published.commit,
                url: published.url,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Target path: `override`, else the draft slug, else the slugified title,
/// with [`EXTENSION`] appended when absent.
pub fn target_filename(draft: &DraftInput, filename: Option<&str>) -> Result<String, PublishError> {
    let stem = match filename.map(|f| f.trim().trim_matches('/')) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => match draft.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&draft.title),
        },
    };
    if stem.is_empty() || stem == EXTENSION {
        return Err(PublishError::validation(format!(
            "cannot derive a filename from title '{}'",
            draft.title
        )));
    }
    if stem.ends_with(EXTENSION) {
        Ok(stem)
    } else {
        Ok(format!("{stem}{EXTENSION}"))
    }
}

/// Generated fields first, caller metadata last so it wins on collision.
pub fn build_metadata(filename: &str, options: &PublishOptions, now: DateTime<Utc>) -> Frontmatter {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    let slug = name.strip_suffix(EXTENSION).unwrap_or(name);

    let mut metadata = Frontmatter::new();
    metadata.insert("slug", slug);
    metadata.insert("draft", false);
    if options.published_at {
        metadata.insert(
            "publishedAt",
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
    metadata.merge(&options.metadata);
    metadata
}

pub fn commit_message(mode: WriteMode, title: &str) -> String {
    match mode {
        WriteMode::Created => format!("Add new post: {title}"),
        WriteMode::Updated => format!("Update post: {title}"),
    }
}

fn validate(draft: &DraftInput) -> Result<(), PublishError> {
    if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
        return Err(PublishError::validation("Missing title or content"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// publish_one
// ---------------------------------------------------------------------------

/// Publish one draft with exactly one remote write.
///
/// A failed existence check counts as "absent"; only the write can fail the
/// operation remotely.
pub fn publish_one(
    client: &RepoClient,
    draft: &DraftInput,
    options: &PublishOptions,
) -> Result<Published, PublishError> {
    validate(draft)?;
    let filename = target_filename(draft, options.filename.as_deref())?;
    let metadata = build_metadata(&filename, options, Utc::now());
    let document = serialize(&draft.title, &draft.content, Some(&metadata));

    let prior_sha = match client.find_file(&filename) {
        Ok(found) => found.map(|file| file.sha),
        Err(err) => {
            tracing::debug!(path = %filename, error = %err, "existence check failed, treating as new file");
            None
        }
    };
    let mode = if prior_sha.is_some() {
        WriteMode::Updated
    } else {
        WriteMode::Created
    };
    let message = commit_message(mode, &draft.title);

    let outcome = client.write_file(&filename, &document, &message, prior_sha.as_deref())?;
    let url = outcome
        .file
        .as_ref()
        .and_then(|file| file.html_url.clone())
        .or_else(|| blob_url(client, &filename));

    Ok(Published {
        draft_id: draft.id.clone(),
        filename,
        mode,
        commit: outcome.commit,
        url,
    })
}

/// Without a configured branch the write lands on the repository's default
/// branch, whose name is unknown here, so there is no URL to build.
fn blob_url(client: &RepoClient, filename: &str) -> Option<String> {
    let settings = client.settings();
    let branch = settings.branch.as_deref()?;
    Some(format!(
        "{}/{}/{}/blob/{}/{}",
        settings.html_base, settings.owner, settings.repo, branch, filename
    ))
}
