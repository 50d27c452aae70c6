//! Local draft store.
//!
//! # Storage layout
//!
//! ```text
//! ~/.pressroom/
//!   drafts.json     (JSON array of drafts, mode 0600)
//! ```
//!
//! One [`DraftStore`] is opened per process and handed to whoever needs it.
//! The store keeps the loaded list in memory and rewrites the whole file
//! atomically after every mutation (`.tmp` sibling → `chmod 0600` → `rename`).
//! A mutation is built on a copy of the list and only replaces the in-memory
//! list once the file write succeeded.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{io_err, StoreError};
use crate::types::{Draft, DraftId, DraftUpdate, Slug, UNTITLED_DRAFT};

/// Outcome of [`DraftStore::import`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub imported: usize,
    pub errors: Vec<String>,
}

/// Keyed persistence for drafts.
#[derive(Debug)]
pub struct DraftStore {
    path: PathBuf,
    drafts: Vec<Draft>,
}

/// `<home>/.pressroom/drafts.json`. Pure, no I/O.
pub fn store_path_at(home: &Path) -> PathBuf {
    home.join(".pressroom").join("drafts.json")
}

impl DraftStore {
    /// Open the store under `home`. A missing file is an empty store.
    pub fn open_at(home: &Path) -> Result<Self, StoreError> {
        Self::open_file(store_path_at(home))
    }

    /// `open_at` convenience wrapper.
    pub fn open() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::HomeNotFound)?;
        Self::open_at(&home)
    }

    /// Open a store backed by an explicit file.
    pub fn open_file(path: PathBuf) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self {
                path,
                drafts: Vec::new(),
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let drafts = if contents.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?
        };
        Ok(Self { path, drafts })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All drafts, most recently updated first.
    pub fn list(&self) -> Vec<&Draft> {
        let mut all: Vec<&Draft> = self.drafts.iter().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all
    }

    pub fn get(&self, id: &DraftId) -> Option<&Draft> {
        self.drafts.iter().find(|d| &d.id == id)
    }

    pub fn count(&self) -> usize {
        self.drafts.len()
    }

    /// Pretty JSON of [`Self::list`].
    pub fn export(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.list())?)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a draft, defaulting to "Untitled Draft" and an empty body.
    pub fn create(
        &mut self,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Draft, StoreError> {
        let draft = new_draft(
            title.unwrap_or_else(|| UNTITLED_DRAFT.to_string()),
            content.unwrap_or_default(),
        );
        let mut next = self.drafts.clone();
        next.push(draft.clone());
        self.commit(next)?;
        Ok(draft)
    }

    /// Apply a partial edit. A title change regenerates the slug.
    pub fn update(&mut self, id: &DraftId, update: DraftUpdate) -> Result<Draft, StoreError> {
        let mut next = self.drafts.clone();
        let draft = next
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| StoreError::DraftNotFound { id: id.clone() })?;

        if let Some(title) = update.title {
            draft.slug = Slug::from_title(&title);
            draft.title = title;
        }
        if let Some(content) = update.content {
            draft.content = content;
        }
        draft.updated_at = bump(draft.created_at);

        let updated = draft.clone();
        self.commit(next)?;
        Ok(updated)
    }

    /// Remove one draft. Returns `false` when no such draft existed.
    pub fn delete(&mut self, id: &DraftId) -> Result<bool, StoreError> {
        let mut next = self.drafts.clone();
        next.retain(|d| &d.id != id);
        if next.len() == self.drafts.len() {
            return Ok(false);
        }
        self.commit(next)?;
        Ok(true)
    }

    /// Remove every listed draft; returns how many were removed.
    pub fn delete_many(&mut self, ids: &[DraftId]) -> Result<usize, StoreError> {
        let mut next = self.drafts.clone();
        next.retain(|d| !ids.contains(&d.id));
        let removed = self.drafts.len() - next.len();
        if removed > 0 {
            self.commit(next)?;
        }
        Ok(removed)
    }

    /// Copy title (suffixed " (Copy)") and body into a fresh draft.
    pub fn duplicate(&mut self, id: &DraftId) -> Result<Draft, StoreError> {
        let original = self
            .get(id)
            .ok_or_else(|| StoreError::DraftNotFound { id: id.clone() })?;
        let title = format!("{} (Copy)", original.title);
        let content = original.content.clone();
        self.create(Some(title), Some(content))
    }

    /// Import drafts from a JSON array.
    ///
    /// Each entry needs a non-empty `title` and `content`; valid entries
    /// become fresh drafts with new ids, invalid ones are reported by
    /// 1-based position. Malformed JSON is reported, not raised.
    pub fn import(&mut self, json: &str) -> Result<ImportReport, StoreError> {
        let parsed: serde_json::Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(err) => {
                return Ok(ImportReport {
                    success: false,
                    imported: 0,
                    errors: vec![format!("JSON parsing error: {err}")],
                })
            }
        };
        let Some(entries) = parsed.as_array() else {
            return Ok(ImportReport {
                success: false,
                imported: 0,
                errors: vec!["Invalid JSON format: expected array".to_string()],
            });
        };

        let mut next = self.drafts.clone();
        let mut errors = Vec::new();
        let mut imported = 0;
        for (index, entry) in entries.iter().enumerate() {
            let title = entry.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let content = entry.get("content").and_then(|v| v.as_str()).unwrap_or("");
            if title.is_empty() || content.is_empty() {
                errors.push(format!("Draft {}: missing title or content", index + 1));
                continue;
            }
            next.push(new_draft(title.to_string(), content.to_string()));
            imported += 1;
        }

        if imported > 0 {
            self.commit(next)?;
        }
        tracing::debug!(imported, rejected = errors.len(), "imported drafts");
        Ok(ImportReport {
            success: imported > 0,
            imported,
            errors,
        })
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.commit(Vec::new())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Persist `next`, then adopt it. On error the store is unchanged.
    fn commit(&mut self, next: Vec<Draft>) -> Result<(), StoreError> {
        self.write(&next)?;
        self.drafts = next;
        Ok(())
    }

    fn write(&self, drafts: &[Draft]) -> Result<(), StoreError> {
        let Some(dir) = self.path.parent() else {
            return Err(io_err(
                &self.path,
                std::io::Error::other("invalid draft store path"),
            ));
        };
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let json = serde_json::to_string_pretty(drafts)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        set_file_permissions(&tmp)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path, e));
        }
        Ok(())
    }
}

fn new_draft(title: String, content: String) -> Draft {
    let now = Utc::now();
    Draft {
        id: generate_id(now),
        slug: Slug::from_title(&title),
        title,
        content,
        created_at: now,
        updated_at: now,
    }
}

/// `draft-<unix-millis>-<9 hex chars>`
fn generate_id(now: DateTime<Utc>) -> DraftId {
    let random = Uuid::new_v4().simple().to_string();
    DraftId(format!("draft-{}-{}", now.timestamp_millis(), &random[..9]))
}

/// Fresh `updated_at` that never precedes `created_at`.
fn bump(created_at: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(created_at)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
