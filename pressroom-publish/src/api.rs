//! JSON-serializable service surface for front ends.
//!
//! Every operation returns an [`ApiResponse`]: `{"kind":"ok", ..body}` or
//! `{"kind":"api_error","error":..,"class":..,"status":..,"timestamp":..}`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use pressroom_codec::{parse, reading_time_minutes, word_count};
use pressroom_core::{ConfigError, DraftId, Settings};
use pressroom_github::{
    CommitInfo, FileListing, HttpTransport, ListingStats, MarkdownFile, RepoClient,
};
use serde::Serialize;

use crate::batch::{self, BatchPublishResult, ReadManyResult};
use crate::error::{ErrorClass, PublishError};
use crate::publisher::{publish_one, target_filename, DraftInput, PublishOptions, Published};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiResponse<T> {
    Ok(T),
    ApiError(ApiError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub error: String,
    pub class: ErrorClass,
    pub status: u16,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<DraftId>,
}

impl ApiError {
    pub fn from_error(err: &PublishError) -> Self {
        let class = err.class();
        Self {
            error: err.to_string(),
            class,
            status: class.status(),
            timestamp: Utc::now(),
            path: None,
            draft_id: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiResponse::Ok(_))
    }

    /// 200 on success, else the error class status.
    pub fn status(&self) -> u16 {
        match self {
            ApiResponse::Ok(_) => 200,
            ApiResponse::ApiError(err) => err.status,
        }
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Ok(body) => Ok(body),
            ApiResponse::ApiError(err) => Err(err),
        }
    }

    fn with_context(mut self, path: Option<String>, draft_id: Option<DraftId>) -> Self {
        if let ApiResponse::ApiError(err) = &mut self {
            err.path = path;
            err.draft_id = draft_id;
        }
        self
    }
}

impl<T> From<Result<T, PublishError>> for ApiResponse<T> {
    fn from(result: Result<T, PublishError>) -> Self {
        match result {
            Ok(body) => ApiResponse::Ok(body),
            Err(err) => ApiResponse::ApiError(ApiError::from_error(&err)),
        }
    }
}

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Branch to list; the configured branch (or `main`) when unset.
    pub branch: Option<String>,
    /// Size cap in bytes; the configured cap when unset. 0 = unlimited.
    pub max_size: Option<u64>,
    pub group_by_folder: bool,
    pub include_stats: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilesBody {
    #[serde(flatten)]
    pub listing: FileListing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ListingStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folders: Option<BTreeMap<String, Vec<MarkdownFile>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadBody {
    pub path: String,
    pub sha: String,
    pub size: Option<u64>,
    pub html_url: Option<String>,
    pub title: String,
    pub word_count: usize,
    pub reading_time_minutes: usize,
    /// Raw file text, header included.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub draft: DraftInput,
    pub options: PublishOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteBody {
    pub path: String,
    pub commit: CommitInfo,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Entry point shared by every front end.
///
/// Holds the settings outcome rather than failing at construction, so a
/// missing setting is reported per call as a configuration error.
pub struct Service {
    client: Result<Arc<RepoClient>, String>,
}

impl Service {
    pub fn new(settings: Result<Settings, ConfigError>) -> Self {
        Self {
            client: settings
                .map(|s| Arc::new(RepoClient::new(s)))
                .map_err(|e| e.to_string()),
        }
    }

    pub fn with_transport(
        settings: Result<Settings, ConfigError>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            client: settings
                .map(|s| Arc::new(RepoClient::with_transport(s, transport)))
                .map_err(|e| e.to_string()),
        }
    }

    fn client(&self) -> Result<Arc<RepoClient>, PublishError> {
        self.client.clone().map_err(PublishError::Config)
    }

    /// Markdown files on a branch, with optional stats and folder grouping.
    pub async fn list_files(&self, query: ListQuery) -> ApiResponse<FilesBody> {
        let result = async {
            let client = self.client()?;
            blocking(move || {
                let requested = query
                    .branch
                    .unwrap_or_else(|| client.settings().requested_branch().to_string());
                let max_size = query.max_size.unwrap_or(client.settings().max_file_size);
                let branch = client.resolve_branch(&requested)?;
                let listing = client.list_markdown_files(&branch, max_size)?;
                Ok(FilesBody {
                    stats: query.include_stats.then(|| listing.stats()),
                    folders: query.group_by_folder.then(|| listing.group_by_folder()),
                    listing,
                })
            })
            .await
        }
        .await;
        ApiResponse::from(result)
    }

    /// Raw content of one file plus a few derived figures.
    pub async fn read_file(&self, path: &str) -> ApiResponse<ReadBody> {
        let owned = path.to_string();
        let result = async {
            let client = self.client()?;
            if owned.trim().is_empty() {
                return Err(PublishError::Validation("File path is required".into()));
            }
            blocking(move || {
                let content = client.get_file(&owned)?;
                let doc = parse(&content.text);
                Ok(ReadBody {
                    path: content.file.path,
                    sha: content.file.sha,
                    size: content.file.size,
                    html_url: content.file.html_url,
                    title: doc.title,
                    word_count: word_count(&doc.content),
                    reading_time_minutes: reading_time_minutes(&doc.content),
                    content: content.text,
                })
            })
            .await
        }
        .await;
        ApiResponse::from(result).with_context(Some(path.to_string()), None)
    }

    pub async fn publish(&self, request: PublishRequest) -> ApiResponse<Published> {
        let draft_id = request.draft.id.clone();
        let path = target_filename(&request.draft, request.options.filename.as_deref()).ok();
        let result = async {
            let client = self.client()?;
            blocking(move || publish_one(&client, &request.draft, &request.options)).await
        }
        .await;
        ApiResponse::from(result).with_context(path, draft_id)
    }

    pub async fn publish_batch(&self, drafts: Vec<DraftInput>) -> ApiResponse<BatchPublishResult> {
        let result = async {
            let client = self.client()?;
            batch::publish_batch(client, drafts).await
        }
        .await;
        ApiResponse::from(result)
    }

    pub async fn read_many(&self, paths: Vec<String>) -> ApiResponse<ReadManyResult> {
        let result = async {
            let client = self.client()?;
            batch::read_many(client, paths).await
        }
        .await;
        ApiResponse::from(result)
    }

    /// Remove a published file, looking up its current hash first.
    pub async fn delete_file(&self, path: &str, message: Option<String>) -> ApiResponse<DeleteBody> {
        let owned = path.to_string();
        let result = async {
            let client = self.client()?;
            blocking(move || {
                let file = client.find_file(&owned)?.ok_or_else(|| {
                    PublishError::Validation(format!("No file at {owned}"))
                })?;
                let message = message.unwrap_or_else(|| format!("Delete post: {owned}"));
                let commit = client.delete_file(&owned, &file.sha, &message)?;
                Ok(DeleteBody { path: owned, commit })
            })
            .await
        }
        .await;
        ApiResponse::from(result).with_context(Some(path.to_string()), None)
    }
}

/// Run a blocking closure on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, PublishError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PublishError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PublishError::Task(e.to_string()))?
}
