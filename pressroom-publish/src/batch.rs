//! Batch publish and batch read over the bounded pool.

use std::sync::Arc;

use pressroom_github::RepoClient;
use serde::Serialize;

use crate::error::PublishError;
use crate::pool::run_bounded;
use crate::publisher::{publish_one, DraftInput, PublishOptions, PublishResult};

/// Aggregate of a batch publish. Partial failure is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPublishResult {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<PublishResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadManyResult {
    pub requested: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<ReadItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadItem {
    pub path: String,
    #[serde(flatten)]
    pub outcome: ReadOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadOutcome {
    Ok {
        content: String,
        sha: String,
        size: Option<u64>,
    },
    Failed {
        error: String,
    },
}

fn check_batch_size(len: usize, max: usize, noun: &str) -> Result<(), PublishError> {
    if len == 0 {
        return Err(PublishError::Validation(format!("No {noun} provided")));
    }
    if len > max {
        return Err(PublishError::Validation(format!(
            "Too many {noun}: {len} (maximum {max})"
        )));
    }
    Ok(())
}

/// Publish every draft, at most `batch_window` at a time.
///
/// An empty or oversized list is rejected before any remote call; after
/// that, each draft succeeds or fails on its own.
pub async fn publish_batch(
    client: Arc<RepoClient>,
    drafts: Vec<DraftInput>,
) -> Result<BatchPublishResult, PublishError> {
    let settings = client.settings();
    check_batch_size(drafts.len(), settings.max_batch, "drafts")?;
    let window = settings.batch_window;
    let requested = drafts.len();
    tracing::info!(requested, window, "publishing batch");

    let options = PublishOptions::default();
    let inputs = drafts.clone();
    let worker_options = options.clone();
    let outcomes = run_bounded(inputs, window, move |draft: DraftInput| {
        match publish_one(&client, &draft, &worker_options) {
            Ok(published) => PublishResult::from(published),
            Err(err) => {
                tracing::warn!(draft = ?draft.id, error = %err, "draft failed to publish");
                PublishResult::failed(&draft, &worker_options, &err)
            }
        }
    })
    .await;

    let results: Vec<PublishResult> = outcomes
        .into_iter()
        .zip(&drafts)
        .map(|(outcome, draft)| {
            outcome.unwrap_or_else(|err| PublishResult::failed(draft, &options, &err))
        })
        .collect();
    let succeeded = results.iter().filter(|r| r.is_committed()).count();

    Ok(BatchPublishResult {
        requested,
        succeeded,
        failed: requested - succeeded,
        results,
    })
}

/// Read every path, at most `batch_window` at a time.
pub async fn read_many(
    client: Arc<RepoClient>,
    paths: Vec<String>,
) -> Result<ReadManyResult, PublishError> {
    let settings = client.settings();
    check_batch_size(paths.len(), settings.max_batch, "paths")?;
    let window = settings.batch_window;
    let requested = paths.len();

    let outcomes = run_bounded(paths.clone(), window, move |path: String| {
        match client.get_file(&path) {
            Ok(content) => ReadOutcome::Ok {
                content: content.text,
                sha: content.file.sha,
                size: content.file.size,
            },
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "read failed");
                ReadOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    })
    .await;

    let results: Vec<ReadItem> = outcomes
        .into_iter()
        .zip(paths)
        .map(|(outcome, path)| ReadItem {
            path,
            outcome: outcome.unwrap_or_else(|err| ReadOutcome::Failed {
                error: err.to_string(),
            }),
        })
        .collect();
    let successful = results
        .iter()
        .filter(|r| matches!(r.outcome, ReadOutcome::Ok { .. }))
        .count();

    Ok(ReadManyResult {
        requested,
        successful,
        failed: requested - successful,
        results,
    })
}
