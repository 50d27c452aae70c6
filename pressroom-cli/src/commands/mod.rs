pub mod draft;
pub mod files;
pub mod publish;
pub mod read;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use pressroom_core::{config, DraftStore};
use pressroom_publish::{ApiResponse, ErrorClass, Service};
use serde::Serialize;

pub(crate) fn open_store() -> Result<DraftStore> {
    DraftStore::open().context("failed to open draft store")
}

/// Service over the configured repository; a missing setting surfaces on
/// the first call as a configuration error.
pub(crate) fn service() -> Service {
    Service::new(config::load())
}

/// Read `--content` or `--file`, whichever was given.
pub(crate) fn body_from(content: Option<String>, file: Option<PathBuf>) -> Result<Option<String>> {
    match (content, file) {
        (Some(content), _) => Ok(Some(content)),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => Ok(None),
    }
}

/// Print `response` as JSON or through `render`; a failed response becomes
/// an error so the process exits non-zero.
pub(crate) fn emit<T: Serialize>(
    response: ApiResponse<T>,
    json: bool,
    render: impl FnOnce(T),
) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("failed to serialize response")?
        );
    }
    match response {
        ApiResponse::Ok(body) => {
            if !json {
                render(body);
            }
            Ok(())
        }
        ApiResponse::ApiError(err) => {
            if !json && err.class == ErrorClass::Configuration {
                eprintln!(
                    "{} set GITHUB_OWNER, GITHUB_REPO and GITHUB_TOKEN or edit {}",
                    "hint:".yellow().bold(),
                    config_hint()
                );
            }
            anyhow::bail!("{} (status {})", err.error, err.status)
        }
    }
}

fn config_hint() -> String {
    dirs::home_dir()
        .map(|home| config::config_path_at(&home).display().to_string())
        .unwrap_or_else(|| "~/.pressroom/config.yaml".to_string())
}
