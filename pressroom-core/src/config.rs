//! Repository settings.
//!
//! # Sources
//!
//! Lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. `<home>/.pressroom/config.yaml` (optional)
//! 3. environment: `GITHUB_OWNER`, `GITHUB_REPO`, `GITHUB_TOKEN`,
//!    `GITHUB_BRANCH`, `PRESSROOM_API_BASE`
//!
//! Owner, repository and token are required. Empty strings count as absent.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_HTML_BASE: &str = "https://github.com";
/// Branch requested for listings when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

pub const ENV_OWNER: &str = "GITHUB_OWNER";
pub const ENV_REPO: &str = "GITHUB_REPO";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_BRANCH: &str = "GITHUB_BRANCH";
pub const ENV_API_BASE: &str = "PRESSROOM_API_BASE";

/// On-disk shape of `config.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
    pub max_file_size: Option<u64>,
    pub api_base: Option<String>,
    pub raw_base: Option<String>,
    pub html_base: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub batch_window: Option<usize>,
    pub max_batch: Option<usize>,
}

/// Retry policy knobs for outbound API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Retries after the first attempt; total attempts is `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before retry `n` is `base_delay * 2^n`.
    pub base_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Fully resolved settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub owner: String,
    pub repo: String,
    pub token: String,
    /// Explicit branch. `None` means contents reads/writes target the
    /// repository's default branch and listings request [`DEFAULT_BRANCH`].
    pub branch: Option<String>,
    /// Listing size cap in bytes; 0 disables the filter.
    pub max_file_size: u64,
    pub api_base: String,
    pub raw_base: String,
    pub html_base: String,
    pub retry: RetrySettings,
    pub request_timeout: Duration,
    /// Maximum number of concurrent remote operations in a batch.
    pub batch_window: usize,
    /// Maximum number of items accepted by a single batch request.
    pub max_batch: usize,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("branch", &self.branch)
            .field("max_file_size", &self.max_file_size)
            .field("api_base", &self.api_base)
            .field("retry", &self.retry)
            .field("batch_window", &self.batch_window)
            .field("max_batch", &self.max_batch)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Settings with required values filled and every tunable at its default.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            branch: None,
            max_file_size: 0,
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            html_base: DEFAULT_HTML_BASE.to_string(),
            retry: RetrySettings::default(),
            request_timeout: Duration::from_secs(30),
            batch_window: 10,
            max_batch: 50,
        }
    }

    /// Merge a config file with an environment lookup.
    ///
    /// `env` is injected so tests never touch the process environment.
    pub fn resolve<F>(file: FileSettings, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, fallback: Option<String>| {
            non_empty(env(key)).or_else(|| non_empty(fallback))
        };

        let owner = pick(ENV_OWNER, file.owner);
        let repo = pick(ENV_REPO, file.repo);
        let token = pick(ENV_TOKEN, file.token);

        let mut missing = Vec::new();
        if owner.is_none() {
            missing.push(ENV_OWNER);
        }
        if repo.is_none() {
            missing.push(ENV_REPO);
        }
        if token.is_none() {
            missing.push(ENV_TOKEN);
        }
        let (Some(owner), Some(repo), Some(token)) = (owner, repo, token) else {
            return Err(ConfigError::Missing { keys: missing });
        };

        let mut settings = Settings::new(owner, repo, token);
        settings.branch = pick(ENV_BRANCH, file.branch);
        if let Some(api_base) = pick(ENV_API_BASE, file.api_base) {
            settings.api_base = trim_base(api_base);
        }
        if let Some(raw_base) = non_empty(file.raw_base) {
            settings.raw_base = trim_base(raw_base);
        }
        if let Some(html_base) = non_empty(file.html_base) {
            settings.html_base = trim_base(html_base);
        }
        if let Some(max) = file.max_file_size {
            settings.max_file_size = max;
        }
        if let Some(retries) = file.max_retries {
            settings.retry.max_retries = retries;
        }
        if let Some(ms) = file.retry_base_delay_ms {
            settings.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = file.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(window) = file.batch_window {
            if window == 0 {
                return Err(ConfigError::Invalid {
                    key: "batch_window",
                    reason: "must be at least 1".to_string(),
                });
            }
            settings.batch_window = window;
        }
        if let Some(max_batch) = file.max_batch {
            if max_batch == 0 {
                return Err(ConfigError::Invalid {
                    key: "max_batch",
                    reason: "must be at least 1".to_string(),
                });
            }
            settings.max_batch = max_batch;
        }
        Ok(settings)
    }

    /// `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Branch name requested when resolving a listing.
    pub fn requested_branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// `<home>/.pressroom/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".pressroom").join("config.yaml")
}

/// Read the config file if present.
pub fn load_file_at(home: &Path) -> Result<FileSettings, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(FileSettings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(FileSettings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// Resolve settings from `<home>` plus the process environment.
pub fn load_at(home: &Path) -> Result<Settings, ConfigError> {
    let file = load_file_at(home)?;
    Settings::resolve(file, |key| std::env::var(key).ok())
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    load_at(&home)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
