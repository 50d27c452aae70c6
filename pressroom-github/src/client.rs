//! Repository client: branch resolution, tree listing, contents read/write.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pressroom_core::Settings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::RemoteError;
use crate::listing::{build_listing, FileListing};
use crate::models::{
    BranchCommit, BranchResponse, CommitInfo, ContentsEntry, ContentsPayload, DeleteBody,
    RemoteContent, RemoteFile, TreeResponse, WriteBody, WriteOutcome, WriteResponse,
};
use crate::retry::{fetch_with_retry, RetryPolicy};
use crate::transport::{HttpRequest, HttpTransport, Method, UreqTransport};

/// Tried in order after the requested branch.
pub const FALLBACK_BRANCHES: &[&str] = &["main", "master", "develop", "dev"];

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

pub struct RepoClient {
    settings: Settings,
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl RepoClient {
    /// Client over a real HTTP agent.
    pub fn new(settings: Settings) -> Self {
        let transport = Arc::new(UreqTransport::new(settings.request_timeout));
        Self::with_transport(settings, transport)
    }

    pub fn with_transport(settings: Settings, transport: Arc<dyn HttpTransport>) -> Self {
        let policy = RetryPolicy::from(settings.retry);
        Self {
            settings,
            transport,
            policy,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // -----------------------------------------------------------------------
    // Branches and listing
    // -----------------------------------------------------------------------

    /// Resolve `requested`, falling back through [`FALLBACK_BRANCHES`].
    ///
    /// A 404 moves on quietly; any other failure is logged and also moves on.
    pub fn resolve_branch(&self, requested: &str) -> Result<BranchCommit, RemoteError> {
        let candidates: Vec<&str> = std::iter::once(requested)
            .chain(
                FALLBACK_BRANCHES
                    .iter()
                    .copied()
                    .filter(|name| *name != requested),
            )
            .collect();

        for &name in &candidates {
            let url = self.api_url(&["branches", name], &[])?;
            match self.get_json::<BranchResponse>(&url) {
                Ok(branch) => {
                    if name != requested {
                        tracing::info!(requested, resolved = %branch.name, "using fallback branch");
                    }
                    return Ok(BranchCommit {
                        name: branch.name,
                        sha: branch.commit.sha,
                    });
                }
                Err(err) if err.is_not_found() => {
                    tracing::debug!(branch = %name, "branch not found, trying next candidate");
                }
                Err(err) => {
                    tracing::warn!(branch = %name, error = %err, "branch lookup failed, trying next candidate");
                }
            }
        }

        Err(RemoteError::NoAccessibleBranch {
            tried: candidates.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Full recursive tree at `commit_sha`.
    pub fn fetch_tree(&self, commit_sha: &str) -> Result<TreeResponse, RemoteError> {
        let url = self.api_url(&["git", "trees", commit_sha], &[("recursive", "1")])?;
        self.get_json(&url)
    }

    /// Markdown files on `branch`, optionally capped at `max_size` bytes (0 = no cap).
    pub fn list_markdown_files(
        &self,
        branch: &BranchCommit,
        max_size: u64,
    ) -> Result<FileListing, RemoteError> {
        let tree = self.fetch_tree(&branch.sha)?;
        Ok(build_listing(&self.settings, branch, tree, max_size))
    }

    // -----------------------------------------------------------------------
    // Contents
    // -----------------------------------------------------------------------

    /// Metadata and decoded text of the file at `path`.
    pub fn get_file(&self, path: &str) -> Result<RemoteContent, RemoteError> {
        let entry = self.contents_entry(path)?;
        let text = decode_content(&entry)?;
        Ok(RemoteContent {
            file: RemoteFile::from(&entry),
            text,
        })
    }

    pub fn read_file(&self, path: &str) -> Result<String, RemoteError> {
        Ok(self.get_file(path)?.text)
    }

    /// `Ok(None)` when nothing exists at `path`.
    pub fn find_file(&self, path: &str) -> Result<Option<RemoteFile>, RemoteError> {
        match self.contents_entry(path) {
            Ok(entry) => Ok(Some(RemoteFile::from(&entry))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Create or update `path`. `prior_sha` must be the current content hash
    /// when the file already exists and `None` when it does not.
    pub fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        prior_sha: Option<&str>,
    ) -> Result<WriteOutcome, RemoteError> {
        let url = self.contents_url(path, false)?;
        let body = WriteBody {
            message,
            content: STANDARD.encode(content),
            sha: prior_sha,
            branch: self.settings.branch.as_deref(),
        };
        let response: WriteResponse = self.send_json(Method::Put, &url, &body)?;
        tracing::info!(
            path,
            commit = %response.commit.sha,
            update = prior_sha.is_some(),
            "committed file"
        );
        Ok(WriteOutcome {
            file: response.content.as_ref().map(RemoteFile::from),
            commit: response.commit,
        })
    }

    pub fn delete_file(
        &self,
        path: &str,
        prior_sha: &str,
        message: &str,
    ) -> Result<CommitInfo, RemoteError> {
        let url = self.contents_url(path, false)?;
        let body = DeleteBody {
            message,
            sha: prior_sha,
            branch: self.settings.branch.as_deref(),
        };
        let response: WriteResponse = self.send_json(Method::Delete, &url, &body)?;
        tracing::info!(path, commit = %response.commit.sha, "deleted file");
        Ok(response.commit)
    }

    fn contents_entry(&self, path: &str) -> Result<ContentsEntry, RemoteError> {
        let url = self.contents_url(path, true)?;
        match self.get_json::<ContentsPayload>(&url)? {
            ContentsPayload::File(entry) => Ok(*entry),
            ContentsPayload::Directory(_) => Err(RemoteError::NotAFile {
                path: path.to_string(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    /// `{api_base}/repos/{owner}/{repo}/{segments..}?{query}`
    fn api_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String, RemoteError> {
        let invalid = |reason: String| RemoteError::InvalidUrl {
            url: self.settings.api_base.clone(),
            reason,
        };
        let mut url = Url::parse(&self.settings.api_base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["repos", self.settings.owner.as_str(), self.settings.repo.as_str()])
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }

    /// Contents URL for `path`; reads pin the configured branch via `ref`.
    fn contents_url(&self, path: &str, read: bool) -> Result<String, RemoteError> {
        let mut segments = vec!["contents"];
        segments.extend(path.trim_matches('/').split('/'));
        match (&self.settings.branch, read) {
            (Some(branch), true) => self.api_url(&segments, &[("ref", branch.as_str())]),
            _ => self.api_url(&segments, &[]),
        }
    }

    fn request(&self, method: Method, url: &str, body: Option<String>) -> HttpRequest {
        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.settings.token),
            ),
            ("Accept".to_string(), ACCEPT.to_string()),
            (
                "User-Agent".to_string(),
                concat!("pressroom/", env!("CARGO_PKG_VERSION")).to_string(),
            ),
            ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        let request = self.request(Method::Get, url, None);
        self.execute(&request)
    }

    fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        let body = serde_json::to_string(body).map_err(|source| RemoteError::Decode {
            url: url.to_string(),
            source,
        })?;
        let request = self.request(method, url, Some(body));
        self.execute(&request)
    }

    fn execute<T: DeserializeOwned>(&self, request: &HttpRequest) -> Result<T, RemoteError> {
        let response = fetch_with_retry(self.transport.as_ref(), request, &self.policy)?;
        serde_json::from_str(&response.body).map_err(|source| RemoteError::Decode {
            url: request.url.clone(),
            source,
        })
    }
}

/// Decode a contents entry's transport encoding to text.
fn decode_content(entry: &ContentsEntry) -> Result<String, RemoteError> {
    let encoding = entry.encoding.as_deref().unwrap_or("none");
    if encoding != "base64" {
        return Err(RemoteError::UnsupportedEncoding {
            path: entry.path.clone(),
            encoding: encoding.to_string(),
        });
    }
    // The API wraps base64 at 60 columns.
    let packed: String = entry
        .content
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(packed)
        .map_err(|source| RemoteError::Base64 {
            path: entry.path.clone(),
            source,
        })?;
    String::from_utf8(bytes).map_err(|_| RemoteError::Utf8 {
        path: entry.path.clone(),
    })
}
