//! Typed shapes of the REST responses this crate consumes.
//!
//! Raw JSON is decoded into these once, inside [`RepoClient`](crate::RepoClient);
//! nothing downstream inspects response bodies.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Branches and trees
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BranchResponse {
    pub name: String,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommitRef {
    pub sha: String,
}

/// A branch name and the commit it currently points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchCommit {
    pub name: String,
    pub sha: String,
}

impl BranchCommit {
    /// First eight characters of the commit hash.
    pub fn short_sha(&self) -> &str {
        self.sha.get(..8).unwrap_or(&self.sha)
    }
}

/// `GET /git/trees/{sha}?recursive=1`
#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
    pub sha: String,
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(default)]
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub sha: String,
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule commits and anything newer.
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

/// One item of a `GET /contents/{path}` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentsEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// The contents endpoint answers an array for directories, an object for files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentsPayload {
    Directory(Vec<ContentsEntry>),
    File(Box<ContentsEntry>),
}

/// Read-side projection of a repository entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFile {
    pub name: String,
    pub path: String,
    /// Content hash; required to overwrite or delete this file.
    pub sha: String,
    pub size: Option<u64>,
    pub url: String,
    pub html_url: Option<String>,
    pub download_url: Option<String>,
    pub kind: EntryKind,
}

impl From<&ContentsEntry> for RemoteFile {
    fn from(entry: &ContentsEntry) -> Self {
        let kind = match entry.kind.as_str() {
            "file" => EntryKind::Blob,
            "dir" => EntryKind::Tree,
            _ => EntryKind::Other,
        };
        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            sha: entry.sha.clone(),
            size: entry.size,
            url: entry.url.clone(),
            html_url: entry.html_url.clone(),
            download_url: entry.download_url.clone(),
            kind,
        }
    }
}

/// A file together with its decoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteContent {
    pub file: RemoteFile,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct WriteBody<'a> {
    pub message: &'a str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteBody<'a> {
    pub message: &'a str,
    pub sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WriteResponse {
    pub content: Option<ContentsEntry>,
    pub commit: CommitInfo,
}

/// The commit created by a write or delete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Result of `write_file`: the new commit and the file as now stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub commit: CommitInfo,
    pub file: Option<RemoteFile>,
}
