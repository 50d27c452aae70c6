//! Markdown file listing built from a recursive tree.

use std::collections::{BTreeMap, BTreeSet};

use pressroom_core::Settings;
use serde::Serialize;

use crate::models::{BranchCommit, EntryKind, TreeResponse};

/// Extensions recognised as Markdown, compared case-insensitively.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkdn", "mkd"];

/// Folder label for files at the repository root.
pub const ROOT_FOLDER: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: Option<u64>,
    pub folder: String,
    pub extension: String,
    pub download_url: String,
    pub html_url: String,
}

/// Markdown files on one branch.
///
/// When `truncated` is set the upstream tree was cut short, so `files` and
/// every count derived from it may be incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileListing {
    pub repository: String,
    pub branch: String,
    /// Short commit hash the listing was taken at.
    pub commit: String,
    pub files: Vec<MarkdownFile>,
    pub truncated: bool,
    pub total_tree_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingStats {
    pub total_tree_items: usize,
    pub markdown_count: usize,
    pub truncated: bool,
    pub folders: usize,
    pub extensions: Vec<String>,
    pub total_size: u64,
    pub average_size: u64,
}

impl FileListing {
    pub fn stats(&self) -> ListingStats {
        let folders: BTreeSet<&str> = self.files.iter().map(|f| f.folder.as_str()).collect();
        let extensions: BTreeSet<&str> = self.files.iter().map(|f| f.extension.as_str()).collect();
        let total_size: u64 = self.files.iter().filter_map(|f| f.size).sum();
        let average_size = if self.files.is_empty() {
            0
        } else {
            let count = self.files.len() as u64;
            (total_size + count / 2) / count
        };
        ListingStats {
            total_tree_items: self.total_tree_items,
            markdown_count: self.files.len(),
            truncated: self.truncated,
            folders: folders.len(),
            extensions: extensions.into_iter().map(str::to_string).collect(),
            total_size,
            average_size,
        }
    }

    /// Folder → files sorted by name.
    pub fn group_by_folder(&self) -> BTreeMap<String, Vec<MarkdownFile>> {
        let mut groups: BTreeMap<String, Vec<MarkdownFile>> = BTreeMap::new();
        for file in &self.files {
            groups
                .entry(file.folder.clone())
                .or_default()
                .push(file.clone());
        }
        for files in groups.values_mut() {
            files.sort_by(|a, b| a.name.cmp(&b.name));
        }
        groups
    }
}

/// Filter `tree` to Markdown blobs no larger than `max_size` (0 = unlimited).
pub fn build_listing(
    settings: &Settings,
    branch: &BranchCommit,
    tree: TreeResponse,
    max_size: u64,
) -> FileListing {
    if tree.truncated {
        tracing::warn!(
            branch = %branch.name,
            items = tree.tree.len(),
            "tree listing was truncated upstream; file list may be incomplete"
        );
    }

    let total_tree_items = tree.tree.len();
    let mut files: Vec<MarkdownFile> = tree
        .tree
        .into_iter()
        .filter(|entry| entry.kind == EntryKind::Blob)
        .filter(|entry| markdown_extension(&entry.path).is_some())
        .filter(|entry| within_limit(entry.size, max_size))
        .map(|entry| {
            let extension = markdown_extension(&entry.path).unwrap_or_default();
            let (folder, name) = split_path(&entry.path);
            MarkdownFile {
                download_url: format!(
                    "{}/{}/{}/{}/{}",
                    settings.raw_base, settings.owner, settings.repo, branch.name, entry.path
                ),
                html_url: format!(
                    "{}/{}/{}/blob/{}/{}",
                    settings.html_base, settings.owner, settings.repo, branch.name, entry.path
                ),
                name,
                folder,
                extension,
                sha: entry.sha,
                size: entry.size,
                path: entry.path,
            }
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    FileListing {
        repository: settings.repository(),
        branch: branch.name.clone(),
        commit: branch.short_sha().to_string(),
        files,
        truncated: tree.truncated,
        total_tree_items,
    }
}

/// Lowercased extension (without the dot) if it names a Markdown file.
pub fn markdown_extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    MARKDOWN_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn within_limit(size: Option<u64>, max_size: u64) -> bool {
    match size {
        Some(size) if max_size > 0 => size <= max_size,
        _ => true,
    }
}

fn split_path(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((folder, name)) => (folder.to_string(), name.to_string()),
        None => (ROOT_FOLDER.to_string(), path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TreeEntry;
    use rstest::rstest;

    fn entry(path: &str, kind: EntryKind, size: Option<u64>) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            mode: "100644".to_string(),
            kind,
            sha: format!("sha-{path}"),
            size,
            url: None,
        }
    }

    fn listing(entries: Vec<TreeEntry>, truncated: bool, max_size: u64) -> FileListing {
        let settings = Settings::new("octo", "blog", "t");
        let branch = BranchCommit {
            name: "main".into(),
            sha: "0123456789abcdef".into(),
        };
        let tree = TreeResponse {
            sha: "tree".into(),
            tree: entries,
            truncated,
        };
        build_listing(&settings, &branch, tree, max_size)
    }

    #[rstest]
    #[case("post.md", Some("md"))]
    #[case("docs/Guide.MARKDOWN", Some("markdown"))]
    #[case("a/b/c.mkd", Some("mkd"))]
    #[case("notes.txt", None)]
    #[case(".md", None)]
    #[case("README", None)]
    fn recognises_markdown_extensions(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(markdown_extension(path).as_deref(), expected);
    }

    #[test]
    fn keeps_only_markdown_blobs_sorted_by_path() {
        let result = listing(
            vec![
                entry("z.md", EntryKind::Blob, Some(10)),
                entry("docs", EntryKind::Tree, None),
                entry("docs/a.md", EntryKind::Blob, Some(20)),
                entry("image.png", EntryKind::Blob, Some(30)),
            ],
            false,
            0,
        );
        let paths: Vec<_> = result.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["docs/a.md", "z.md"]);
        assert_eq!(result.total_tree_items, 4);
        assert_eq!(result.commit, "01234567");
        assert_eq!(result.repository, "octo/blog");
    }

    #[test]
    fn urls_and_folders_are_derived_from_path() {
        let result = listing(
            vec![
                entry("docs/a.md", EntryKind::Blob, Some(1)),
                entry("top.md", EntryKind::Blob, Some(1)),
            ],
            false,
            0,
        );
        let nested = &result.files[0];
        assert_eq!(nested.folder, "docs");
        assert_eq!(nested.name, "a.md");
        assert_eq!(
            nested.download_url,
            "https://raw.githubusercontent.com/octo/blog/main/docs/a.md"
        );
        assert_eq!(nested.html_url, "https://github.com/octo/blog/blob/main/docs/a.md");
        assert_eq!(result.files[1].folder, ROOT_FOLDER);
    }

    #[test]
    fn size_limit_passes_unknown_sizes() {
        let result = listing(
            vec![
                entry("small.md", EntryKind::Blob, Some(100)),
                entry("big.md", EntryKind::Blob, Some(5000)),
                entry("unknown.md", EntryKind::Blob, None),
            ],
            false,
            1000,
        );
        let paths: Vec<_> = result.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["small.md", "unknown.md"]);
    }

    #[test]
    fn truncation_is_surfaced() {
        let result = listing(vec![entry("a.md", EntryKind::Blob, Some(1))], true, 0);
        assert!(result.truncated);
        assert!(result.stats().truncated);
    }

    #[test]
    fn stats_aggregate_sizes_folders_and_extensions() {
        let result = listing(
            vec![
                entry("a.md", EntryKind::Blob, Some(10)),
                entry("docs/b.markdown", EntryKind::Blob, Some(15)),
                entry("docs/c.md", EntryKind::Blob, Some(20)),
            ],
            false,
            0,
        );
        let stats = result.stats();
        assert_eq!(stats.markdown_count, 3);
        assert_eq!(stats.folders, 2);
        assert_eq!(stats.extensions, vec!["markdown", "md"]);
        assert_eq!(stats.total_size, 45);
        assert_eq!(stats.average_size, 15);
    }

    #[test]
    fn empty_listing_has_zero_average() {
        assert_eq!(listing(vec![], false, 0).stats().average_size, 0);
    }

    #[test]
    fn grouping_sorts_files_by_name_within_folder() {
        let result = listing(
            vec![
                entry("docs/z.md", EntryKind::Blob, Some(1)),
                entry("docs/sub/a.md", EntryKind::Blob, Some(1)),
                entry("docs/b.md", EntryKind::Blob, Some(1)),
                entry("c.md", EntryKind::Blob, Some(1)),
            ],
            false,
            0,
        );
        let groups = result.group_by_folder();
        let folders: Vec<_> = groups.keys().map(String::as_str).collect();
        assert_eq!(folders, vec!["docs", "docs/sub", "root"]);
        let docs: Vec<_> = groups["docs"].iter().map(|f| f.name.as_str()).collect();
        assert_eq!(docs, vec!["b.md", "z.md"]);
    }
}
