//! Serialize and parse Markdown documents with a metadata header.
//!
//! ```text
//! ---
//! title: Hello
//! draft: false
//! ---
//!
//! Body starts here.
//! ```

use serde::Serialize;
use serde_yaml::Value;

use crate::frontmatter::{decode_value, encode_value, is_writable_key, Frontmatter};

/// Header delimiter line.
pub const MARKER: &str = "---";

/// Title used when neither the header nor a level-1 heading supplies one.
pub const UNTITLED: &str = "Untitled";

/// A parsed Markdown document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    /// Body after the header, trimmed.
    pub content: String,
    pub frontmatter: Frontmatter,
    /// Whether a delimited header block was found.
    pub has_header: bool,
}

/// Build the committed text for a post.
///
/// Metadata is `{ title, ..metadata }`: a `title` key inside `metadata`
/// replaces the positional title. Keys that cannot be written on one line
/// are dropped.
pub fn serialize(title: &str, body: &str, metadata: Option<&Frontmatter>) -> String {
    let mut header = Frontmatter::new();
    header.insert("title", title);
    if let Some(metadata) = metadata {
        header.merge(metadata);
    }

    let mut out = String::with_capacity(body.len() + 64);
    out.push_str(MARKER);
    out.push('\n');
    for (key, value) in header.iter() {
        if !is_writable_key(key) {
            tracing::warn!(key, "dropping metadata key that cannot be written");
            continue;
        }
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&encode_value(value));
        out.push('\n');
    }
    out.push_str(MARKER);
    out.push_str("\n\n");
    out.push_str(body);
    out
}

/// Parse a document, falling back to heading detection without a header.
pub fn parse(text: &str) -> Document {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    match split_header(text) {
        Some((header, body)) => {
            let frontmatter = parse_header(header);
            let title = title_from(&frontmatter).unwrap_or_else(|| UNTITLED.to_string());
            Document {
                title,
                content: body.trim().to_string(),
                frontmatter,
                has_header: true,
            }
        }
        None => Document {
            title: first_heading(text).unwrap_or_else(|| UNTITLED.to_string()),
            content: text.trim().to_string(),
            frontmatter: Frontmatter::new(),
            has_header: false,
        },
    }
}

/// Split into (header lines, body) when `text` opens with a marker line and a
/// second marker line follows.
fn split_header(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != MARKER {
        return None;
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == MARKER {
            let header = &text[header_start..offset];
            let body = &text[offset + line.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }
    None
}

fn parse_header(header: &str) -> Frontmatter {
    let mut frontmatter = Frontmatter::new();
    for line in header.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, raw)) = line.split_once(':') else {
            tracing::debug!(line, "skipping metadata line without a key");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        frontmatter.insert(key, decode_value(raw.trim()));
    }
    frontmatter
}

fn title_from(frontmatter: &Frontmatter) -> Option<String> {
    match frontmatter.get("title")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First `# heading` outside fenced code.
fn first_heading(text: &str) -> Option<String> {
    let mut in_fence = false;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("# ") {
            let heading = rest.trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
        }
    }
    None
}
