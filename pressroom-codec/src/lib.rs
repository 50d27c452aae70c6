//! # pressroom-codec
//!
//! Markdown-with-metadata codec: a `---` delimited `key: value` header
//! followed by the raw body.
//!
//! ```rust
//! use pressroom_codec::{parse, serialize, Frontmatter};
//!
//! let mut meta = Frontmatter::new();
//! meta.insert("draft", false);
//! let text = serialize("Hello", "Body text.", Some(&meta));
//! let doc = parse(&text);
//! assert_eq!(doc.title, "Hello");
//! assert_eq!(doc.content, "Body text.");
//! ```
//!
//! Codec functions never fail: unreadable header lines are skipped.

pub mod document;
pub mod frontmatter;
pub mod stats;

pub use document::{parse, serialize, Document, MARKER, UNTITLED};
pub use frontmatter::Frontmatter;
pub use stats::{reading_time_minutes, word_count, WORDS_PER_MINUTE};
