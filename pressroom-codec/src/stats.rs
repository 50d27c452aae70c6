//! Body statistics: word count and reading time.
//!
//! Both operate on the Markdown body only, never on a serialized document.

use std::sync::OnceLock;

use regex::Regex;

/// Reading speed used by [`reading_time_minutes`].
pub const WORDS_PER_MINUTE: usize = 200;

struct Patterns {
    fenced_code: Regex,
    inline_code: Regex,
    image: Regex,
    link: Regex,
    block_marker: Regex,
    emphasis: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        fenced_code: Regex::new(r"(?s)```.*?```|~~~.*?~~~").unwrap(),
        inline_code: Regex::new(r"`[^`\n]*`").unwrap(),
        image: Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap(),
        // Keep the link text, drop the target.
        link: Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap(),
        // Headings, blockquotes, list bullets.
        block_marker: Regex::new(r"(?m)^[ \t]*(?:#{1,6}|>+|[-+*]|\d+[.)])[ \t]+").unwrap(),
        emphasis: Regex::new(r"[*_~]+").unwrap(),
    })
}

/// Count words in a Markdown body, ignoring code and markup syntax.
pub fn word_count(body: &str) -> usize {
    let p = patterns();
    let text = p.fenced_code.replace_all(body, " ");
    let text = p.inline_code.replace_all(&text, " ");
    let text = p.image.replace_all(&text, " ");
    let text = p.link.replace_all(&text, "$1");
    let text = p.block_marker.replace_all(&text, "");
    let text = p.emphasis.replace_all(&text, "");
    text.split_whitespace().count()
}

/// `ceil(word_count / 200)` minutes; an empty body reads in 0 minutes.
pub fn reading_time_minutes(body: &str) -> usize {
    word_count(body).div_ceil(WORDS_PER_MINUTE)
}
