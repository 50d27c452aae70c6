//! Ordered metadata map and its one-line-per-key text form.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Insertion-ordered key/value metadata.
///
/// Re-inserting an existing key replaces the value in place, so the header
/// keeps the position of the first write and the value of the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(Value::String(key.into()), value.into())
    }

    /// Insert `raw` decoded the same way a header line's value is.
    pub fn insert_parsed(&mut self, key: impl Into<String>, raw: &str) -> Option<Value> {
        self.insert(key, decode_value(raw.trim()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Merge `other` into `self`; keys from `other` win.
    pub fn merge(&mut self, other: &Frontmatter) {
        for (key, value) in other.0.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Entries with string keys, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter_map(|(k, v)| k.as_str().map(|key| (key, v)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Line encoding
// ---------------------------------------------------------------------------

/// Keys are written verbatim, so anything that would confuse the line parser
/// is rejected.
pub(crate) fn is_writable_key(key: &str) -> bool {
    !key.is_empty()
        && key.trim() == key
        && !key.starts_with('#')
        && !key.contains(':')
        && !key.contains('\n')
        && !key.contains('\r')
}

/// Render a value as a single-line YAML scalar or JSON flow collection.
///
/// Strings stay bare only when a YAML reader would hand back the exact same
/// string; everything else is a double-quoted scalar with escapes.
pub(crate) fn encode_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if reads_back_plain(s) => s.clone(),
        Value::String(s) => quote(s),
        Value::Tagged(tagged) => encode_value(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => match serde_json::to_string(value) {
            Ok(flow) => flow,
            Err(err) => {
                tracing::warn!(error = %err, "metadata value has no JSON form; storing as text");
                quote(serde_yaml::to_string(value).unwrap_or_default().trim_end())
            }
        },
    }
}

/// Decode the text after `key:`.
///
/// Scalars decode to their YAML type; flow collections only when the text is
/// explicitly bracketed; anything else is kept as the literal string.
pub(crate) fn decode_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Mapping(m)) if raw.starts_with('{') => Value::Mapping(m),
        Ok(Value::Sequence(s)) if raw.starts_with('[') => Value::Sequence(s),
        Ok(Value::Null) if matches!(raw, "null" | "Null" | "NULL" | "~") => Value::Null,
        Ok(v @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => v,
        _ => Value::String(raw.to_string()),
    }
}

fn reads_back_plain(s: &str) -> bool {
    if s.is_empty() || s.trim() != s || s.chars().any(|c| c == '\t' || needs_escape(c)) {
        return false;
    }
    matches!(serde_yaml::from_str::<Value>(s), Ok(Value::String(ref back)) if back == s)
}

/// Characters a YAML reader would reject, fold or strip inside a quoted
/// scalar: C0 and C1 controls, DEL, line and paragraph separators, BOM and
/// the two BMP noncharacters.
fn needs_escape(c: char) -> bool {
    matches!(
        c as u32,
        0x00..=0x1F | 0x7F..=0x9F | 0x2028 | 0x2029 | 0xFEFF | 0xFFFE | 0xFFFF
    )
}

/// Double-quoted YAML scalar that stays on one line.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if needs_escape(c) => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn reinsert_keeps_position_and_takes_new_value() {
        let mut fm = Frontmatter::new();
        fm.insert("title", "a");
        fm.insert("slug", "b");
        fm.insert("title", "c");
        let keys: Vec<&str> = fm.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["title", "slug"]);
        assert_eq!(fm.get_str("title"), Some("c"));
    }

    #[test]
    fn insert_parsed_decodes_scalars() {
        let mut fm = Frontmatter::new();
        fm.insert_parsed("featured", "true");
        fm.insert_parsed("order", " 3 ");
        fm.insert_parsed("author", "Ada");
        assert_eq!(fm.get("featured"), Some(&Value::Bool(true)));
        assert_eq!(fm.get("order"), Some(&Value::from(3)));
        assert_eq!(fm.get_str("author"), Some("Ada"));
    }

    #[test]
    fn merge_lets_other_win() {
        let mut base = Frontmatter::new();
        base.insert("draft", true);
        base.insert("slug", "x");
        let mut custom = Frontmatter::new();
        custom.insert("draft", false);
        base.merge(&custom);
        assert_eq!(base.get("draft"), Some(&Value::Bool(false)));
        assert_eq!(base.len(), 2);
    }

    #[rstest]
    #[case(Value::from("hello world"), "hello world")]
    #[case(Value::from("2024-05-01T10:00:00.000Z"), "2024-05-01T10:00:00.000Z")]
    #[case(Value::from("true"), "\"true\"")]
    #[case(Value::from("42"), "\"42\"")]
    #[case(Value::from("---"), "\"---\"")]
    #[case(Value::from(""), "\"\"")]
    #[case(Value::from("a: b"), "\"a: b\"")]
    #[case(Value::from("line\nbreak"), "\"line\\nbreak\"")]
    #[case(Value::from("a\u{85}b"), "\"a\\u0085b\"")]
    #[case(Value::from("del\u{7f}"), "\"del\\u007F\"")]
    #[case(Value::from("tab\there"), "\"tab\\there\"")]
    #[case(Value::from(false), "false")]
    #[case(Value::from(7), "7")]
    #[case(Value::Null, "null")]
    fn encodes_scalars(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(encode_value(&value), expected);
    }

    #[rstest]
    #[case(Value::from("hello world"))]
    #[case(Value::from("true"))]
    #[case(Value::from("# not a comment"))]
    #[case(Value::from("  padded  "))]
    #[case(Value::from("quote \" and \\ backslash"))]
    #[case(Value::from("a\u{85}b"))]
    #[case(Value::from("x\u{80}y"))]
    #[case(Value::from("del\u{7f}"))]
    #[case(Value::from("bell\u{7}\u{0}"))]
    #[case(Value::from("sep\u{2028}par\u{2029}"))]
    #[case(Value::from("\u{feff}bom"))]
    #[case(Value::from("cr\r\nlf"))]
    #[case(Value::from(3.5))]
    #[case(Value::from(true))]
    fn decode_inverts_encode(#[case] value: Value) {
        assert_eq!(decode_value(&encode_value(&value)), value);
    }

    #[test]
    fn collections_round_trip_as_json_flow() {
        let tags: Value = serde_yaml::from_str("[rust, cms]").unwrap();
        let encoded = encode_value(&tags);
        assert_eq!(encoded, r#"["rust","cms"]"#);
        assert_eq!(decode_value(&encoded), tags);
    }

    #[rstest]
    #[case("Hello: World")]
    #[case("- item")]
    #[case("# heading")]
    #[case("!custom tag")]
    fn ambiguous_unquoted_text_stays_a_string(#[case] raw: &str) {
        assert_eq!(decode_value(raw), Value::String(raw.to_string()));
    }

    #[rstest]
    #[case("")]
    #[case("a:b")]
    #[case(" lead")]
    #[case("#hash")]
    #[case("two\nlines")]
    fn rejects_unwritable_keys(#[case] key: &str) {
        assert!(!is_writable_key(key));
    }
}
