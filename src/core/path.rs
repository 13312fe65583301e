//! Dot/bracket path expressions addressing a location inside a document
//!
//! A path such as `projects[2].title` is a dot-separated list of segments.
//! Every segment except the last may carry a bracketed index that selects a
//! position inside the sequence stored under that key. Paths are parsed up
//! front so a malformed expression is reported instead of fabricating
//! structure in the document.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// Largest sequence index a path may address.
pub const MAX_INDEX: usize = 10_000;

const INDEXED_SEGMENT: &str = r"^([^\[\]]+)\[([^\[\]]*)\]$";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("empty segment at position {position} in `{path}`")]
    EmptySegment { path: String, position: usize },
    #[error("malformed segment `{segment}`")]
    MalformedSegment { segment: String },
    #[error("invalid index `{index}` in segment `{segment}`")]
    InvalidIndex { segment: String, index: String },
    #[error("index {index} in segment `{segment}` exceeds the maximum of {max}", max = MAX_INDEX)]
    IndexTooLarge { segment: String, index: usize },
    #[error("last segment `{segment}` cannot carry an index")]
    IndexedLeaf { segment: String },
    #[error("`{at}` holds {found}, expected {expected}")]
    NotAContainer {
        at: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl PathError {
    fn not_container(at: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        Self::NotAContainer {
            at: at.into(),
            expected,
            found: kind_of(found),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `name`: descend into the mapping stored under `name`
    Key(String),
    /// `name[index]`: descend into position `index` of the sequence under `name`
    Index { key: String, index: usize },
}

impl Segment {
    fn parse(raw: &str) -> Result<Self, PathError> {
        if !raw.contains(['[', ']']) {
            return Ok(Self::Key(raw.to_string()));
        }

        let captures = indexed_segment()
            .captures(raw)
            .ok_or_else(|| PathError::MalformedSegment {
                segment: raw.to_string(),
            })?;
        let key = &captures[1];
        let digits = &captures[2];

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::InvalidIndex {
                segment: raw.to_string(),
                index: digits.to_string(),
            });
        }

        let index = digits.parse::<usize>().unwrap_or(usize::MAX);
        if index > MAX_INDEX {
            return Err(PathError::IndexTooLarge {
                segment: raw.to_string(),
                index,
            });
        }

        Ok(Self::Index {
            key: key.to_string(),
            index,
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index { key, index } => write!(f, "{key}[{index}]"),
        }
    }
}

fn indexed_segment() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(INDEXED_SEGMENT).expect("segment pattern compiles"))
}

/// A validated path: the containers to walk through plus the key to assign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    parents: Vec<Segment>,
    leaf: String,
}

impl Path {
    /// Parse a dot/bracket path expression
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, part) in raw.split('.').enumerate() {
            if part.is_empty() {
                return Err(PathError::EmptySegment {
                    path: raw.to_string(),
                    position,
                });
            }
            segments.push(Segment::parse(part)?);
        }

        let leaf = match segments.pop() {
            Some(Segment::Key(key)) => key,
            Some(indexed @ Segment::Index { .. }) => {
                return Err(PathError::IndexedLeaf {
                    segment: indexed.to_string(),
                })
            }
            None => return Err(PathError::Empty),
        };

        Ok(Self {
            parents: segments,
            leaf,
        })
    }

    pub fn parents(&self) -> &[Segment] {
        &self.parents
    }

    pub fn leaf(&self) -> &str {
        &self.leaf
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.parents {
            write!(f, "{segment}.")?;
        }
        f.write_str(&self.leaf)
    }
}

/// Read the value stored at `path`, if every step of it exists
pub fn get_at_path<'a>(root: &'a Map<String, Value>, path: &Path) -> Option<&'a Value> {
    let mut map = root;
    for segment in &path.parents {
        let next = match segment {
            Segment::Key(key) => map.get(key)?,
            Segment::Index { key, index } => map.get(key)?.get(*index)?,
        };
        map = next.as_object()?;
    }
    map.get(&path.leaf)
}

/// Write `value` at `path`, creating missing mappings and sequences on the way
///
/// Absent or `null` intermediates are replaced by the container the path
/// needs; sequences are padded with empty mappings up to the addressed
/// position. If a scalar sits where a container is required the document is
/// left untouched and [`PathError::NotAContainer`] is returned.
pub fn set_at_path(
    root: &mut Map<String, Value>,
    path: &Path,
    value: Value,
) -> Result<(), PathError> {
    ensure_writable(root, path)?;

    let mut map = root;
    for segment in &path.parents {
        map = match segment {
            Segment::Key(key) => descend_mapping(map, key)?,
            Segment::Index { key, index } => descend_indexed(map, key, *index)?,
        };
    }
    map.insert(path.leaf.clone(), value);
    Ok(())
}

/// Walk the existing part of `path` without creating anything, so a write
/// that would fail halfway never leaves partial structure behind.
fn ensure_writable(root: &Map<String, Value>, path: &Path) -> Result<(), PathError> {
    let mut map = root;
    for segment in &path.parents {
        let next = match segment {
            Segment::Key(key) => map.get(key),
            Segment::Index { key, index } => match map.get(key) {
                None | Some(Value::Null) => None,
                Some(Value::Array(items)) => items.get(*index),
                Some(other) => return Err(PathError::not_container(key, "a sequence", other)),
            },
        };
        map = match next {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                return Err(PathError::not_container(
                    segment.to_string(),
                    "a mapping",
                    other,
                ))
            }
        };
    }
    Ok(())
}

fn descend_mapping<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Map<String, Value>, PathError> {
    let slot = map.entry(key.to_string()).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(inner) => Ok(inner),
        other => Err(PathError::not_container(key, "a mapping", other)),
    }
}

fn descend_indexed<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
    index: usize,
) -> Result<&'a mut Map<String, Value>, PathError> {
    let slot = map.entry(key.to_string()).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    let items = match slot {
        Value::Array(items) => items,
        other => return Err(PathError::not_container(key, "a sequence", other)),
    };

    if items.len() <= index {
        items.resize_with(index + 1, || Value::Object(Map::new()));
    }
    let item = &mut items[index];
    if item.is_null() {
        *item = Value::Object(Map::new());
    }
    match item {
        Value::Object(inner) => Ok(inner),
        other => Err(PathError::not_container(
            format!("{key}[{index}]"),
            "a mapping",
            other,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn set(root: &mut Map<String, Value>, path: &str, value: Value) -> Result<(), PathError> {
        set_at_path(root, &Path::parse(path)?, value)
    }

    #[test]
    fn test_parse_plain_and_indexed_segments() {
        let path = Path::parse("projects[2].links.github").unwrap();
        assert_eq!(
            path.parents(),
            &[
                Segment::Index {
                    key: "projects".to_string(),
                    index: 2
                },
                Segment::Key("links".to_string()),
            ]
        );
        assert_eq!(path.leaf(), "github");
        assert_eq!(path.to_string(), "projects[2].links.github");
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
        assert!(matches!(
            Path::parse("a..b"),
            Err(PathError::EmptySegment { position: 1, .. })
        ));
        assert!(matches!(
            Path::parse("skills[x].name"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            Path::parse("skills[-1].name"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            Path::parse("skills[].name"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            Path::parse("skills[1.name"),
            Err(PathError::MalformedSegment { .. })
        ));
        assert!(matches!(
            Path::parse("skills[1]x.name"),
            Err(PathError::MalformedSegment { .. })
        ));
        assert!(matches!(
            Path::parse("[1].name"),
            Err(PathError::MalformedSegment { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_indexed_leaf() {
        assert_eq!(
            Path::parse("about[0]"),
            Err(PathError::IndexedLeaf {
                segment: "about[0]".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_huge_index() {
        assert!(matches!(
            Path::parse("projects[10001].title"),
            Err(PathError::IndexTooLarge { index: 10_001, .. })
        ));
        assert!(matches!(
            Path::parse("projects[99999999999999999999999].title"),
            Err(PathError::IndexTooLarge { .. })
        ));
        assert!(Path::parse("projects[10000].title").is_ok());
    }

    #[test]
    fn test_set_into_existing_sequence() {
        let mut doc = object(json!({ "name": "Ada", "skills": [] }));
        set(&mut doc, "skills[0].name", json!("Rust")).unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({ "name": "Ada", "skills": [{ "name": "Rust" }] })
        );
    }

    #[test]
    fn test_set_pads_sequence_with_empty_mappings() {
        let mut doc = Map::new();
        set(&mut doc, "projects[2].title", json!("Compiler")).unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({ "projects": [{}, {}, { "title": "Compiler" }] })
        );
    }

    #[test]
    fn test_set_creates_only_minimal_structure() {
        let mut doc = Map::new();
        set(&mut doc, "logo.image", json!("data:image/png;base64,AA==")).unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({ "logo": { "image": "data:image/png;base64,AA==" } })
        );
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let mut doc = object(json!({ "education": [{ "institution": "MIT" }] }));
        let cases = [
            ("name", json!("Grace")),
            ("education[0].dates", json!("1928-1934")),
            ("education[3].link", json!("https://example.com")),
            ("skills[1].level", json!(85)),
            ("socials.primary.url", json!("https://github.com")),
        ];
        for (raw, value) in cases {
            let path = Path::parse(raw).unwrap();
            set_at_path(&mut doc, &path, value.clone()).unwrap();
            assert_eq!(get_at_path(&doc, &path), Some(&value), "path {raw}");
        }
        assert_eq!(doc["education"][0]["institution"], json!("MIT"));
    }

    #[test]
    fn test_set_replaces_null_intermediates() {
        let mut doc = object(json!({ "logo": null, "projects": [null] }));
        set(&mut doc, "logo.text", json!("AL")).unwrap();
        set(&mut doc, "projects[0].title", json!("Engine")).unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({ "logo": { "text": "AL" }, "projects": [{ "title": "Engine" }] })
        );
    }

    #[test]
    fn test_set_through_scalar_fails_without_changes() {
        let original = object(json!({ "name": "Ada", "skills": "none" }));

        let mut doc = original.clone();
        let err = set(&mut doc, "name.first", json!("A")).unwrap_err();
        assert!(matches!(err, PathError::NotAContainer { expected: "a mapping", .. }));
        assert_eq!(doc, original);

        let err = set(&mut doc, "skills[0].name", json!("Rust")).unwrap_err();
        assert!(matches!(err, PathError::NotAContainer { expected: "a sequence", .. }));
        assert_eq!(doc, original);
    }

    #[test]
    fn test_failed_deep_write_leaves_no_partial_structure() {
        let original = object(json!({ "projects": [{ "meta": 3 }] }));
        let mut doc = original.clone();
        let err = set(&mut doc, "projects[0].meta.owner.name", json!("x")).unwrap_err();
        assert_eq!(
            err,
            PathError::NotAContainer {
                at: "meta".to_string(),
                expected: "a mapping",
                found: "a number",
            }
        );
        assert_eq!(doc, original);
    }

    #[test]
    fn test_get_missing_path() {
        let doc = object(json!({ "skills": [{ "name": "Rust" }] }));
        assert_eq!(get_at_path(&doc, &Path::parse("skills[4].name").unwrap()), None);
        assert_eq!(get_at_path(&doc, &Path::parse("skills[0].level").unwrap()), None);
        assert_eq!(get_at_path(&doc, &Path::parse("bio.short").unwrap()), None);
    }
}
