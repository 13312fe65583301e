//! The portfolio document
//!
//! The document is an untyped JSON mapping. Widgets address fields with
//! path expressions (see [`crate::core::path`]) and readers fall back to
//! defaults for anything that is missing.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::path::{get_at_path, set_at_path, Path, PathError};

/// Key holding the "this snapshot was shared" flag
pub const SHARED_FLAG: &str = "isShared";
/// Key holding the RFC 3339 timestamp of the last share
pub const SHARE_DATE: &str = "shareDate";

/// Portfolio content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in sample content shown before anything has been saved
    pub fn sample() -> Self {
        let value = json!({
            "name": "Your Name",
            "title": "Frontend Developer & UI/UX Designer",
            "email": "hello@yourname.com",
            "location": "New York, USA",
            "about": [
                "I'm a passionate developer who enjoys building fast, reliable and friendly software.",
                "I have worked with startups and established companies to bring their ideas to life.",
                "When I'm not coding you can find me hiking, reading science fiction or trying out new tools.",
            ],
            "skills": [
                { "name": "Rust", "level": 90 },
                { "name": "TypeScript", "level": 80 },
                { "name": "UI/UX Design", "level": 70 },
            ],
            "socialLinks": [
                { "type": "github", "url": "https://github.com" },
                { "type": "linkedin", "url": "https://linkedin.com" },
            ],
            "education": [
                {
                    "institution": "Columbia University",
                    "dates": "2015-2019",
                    "qualification": "Bachelor of Science in Computer Science",
                    "link": "",
                    "type": "education",
                },
                {
                    "institution": "freeCodeCamp",
                    "dates": "2021",
                    "qualification": "Responsive Web Design Certification",
                    "link": "https://www.freecodecamp.org/certification/example",
                    "type": "certification",
                },
            ],
            "projects": [
                {
                    "title": "Portfolio Editor",
                    "description": "An editable portfolio that publishes itself to GitHub.",
                    "image": "",
                    "tags": ["Rust", "egui"],
                    "link": "https://github.com",
                },
            ],
        });
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::new(),
        }
    }

    /// Parse a document from its JSON form; the top level must be a mapping
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Serialize the document as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Read the value at `path`
    pub fn get(&self, path: &str) -> Result<Option<&Value>, PathError> {
        let path = Path::parse(path)?;
        Ok(get_at_path(&self.fields, &path))
    }

    /// Write `value` at `path`, creating missing containers
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), PathError> {
        let path = Path::parse(path)?;
        set_at_path(&mut self.fields, &path, value.into())
    }

    /// Text at `path`, or `default` when the field is missing or not text
    pub fn str_or(&self, path: &str, default: &str) -> String {
        match self.get(path) {
            Ok(Some(Value::String(text))) => text.clone(),
            Ok(Some(Value::Number(number))) => number.to_string(),
            _ => default.to_string(),
        }
    }

    /// Integer at `path`, or `default`
    pub fn int_or(&self, path: &str, default: i64) -> i64 {
        match self.get(path) {
            Ok(Some(Value::Number(number))) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f.round() as i64))
                .unwrap_or(default),
            Ok(Some(Value::String(text))) => text.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Items of the top-level sequence under `key`; empty when absent
    pub fn entries(&self, key: &str) -> &[Value] {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace the top-level sequence under `key`
    pub fn replace_entries(&mut self, key: &str, entries: Vec<Value>) {
        self.fields.insert(key.to_string(), Value::Array(entries));
    }

    /// Append an item to the top-level sequence under `key`
    pub fn push_entry(&mut self, key: &str, entry: Value) {
        let mut entries = self.entries(key).to_vec();
        entries.push(entry);
        self.replace_entries(key, entries);
    }

    /// Remove the item at `index` from the sequence under `key`
    pub fn remove_entry(&mut self, key: &str, index: usize) -> Option<Value> {
        let entries = self.fields.get_mut(key)?.as_array_mut()?;
        (index < entries.len()).then(|| entries.remove(index))
    }

    /// Mark the document as a shared snapshot taken at `at`
    pub fn stamp_shared(&mut self, at: DateTime<Utc>) {
        self.fields.insert(SHARED_FLAG.to_string(), Value::Bool(true));
        self.fields.insert(
            SHARE_DATE.to_string(),
            Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
    }

    /// When the snapshot was shared, if it carries a valid share date
    pub fn share_date(&self) -> Option<DateTime<FixedOffset>> {
        self.fields
            .get(SHARE_DATE)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }

    pub fn is_shared(&self) -> bool {
        self.fields
            .get(SHARED_FLAG)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// First word of the name, used as the default text logo
    pub fn first_name(&self) -> String {
        let name = self.str_or("name", "");
        name.split_whitespace()
            .next()
            .unwrap_or("Portfolio")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_document_is_empty_mapping() {
        let doc = Document::new();
        assert_eq!(doc.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_json_round_trip() {
        let doc = Document::sample();
        let restored = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_from_json_rejects_non_mapping() {
        assert!(Document::from_json("[1, 2, 3]").is_err());
        assert!(Document::from_json("\"text\"").is_err());
    }

    #[test]
    fn test_set_and_read_back() {
        let mut doc = Document::new();
        doc.set("projects[1].title", "Compiler").unwrap();
        doc.set("skills[0].level", 75).unwrap();

        assert_eq!(doc.entries("projects").len(), 2);
        assert_eq!(doc.str_or("projects[1].title", "Untitled"), "Compiler");
        assert_eq!(doc.str_or("projects[0].title", "Untitled"), "Untitled");
        assert_eq!(doc.int_or("skills[0].level", 0), 75);
    }

    #[test]
    fn test_fallbacks_for_missing_fields() {
        let doc = Document::new();
        assert_eq!(doc.str_or("name", "Your Name"), "Your Name");
        assert_eq!(doc.int_or("skills[0].level", 50), 50);
        assert!(doc.entries("education").is_empty());
        assert_eq!(doc.first_name(), "Portfolio");
    }

    #[test]
    fn test_entry_editing() {
        let mut doc = Document::sample();
        let before = doc.entries("skills").len();

        doc.push_entry("skills", json!({ "name": "Go", "level": 40 }));
        assert_eq!(doc.entries("skills").len(), before + 1);

        let removed = doc.remove_entry("skills", 0).unwrap();
        assert_eq!(removed["name"], json!("Rust"));
        assert_eq!(doc.entries("skills").len(), before);
        assert_eq!(doc.remove_entry("skills", 99), None);
        assert_eq!(doc.remove_entry("missing", 0), None);
    }

    #[test]
    fn test_stamp_shared() {
        let mut doc = Document::sample();
        assert!(!doc.is_shared());

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        doc.stamp_shared(at);

        assert!(doc.is_shared());
        assert_eq!(doc.str_or(SHARE_DATE, ""), "2024-03-01T12:30:00.000Z");
        assert_eq!(doc.share_date().unwrap(), at);
    }
}
