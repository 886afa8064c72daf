//! Parsed notation document: tag pairs plus raw move text.

use std::collections::HashMap;

/// Tags that every document must carry before any later stage may use it.
pub const REQUIRED_TAGS: [&str; 5] = ["Event", "Site", "Date", "White", "Black"];

/// Metadata tags and the raw move text of a single game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameDocument {
    tags: HashMap<String, String>,
    movetext: String,
}

impl GameDocument {
    /// Creates a document from already extracted parts.
    pub fn new(tags: HashMap<String, String>, movetext: impl Into<String>) -> Self {
        Self {
            tags,
            movetext: movetext.into(),
        }
    }

    /// Returns the value of a tag, if present.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// All tag pairs, in no particular order.
    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// The `White` tag value, or an empty string when absent.
    pub fn white(&self) -> &str {
        self.tag("White").unwrap_or("")
    }

    /// The `Black` tag value, or an empty string when absent.
    pub fn black(&self) -> &str {
        self.tag("Black").unwrap_or("")
    }

    /// Move text with all tag lines removed, lines joined by single spaces.
    pub fn movetext(&self) -> &str {
        &self.movetext
    }

    /// Required tags that are absent, in canonical order.
    pub fn missing_required_tags(&self) -> Vec<&'static str> {
        REQUIRED_TAGS
            .iter()
            .copied()
            .filter(|key| !self.tags.contains_key(*key))
            .collect()
    }
}
