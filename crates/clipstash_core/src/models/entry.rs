//! Clipboard entry model and the filter pair that parameterizes queries.

use crate::text::{contains_ascii_case_insensitive, normalize_optional_nonempty};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned entry identifier. Monotonically increasing, never reused.
pub type EntryId = u64;

/// Content classification tag for a capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Text,
}

impl EntryKind {
    /// Stable lowercase tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
        }
    }
}

/// A single stored clipboard capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub content: String,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Entry {
    /// Build a fresh text entry. Only the store assigns ids and timestamps.
    pub(crate) fn new_text(id: EntryId, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            kind: EntryKind::Text,
            created_at,
            is_favorite: false,
        }
    }

    /// Copy of this entry with the favorite flag flipped.
    pub fn with_favorite_toggled(&self) -> Self {
        Self {
            is_favorite: !self.is_favorite,
            ..self.clone()
        }
    }
}

/// Search text and favorites toggle applied store-side.
///
/// A change to either field invalidates every materialized page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters {
    pub search_query: String,
    pub favorites_only: bool,
}

impl Filters {
    pub fn new(search_query: impl Into<String>, favorites_only: bool) -> Self {
        Self {
            search_query: search_query.into(),
            favorites_only,
        }
    }

    /// Trimmed search needle, or `None` when the search box is blank.
    pub fn search_needle(&self) -> Option<&str> {
        normalize_optional_nonempty(Some(self.search_query.as_str()))
    }

    /// Return `true` when `entry` belongs to the result set described by these filters.
    ///
    /// Both filters combine with AND semantics; each only applies when active.
    pub fn matches(&self, entry: &Entry) -> bool {
        if self.favorites_only && !entry.is_favorite {
            return false;
        }
        match self.search_needle() {
            Some(needle) => contains_ascii_case_insensitive(&entry.content, needle),
            None => true,
        }
    }
}
