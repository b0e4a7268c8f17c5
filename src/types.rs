//! Search-facing data model shared by the index, query engine and HTTP boundary.

use serde::{Deserialize, Serialize};

/// Section assigned to documents whose slug has no leading path segment.
pub const DEFAULT_SECTION: &str = "general";

/// Title assigned to documents whose metadata carries none.
pub const UNTITLED: &str = "Untitled";

/// Default number of results for a single query.
pub const DEFAULT_LIMIT: usize = 10;

/// A flattened, search-ready projection of one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchableDocument {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Derive the facet section of a slug: its first path segment, or `"general"`.
pub fn section_of(slug: &str) -> &str {
    slug.split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_SECTION)
}

/// A searchable field of [`SearchableDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Description,
    Content,
    Tags,
}

/// Which field (and which array element, for `tags`) matched, and where.
///
/// `indices` are inclusive `[start, end]` character offsets into `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSpan {
    pub key: Field,
    /// Matched field text. Never populated for `content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub indices: Vec<[usize; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_index: Option<usize>,
}

/// One ranked hit: `score` is a distance, 0 is a perfect match and 1 the worst.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub item: SearchableDocument,
    pub score: f64,
    pub matches: Vec<MatchSpan>,
}

/// A single query with its optional filters.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub query: String,
    pub limit: usize,
    pub section: Option<String>,
    /// Caller-side confidence in `0..=1`; 0 disables the filter.
    pub min_score: f64,
    pub suggestions_only: bool,
}

impl QueryRequest {
    /// A plain query with default limit and no filters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
            section: None,
            min_score: 0.0,
            suggestions_only: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }
}
