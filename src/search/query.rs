//! Query execution: ranked search, filtered search and title suggestions.

use crate::cache::IndexCache;
use crate::error::Result;
use crate::types::{QueryRequest, SearchResult};
use std::sync::Arc;

/// Executes queries against the cached index.
///
/// Cheap to clone; all clones share one [`IndexCache`].
#[derive(Debug, Clone)]
pub struct QueryEngine {
    cache: Arc<IndexCache>,
}

impl QueryEngine {
    pub const fn new(cache: Arc<IndexCache>) -> Self {
        Self { cache }
    }

    pub const fn cache(&self) -> &Arc<IndexCache> {
        &self.cache
    }

    /// Ranked fuzzy search returning up to `2 × limit` unfiltered candidates.
    ///
    /// The overfetch leaves room for the section and score filters applied by
    /// [`search_filtered`](Self::search_filtered) without a second index pass.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let snapshot = self.cache.get().await?;
        Ok(snapshot.index().search(query, limit.saturating_mul(2)))
    }

    /// Search, then filter by section and minimum confidence, then truncate.
    pub async fn search_filtered(
        &self,
        request: &QueryRequest,
    ) -> Result<Vec<SearchResult>> {
        let candidates = self.search(&request.query, request.limit).await?;
        Ok(apply_filters(candidates, request))
    }

    /// Titles of fuzzy hits that literally contain `query` (case-insensitive).
    pub async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let candidates = self.search(query, limit).await?;
        Ok(suggestions_from(candidates, query, limit))
    }
}

/// Apply the request's filters in order: section, minimum score, limit.
///
/// `min_score` is a confidence (1 best) while result scores are distances
/// (0 best), so a result passes when `score <= 1 - min_score`.
pub fn apply_filters(results: Vec<SearchResult>, request: &QueryRequest) -> Vec<SearchResult> {
    let max_distance = 1.0 - request.min_score;
    results
        .into_iter()
        .filter(|r| {
            request
                .section
                .as_deref()
                .is_none_or(|section| r.item.section == section)
        })
        .filter(|r| request.min_score <= 0.0 || r.score <= max_distance)
        .take(request.limit)
        .collect()
}

/// Keep titles containing `query` as a literal substring, up to `limit`.
pub fn suggestions_from(results: Vec<SearchResult>, query: &str, limit: usize) -> Vec<String> {
    let needle = query.to_lowercase();
    results
        .into_iter()
        .map(|r| r.item.title)
        .filter(|title| title.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SearchableDocument, section_of};
    use assert2::check;
    use rstest::rstest;

    fn result(slug: &str, title: &str, score: f64) -> SearchResult {
        SearchResult {
            item: SearchableDocument {
                title: title.to_string(),
                content: String::new(),
                slug: slug.to_string(),
                section: section_of(slug).to_string(),
                description: None,
                tags: Vec::new(),
            },
            score,
            matches: Vec::new(),
        }
    }

    fn candidates() -> Vec<SearchResult> {
        vec![
            result("a/one", "One", 0.05),
            result("b/two", "Two", 0.10),
            result("a/three", "Three", 0.40),
            result("a/four", "Four", 0.80),
        ]
    }

    fn slugs(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.item.slug.as_str()).collect()
    }

    #[test]
    fn test_section_filter() {
        let request = QueryRequest::new("q").with_section("a");
        let filtered = apply_filters(candidates(), &request);
        check!(slugs(&filtered) == ["a/one", "a/three", "a/four"]);
    }

    #[rstest]
    #[case(0.0, 4)]
    #[case(0.5, 3)]
    #[case(0.85, 2)]
    #[case(0.99, 0)]
    fn test_min_score_inverts_distance(#[case] min_score: f64, #[case] expected: usize) {
        let request = QueryRequest::new("q").with_min_score(min_score);
        check!(apply_filters(candidates(), &request).len() == expected);
    }

    #[test]
    fn test_truncation_happens_after_filters() {
        // Truncating first would keep only "a/one" of section "a".
        let request = QueryRequest::new("q").with_section("a").with_limit(2);
        let filtered = apply_filters(candidates(), &request);
        check!(slugs(&filtered) == ["a/one", "a/three"]);
    }

    #[test]
    fn test_suggestions_require_literal_substring() {
        let results = vec![
            result("a/1", "Focus Techniques", 0.01),
            result("a/2", "Fokus Drills", 0.2),
            result("a/3", "Deep FOCUS", 0.3),
        ];
        check!(suggestions_from(results, "foc", 5) == ["Focus Techniques", "Deep FOCUS"]);
    }

    #[test]
    fn test_suggestions_respect_limit() {
        let results = vec![
            result("a/1", "Focus A", 0.01),
            result("a/2", "Focus B", 0.02),
        ];
        check!(suggestions_from(results, "focus", 1) == ["Focus A"]);
    }
}
