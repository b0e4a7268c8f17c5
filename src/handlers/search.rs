//! Single-query search and suggestions.

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{DEFAULT_LIMIT, MatchSpan, QueryRequest, SearchResult};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Serialize;

/// Query-string parameters of `GET /search`.
///
/// Everything arrives as text and is parsed leniently: a malformed `limit` or
/// `minScore` falls back to its default instead of failing the request.
#[derive(Debug, Default, Clone)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub section: Option<String>,
    pub suggestions: Option<String>,
    pub min_score: Option<String>,
}

impl SearchParams {
    /// Collect decoded query-string pairs. When a key repeats, its first value wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut params.q,
                "limit" => &mut params.limit,
                "section" => &mut params.section,
                "suggestions" => &mut params.suggestions,
                "minScore" => &mut params.min_score,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }

    /// Validate and convert into a [`QueryRequest`]. A missing or empty `q` is rejected.
    pub fn into_request(self) -> Result<QueryRequest, ApiError> {
        let query = self
            .q
            .filter(|q| !q.is_empty())
            .ok_or(ApiError::MissingQuery)?;

        Ok(QueryRequest {
            query,
            limit: self.limit.as_deref().map_or(DEFAULT_LIMIT, parse_limit),
            section: self.section.filter(|s| !s.is_empty()),
            min_score: self.min_score.as_deref().map_or(0.0, parse_min_score),
            suggestions_only: self.suggestions.as_deref() == Some("true"),
        })
    }
}

fn parse_limit(raw: &str) -> usize {
    raw.trim().parse().unwrap_or(DEFAULT_LIMIT)
}

fn parse_min_score(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// One result as returned to clients. The document body is never included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub slug: String,
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub score: f64,
    pub matches: Vec<MatchSpan>,
}

impl From<SearchResult> for SearchHit {
    fn from(result: SearchResult) -> Self {
        let item = result.item;
        Self {
            title: item.title,
            slug: item.slug,
            section: item.section,
            description: item.description,
            score: result.score,
            matches: result.matches,
        }
    }
}

/// Response body of `GET /search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchReply {
    Results { results: Vec<SearchHit>, total: usize },
    Suggestions { suggestions: Vec<String> },
}

/// Run one validated query.
pub async fn handle_search(state: &AppState, request: &QueryRequest) -> anyhow::Result<SearchReply> {
    let engine = state.engine();

    if request.suggestions_only {
        let suggestions = engine.suggest(&request.query, request.limit).await?;
        tracing::debug!(
            "Suggestions for '{}': {} titles",
            request.query,
            suggestions.len()
        );
        return Ok(SearchReply::Suggestions { suggestions });
    }

    let results: Vec<SearchHit> = engine
        .search_filtered(request)
        .await?
        .into_iter()
        .map(SearchHit::from)
        .collect();

    tracing::debug!("Search '{}': {} results", request.query, results.len());

    Ok(SearchReply::Results {
        total: results.len(),
        results,
    })
}

/// `GET /search`
///
/// The query string is taken as raw pairs so repeated keys never reject the
/// request before it reaches [`SearchParams::into_request`].
pub async fn search(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<SearchReply>, ApiError> {
    let pairs = pairs.map_or_else(
        |rejection| {
            tracing::debug!("Unreadable query string: {}", rejection);
            Vec::new()
        },
        |Query(pairs)| pairs,
    );
    let request = SearchParams::from_pairs(pairs).into_request()?;
    handle_search(&state, &request)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Search failed", e))
}
