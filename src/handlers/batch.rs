//! Batch search: several queries in one request.

use super::search::SearchHit;
use crate::error::ApiError;
use crate::server::AppState;
use crate::types::QueryRequest;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};

/// Results per query in a batch.
pub const BATCH_LIMIT: usize = 10;

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchRequest {
    pub queries: Vec<String>,
}

impl BatchRequest {
    /// Parse a raw body. Anything other than `{"queries": [string, ...]}` is a client error.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("Rejected batch body: {}", e);
            ApiError::InvalidBatch
        })
    }
}

/// Results of one query in a batch, tagged with the query that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReply {
    pub results: Vec<BatchEntry>,
}

/// Run every query independently, preserving input order.
pub async fn handle_batch(state: &AppState, request: BatchRequest) -> anyhow::Result<BatchReply> {
    let engine = state.engine();
    let mut results = Vec::with_capacity(request.queries.len());

    for query in request.queries {
        let hits = engine
            .search_filtered(&QueryRequest::new(query.as_str()).with_limit(BATCH_LIMIT))
            .await?
            .into_iter()
            .map(SearchHit::from)
            .collect();
        results.push(BatchEntry {
            query,
            results: hits,
        });
    }

    tracing::debug!("Batch search: {} queries", results.len());
    Ok(BatchReply { results })
}

/// `POST /search`
pub async fn batch_search(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BatchReply>, ApiError> {
    let request = BatchRequest::parse(&body)?;
    handle_batch(&state, request)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Batch search failed", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[test]
    fn test_parse_valid() {
        let_assert!(Ok(request) = BatchRequest::parse(br#"{"queries": ["sleep", "focus"]}"#));
        check!(request.queries == ["sleep", "focus"]);
    }

    #[rstest]
    #[case(br#"{"queries": "sleep"}"#.as_slice())]
    #[case(br#"{"queries": [1, 2]}"#.as_slice())]
    #[case(br#"{"other": []}"#.as_slice())]
    #[case(b"not json".as_slice())]
    #[case(b"".as_slice())]
    fn test_parse_rejects_malformed(#[case] body: &[u8]) {
        let_assert!(Err(ApiError::InvalidBatch) = BatchRequest::parse(body));
    }
}
