//! Corpus-wide metadata: sections and stats.
//!
//! Both read the document source directly rather than the cached index, so
//! they always reflect the current corpus.

use crate::error::ApiError;
use crate::server::AppState;
use crate::source::{corpus_len, corpus_sections};
use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionsReply {
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStats {
    pub total_docs: usize,
    pub indexed_sections: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReply {
    pub stats: CorpusStats,
}

pub async fn handle_sections(state: &AppState) -> anyhow::Result<SectionsReply> {
    let corpus = state.source().list_all_documents().await?;
    Ok(SectionsReply {
        sections: corpus_sections(&corpus),
    })
}

pub async fn handle_stats(state: &AppState) -> anyhow::Result<StatsReply> {
    let corpus = state.source().list_all_documents().await?;
    Ok(StatsReply {
        stats: CorpusStats {
            total_docs: corpus_len(&corpus),
            indexed_sections: corpus_sections(&corpus),
            last_updated: state.clock().now(),
        },
    })
}

/// `GET /search/sections`
pub async fn sections(State(state): State<AppState>) -> Result<Json<SectionsReply>, ApiError> {
    handle_sections(&state)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to get sections", e))
}

/// `GET /search/stats`
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsReply>, ApiError> {
    handle_stats(&state)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to get search stats", e))
}
