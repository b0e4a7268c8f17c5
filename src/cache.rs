//! Time-based cache of the derived search index.
//!
//! The index is a disposable projection of the document source. It is rebuilt
//! by whichever request first finds it older than [`CACHE_TTL`]; every other
//! request sees either the previous complete snapshot or the new one, never a
//! partial build. Expiry is purely time-based: corpus edits become visible on
//! the next rebuild.

use crate::clock::Clock;
use crate::error::Result;
use crate::search::{ApproximateMatcher, FieldWeights, Matcher, SearchIndex, project_corpus};
use crate::source::DocumentSource;
use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Age after which the cached index is rebuilt.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A built index and the moment it was built.
#[derive(Debug)]
pub struct IndexSnapshot {
    index: SearchIndex,
    built_at: DateTime<Utc>,
}

impl IndexSnapshot {
    pub const fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub const fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Shared cache of the current [`IndexSnapshot`].
pub struct IndexCache {
    source: Arc<dyn DocumentSource>,
    clock: Arc<dyn Clock>,
    matcher: Arc<dyn Matcher>,
    weights: FieldWeights,
    ttl: TimeDelta,

    /// Current snapshot; replaced by a single pointer swap.
    current: RwLock<Option<Arc<IndexSnapshot>>>,

    /// Held for the duration of a rebuild so only one runs at a time.
    build_lock: Mutex<()>,
}

impl std::fmt::Debug for IndexCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCache")
            .field("ttl", &self.ttl)
            .field("matcher", &self.matcher)
            .field("populated", &self.current.try_read().map(|c| c.is_some()).ok())
            .finish_non_exhaustive()
    }
}

impl IndexCache {
    /// Create an empty cache over `source` using the default matcher and weights.
    pub fn new(source: Arc<dyn DocumentSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            matcher: Arc::new(ApproximateMatcher::default()),
            weights: FieldWeights::default(),
            ttl: TimeDelta::from_std(CACHE_TTL).unwrap_or(TimeDelta::MAX),
            current: RwLock::new(None),
            build_lock: Mutex::new(()),
        }
    }

    /// Swap the fuzzy matching algorithm used for future builds.
    #[must_use]
    pub fn with_matcher(mut self, matcher: Arc<dyn Matcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn source(&self) -> &Arc<dyn DocumentSource> {
        &self.source
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn is_fresh(&self, snapshot: &IndexSnapshot, now: DateTime<Utc>) -> bool {
        now - snapshot.built_at < self.ttl
    }

    /// Get the current index, rebuilding it first if it is missing or stale.
    ///
    /// While another request is rebuilding, a stale snapshot is returned as-is
    /// rather than waiting. If the source fails, the error propagates and the
    /// previous snapshot stays in place.
    pub async fn get(&self) -> Result<Arc<IndexSnapshot>> {
        if let Some(snapshot) = self.current.read().await.as_ref()
            && self.is_fresh(snapshot, self.clock.now())
        {
            tracing::trace!("Search index cache hit");
            return Ok(snapshot.clone());
        }

        let _guard = match self.build_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                if let Some(stale) = self.current.read().await.clone() {
                    tracing::debug!("Index rebuild in progress, serving previous snapshot");
                    return Ok(stale);
                }
                self.build_lock.lock().await
            }
        };

        // Another request may have finished a rebuild while we waited.
        if let Some(snapshot) = self.current.read().await.as_ref()
            && self.is_fresh(snapshot, self.clock.now())
        {
            return Ok(snapshot.clone());
        }

        let snapshot = Arc::new(self.rebuild().await?);
        *self.current.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// The current snapshot, fresh or not, without triggering a rebuild.
    pub async fn peek(&self) -> Option<Arc<IndexSnapshot>> {
        self.current.read().await.clone()
    }

    /// Drop the current snapshot so the next [`get`](Self::get) rebuilds.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
        tracing::debug!("Search index invalidated");
    }

    async fn rebuild(&self) -> Result<IndexSnapshot> {
        let built_at = self.clock.now();
        let start = std::time::Instant::now();

        let corpus = self
            .source
            .list_all_documents()
            .await
            .context("Failed to fetch corpus for search index")?;

        let weights = self.weights;
        let matcher = self.matcher.clone();

        // Projection and norm computation are CPU-bound
        let index = tokio::task::spawn_blocking(move || {
            SearchIndex::build(project_corpus(corpus), weights, matcher)
        })
        .await
        .context("Index build task panicked")?;

        tracing::info!(
            "Built search index: {} documents in {:?}",
            index.len(),
            start.elapsed()
        );

        Ok(IndexSnapshot { index, built_at })
    }
}
