//! HTTP server: shared application state and the axum router.

use crate::cache::IndexCache;
use crate::clock::Clock;
use crate::handlers;
use crate::search::QueryEngine;
use crate::source::DocumentSource;
use axum::Router;
use axum::routing::get;
use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;

/// State shared by every request handler.
///
/// Cheap to clone; all clones share one index cache.
#[derive(Clone)]
pub struct AppState {
    engine: QueryEngine,
    source: Arc<dyn DocumentSource>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(source: Arc<dyn DocumentSource>, clock: Arc<dyn Clock>) -> Self {
        let cache = IndexCache::new(source.clone(), clock.clone());
        Self::with_cache(Arc::new(cache))
    }

    /// Build state around an existing cache, reusing its source and clock.
    pub fn with_cache(cache: Arc<IndexCache>) -> Self {
        Self {
            source: cache.source().clone(),
            clock: cache.clock().clone(),
            engine: QueryEngine::new(cache),
        }
    }

    pub const fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn source(&self) -> &Arc<dyn DocumentSource> {
        &self.source
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

/// Routes of the search API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/search",
            get(handlers::search).post(handlers::batch_search),
        )
        .route("/search/sections", get(handlers::sections))
        .route("/search/stats", get(handlers::stats))
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
