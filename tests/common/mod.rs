//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Every test builds its own [`AppState`] over a [`CountingSource`] and a
//! [`ManualClock`], so cache state never leaks between tests and expiry is
//! driven explicitly instead of by sleeping.
//!
//! # Available Fixtures
//!
//! - `hub`: the three-document corpus behind the documented examples
//! - `empty_hub`: a corpus with no documents

#![allow(dead_code)] // Helpers used across different integration test crates

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::FutureExt;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use hub_search::clock::ManualClock;
use hub_search::source::{Corpus, DocumentSource, RawDocument, StaticSource};
use hub_search::{AppState, router};
use rstest::fixture;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};
use tower::ServiceExt;

/// A document source that counts how often it is asked for the corpus.
///
/// The corpus can be replaced mid-test, and the source can be told to fail.
/// A closed gate holds every fetch until [`open_gate`](Self::open_gate).
#[derive(Debug)]
pub struct CountingSource {
    corpus: Mutex<Corpus>,
    calls: AtomicUsize,
    failing: AtomicBool,
    gated: AtomicBool,
    gate: Semaphore,
    entered: Notify,
}

impl CountingSource {
    pub fn new(documents: impl IntoIterator<Item = RawDocument>) -> Self {
        Self {
            corpus: Mutex::new(corpus_of(documents)),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            entered: Notify::new(),
        }
    }

    /// Hold subsequent fetches until the gate is opened.
    pub fn close_gate(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    /// Release one held fetch and stop holding new ones.
    pub fn open_gate(&self) {
        self.gated.store(false, Ordering::SeqCst);
        self.gate.add_permits(1);
    }

    /// Wait until a fetch is parked at the closed gate.
    pub async fn wait_at_gate(&self) {
        self.entered.notified().await;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn replace(&self, documents: impl IntoIterator<Item = RawDocument>) {
        *self.corpus.lock().unwrap() = corpus_of(documents);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl DocumentSource for CountingSource {
    fn list_all_documents(&self) -> BoxFuture<'_, anyhow::Result<Corpus>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gated.load(Ordering::SeqCst) {
                self.entered.notify_one();
                self.gate.acquire().await?.forget();
            }
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("content store unavailable");
            }
            Ok(self.corpus.lock().unwrap().clone())
        }
        .boxed()
    }
}

/// Group documents by section the same way the real sources do.
pub fn corpus_of(documents: impl IntoIterator<Item = RawDocument>) -> Corpus {
    let source = StaticSource::from_documents(documents);
    futures::executor::block_on(source.list_all_documents()).unwrap()
}

/// The three-document corpus used throughout the API examples.
pub fn example_documents() -> Vec<RawDocument> {
    vec![
        RawDocument::text("a/intro", "An introduction to binaural beats.")
            .with_title("Binaural Beats Intro"),
        RawDocument::text("a/deep", "Long-form guide to restful nights.")
            .with_title("Deep Sleep Guide")
            .with_tags(["rest", "night"]),
        RawDocument::text("b/focus", "Methods for concentration while working.")
            .with_title("Focus Techniques"),
    ]
}

/// A fully wired app over a counting source and a manual clock.
pub struct TestHub {
    pub source: Arc<CountingSource>,
    pub clock: Arc<ManualClock>,
    pub state: AppState,
}

impl TestHub {
    pub fn new(documents: impl IntoIterator<Item = RawDocument>) -> Self {
        let source = Arc::new(CountingSource::new(documents));
        let clock = Arc::new(ManualClock::default());
        let state = AppState::new(source.clone(), clock.clone());
        Self {
            source,
            clock,
            state,
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Issue a request against the router and decode the JSON body.
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }
}

#[fixture]
pub fn hub() -> TestHub {
    TestHub::new(example_documents())
}

#[fixture]
pub fn empty_hub() -> TestHub {
    TestHub::new(Vec::new())
}

/// Slugs of a JSON result array, in order.
pub fn result_slugs(results: &serde_json::Value) -> Vec<String> {
    results
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["slug"].as_str().unwrap().to_string())
        .collect()
}
