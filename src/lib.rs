pub mod cache;
pub mod cli;
pub mod clock;
pub mod error;
pub mod handlers;
pub mod search;
pub mod server;
pub mod source;
pub mod tracing;
pub mod types;

pub use cache::{CACHE_TTL, IndexCache, IndexSnapshot};
pub use search::{QueryEngine, SearchIndex};
pub use server::{AppState, router};
pub use source::{Corpus, DocumentSource, MarkdownSource, RawDocument, StaticSource};
pub use types::{QueryRequest, SearchResult, SearchableDocument};
