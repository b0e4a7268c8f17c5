//! Full-text search infrastructure for the knowledge hub corpus.
//!
//! This module provides fuzzy matching, the weighted multi-field index, scoring,
//! and the query engine that shapes ranked results and suggestions.

// Module declarations
pub(crate) mod index;
pub(crate) mod matcher;
pub(crate) mod query;
pub(crate) mod scoring;

// Public re-exports (used via lib.rs)
pub use index::{SearchIndex, project_corpus};
pub use matcher::{ApproximateMatcher, FieldMatch, Matcher, Pattern};
pub use query::{QueryEngine, apply_filters, suggestions_from};
pub use scoring::{FieldScore, FieldWeights, combine, field_norm};
