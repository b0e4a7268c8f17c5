//! Document sources: where the corpus comes from before it is indexed.
//!
//! The search core only consumes [`DocumentSource::list_all_documents`]; it never
//! reads files itself. [`MarkdownSource`] loads a docs directory from disk and
//! [`StaticSource`] serves a fixed in-memory corpus.

mod markdown;
mod memory;

pub use markdown::MarkdownSource;
pub use memory::StaticSource;

use crate::types::section_of;
use futures::future::BoxFuture;
use std::collections::{BTreeMap, BTreeSet};

/// Full corpus grouped by section, iterated in sorted section order.
pub type Corpus = BTreeMap<String, Vec<RawDocument>>;

/// Body of a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBody {
    /// Plain markdown text, searchable as-is.
    Text(String),
    /// Pre-rendered or structured output that cannot be matched as text.
    Compiled,
}

impl DocumentBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Compiled => None,
        }
    }
}

/// A document exactly as the source produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub slug: String,
    pub title: Option<String>,
    pub content: DocumentBody,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub order: Option<i64>,
}

impl RawDocument {
    /// A plain-text document with no metadata beyond its slug.
    pub fn text(slug: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: None,
            content: DocumentBody::Text(content.into()),
            description: None,
            tags: Vec::new(),
            order: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Supplies the current corpus. The source of truth for everything indexed.
pub trait DocumentSource: Send + Sync {
    /// Load every document, grouped by section.
    fn list_all_documents(&self) -> BoxFuture<'_, anyhow::Result<Corpus>>;
}

/// Flatten a corpus into one list, preserving section then document order.
pub fn flatten(corpus: Corpus) -> impl Iterator<Item = RawDocument> {
    corpus.into_values().flatten()
}

/// Distinct sections across every document, sorted.
pub fn corpus_sections(corpus: &Corpus) -> Vec<String> {
    corpus
        .values()
        .flatten()
        .map(|doc| section_of(&doc.slug).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Total number of documents, including ones that are not indexable.
pub fn corpus_len(corpus: &Corpus) -> usize {
    corpus.values().map(Vec::len).sum()
}
