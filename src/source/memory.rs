use super::{Corpus, DocumentSource, RawDocument};
use crate::types::section_of;
use futures::FutureExt;
use futures::future::BoxFuture;

/// A fixed in-memory corpus.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    corpus: Corpus,
}

impl StaticSource {
    pub const fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }

    /// Group documents by the first segment of their slug.
    pub fn from_documents(documents: impl IntoIterator<Item = RawDocument>) -> Self {
        let mut corpus = Corpus::new();
        for doc in documents {
            corpus
                .entry(section_of(&doc.slug).to_string())
                .or_default()
                .push(doc);
        }
        Self { corpus }
    }
}

impl DocumentSource for StaticSource {
    fn list_all_documents(&self) -> BoxFuture<'_, anyhow::Result<Corpus>> {
        let corpus = self.corpus.clone();
        async move { Ok(corpus) }.boxed()
    }
}
