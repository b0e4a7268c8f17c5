//! Weighted multi-field fuzzy index over [`SearchableDocument`]s.

use super::matcher::{Matcher, Pattern};
use super::scoring::{FieldScore, FieldWeights, combine, field_norm};
use crate::source::{Corpus, flatten};
use crate::types::{Field, MatchSpan, SearchResult, SearchableDocument, UNTITLED, section_of};
use ahash::AHashSet;
use std::sync::Arc;

/// One searchable value of a document, with its precomputed length norm.
#[derive(Debug, Clone, Copy)]
struct IndexedValue {
    field: Field,
    /// Position within an array field (`tags`).
    ref_index: Option<usize>,
    norm: f64,
}

/// A read-only search index. Rebuilt wholesale, never mutated.
#[derive(Debug)]
pub struct SearchIndex {
    docs: Vec<SearchableDocument>,
    values: Vec<Vec<IndexedValue>>,
    weights: FieldWeights,
    matcher: Arc<dyn Matcher>,
}

impl SearchIndex {
    /// Build an index over `docs`, normalizing `weights` to sum to 1.
    pub fn build(
        docs: Vec<SearchableDocument>,
        weights: FieldWeights,
        matcher: Arc<dyn Matcher>,
    ) -> Self {
        let values = docs.iter().map(index_values).collect();
        Self {
            docs,
            values,
            weights: weights.normalized(),
            matcher,
        }
    }

    pub fn documents(&self) -> &[SearchableDocument] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Return up to `limit` matching documents in ascending score order.
    ///
    /// Ties keep corpus order. An empty query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let pattern = Pattern::new(query);
        if pattern.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<(usize, f64, Vec<MatchSpan>)> = self
            .docs
            .iter()
            .zip(&self.values)
            .enumerate()
            .filter_map(|(idx, (doc, values))| {
                self.score_document(&pattern, doc, values)
                    .map(|(score, spans)| (idx, score, spans))
            })
            .collect();

        hits.sort_by(|(a_idx, a, _), (b_idx, b, _)| a.total_cmp(b).then(a_idx.cmp(b_idx)));

        hits.into_iter()
            .take(limit)
            .map(|(idx, score, matches)| SearchResult {
                item: self.docs[idx].clone(),
                score,
                matches,
            })
            .collect()
    }

    fn score_document(
        &self,
        pattern: &Pattern,
        doc: &SearchableDocument,
        values: &[IndexedValue],
    ) -> Option<(f64, Vec<MatchSpan>)> {
        let mut contributions = Vec::new();
        let mut spans = Vec::new();

        for value in values {
            let text = value_text(doc, *value);
            let Some(found) = self.matcher.match_text(pattern, text) else {
                continue;
            };
            contributions.push(FieldScore {
                score: found.score,
                weight: self.weights.get(value.field),
                norm: value.norm,
            });
            spans.push(MatchSpan {
                key: value.field,
                value: (value.field != Field::Content).then(|| text.to_string()),
                indices: found.indices,
                ref_index: value.ref_index,
            });
        }

        if spans.is_empty() {
            None
        } else {
            Some((combine(contributions), spans))
        }
    }
}

fn index_values(doc: &SearchableDocument) -> Vec<IndexedValue> {
    let mut values = Vec::with_capacity(3 + doc.tags.len());
    let mut push = |field: Field, ref_index: Option<usize>, text: &str| {
        // Blank values are never matched.
        if !text.trim().is_empty() {
            values.push(IndexedValue {
                field,
                ref_index,
                norm: field_norm(text),
            });
        }
    };

    push(Field::Title, None, &doc.title);
    if let Some(description) = &doc.description {
        push(Field::Description, None, description);
    }
    push(Field::Content, None, &doc.content);
    for (idx, tag) in doc.tags.iter().enumerate() {
        push(Field::Tags, Some(idx), tag);
    }
    values
}

fn value_text(doc: &SearchableDocument, value: IndexedValue) -> &str {
    match (value.field, value.ref_index) {
        (Field::Title, _) => &doc.title,
        (Field::Description, _) => doc.description.as_deref().unwrap_or_default(),
        (Field::Content, _) => &doc.content,
        (Field::Tags, Some(idx)) => doc.tags.get(idx).map_or("", String::as_str),
        (Field::Tags, None) => "",
    }
}

/// Project a raw corpus into searchable records.
///
/// Documents without a plain-text body are skipped, as are empty slugs. When
/// the same slug appears more than once the first occurrence (in section
/// order) is kept and later ones are dropped with a warning.
pub fn project_corpus(corpus: Corpus) -> Vec<SearchableDocument> {
    let mut seen: AHashSet<String> = AHashSet::new();
    let mut docs = Vec::new();

    for raw in flatten(corpus) {
        let Some(content) = raw.content.as_text() else {
            tracing::debug!("Skipping '{}': body is not plain text", raw.slug);
            continue;
        };
        if raw.slug.is_empty() {
            tracing::warn!("Skipping document with empty slug (title: {:?})", raw.title);
            continue;
        }
        if !seen.insert(raw.slug.clone()) {
            tracing::warn!("Duplicate slug '{}' dropped; keeping first occurrence", raw.slug);
            continue;
        }

        docs.push(SearchableDocument {
            title: raw.title.unwrap_or_else(|| UNTITLED.to_string()),
            content: content.to_string(),
            section: section_of(&raw.slug).to_string(),
            slug: raw.slug,
            description: raw.description,
            tags: raw.tags,
        });
    }

    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::matcher::ApproximateMatcher;
    use crate::source::{DocumentBody, RawDocument, StaticSource};
    use assert2::{check, let_assert};

    fn doc(slug: &str, title: &str, content: &str) -> SearchableDocument {
        SearchableDocument {
            title: title.to_string(),
            content: content.to_string(),
            slug: slug.to_string(),
            section: section_of(slug).to_string(),
            description: None,
            tags: Vec::new(),
        }
    }

    fn index(docs: Vec<SearchableDocument>) -> SearchIndex {
        SearchIndex::build(
            docs,
            FieldWeights::default(),
            Arc::new(ApproximateMatcher::default()),
        )
    }

    fn corpus(docs: Vec<RawDocument>) -> Corpus {
        let mut corpus = Corpus::new();
        for d in docs {
            corpus.entry(section_of(&d.slug).to_string()).or_default().push(d);
        }
        corpus
    }

    #[test]
    fn test_title_hit_outranks_content_hit() {
        let idx = index(vec![
            doc("a/body", "Unrelated", "a long note that mentions sleep once among many other words"),
            doc("a/title", "Sleep", "nothing here"),
        ]);
        let results = idx.search("sleep", 10);
        check!(results.len() == 2);
        check!(results[0].item.slug == "a/title");
        check!(results[0].score < results[1].score);
    }

    #[test]
    fn test_scores_non_decreasing() {
        let idx = index(vec![
            doc("a/1", "Sleep hygiene", "sleep"),
            doc("a/2", "Deep Sleep Guide", "rest"),
            doc("a/3", "Sleepy", "slep"),
            doc("a/4", "Other", "sleeping well"),
        ]);
        let results = idx.search("sleep", 10);
        check!(results.len() >= 2);
        check!(results.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn test_limit_and_empty_query() {
        let idx = index(vec![doc("a/1", "Focus", "x"), doc("a/2", "Focus again", "x")]);
        check!(idx.search("focus", 1).len() == 1);
        check!(idx.search("", 10).is_empty());
        check!(idx.search("focus", 0).is_empty());
    }

    #[test]
    fn test_content_span_has_no_value() {
        let idx = index(vec![doc("a/1", "Title", "all about binaural beats")]);
        let results = idx.search("binaural", 10);
        let_assert!([result] = results.as_slice());
        let_assert!([span] = result.matches.as_slice());
        check!(span.key == Field::Content);
        check!(span.value.is_none());
    }

    #[test]
    fn test_tag_spans_reference_element() {
        let mut tagged = doc("a/1", "Title", "body");
        tagged.tags = vec!["meditation".to_string(), "theta waves".to_string()];
        let idx = index(vec![tagged]);
        let results = idx.search("theta", 10);
        let_assert!([result] = results.as_slice());
        let_assert!([span] = result.matches.as_slice());
        check!(span.key == Field::Tags);
        check!(span.ref_index == Some(1));
        check!(span.value.as_deref() == Some("theta waves"));
    }

    #[test]
    fn test_project_skips_compiled_and_defaults_title() {
        let mut compiled = RawDocument::text("a/compiled", "");
        compiled.content = DocumentBody::Compiled;
        let docs = project_corpus(corpus(vec![
            RawDocument::text("a/plain", "text"),
            compiled,
            RawDocument::text("b/titled", "text").with_title("Named"),
        ]));
        check!(docs.len() == 2);
        check!(docs[0].title == UNTITLED);
        check!(docs[0].section == "a");
        check!(docs[1].title == "Named");
    }

    #[test]
    fn test_project_keeps_first_duplicate_slug() {
        let mut corpus = Corpus::new();
        corpus.insert(
            "a".to_string(),
            vec![RawDocument::text("shared/doc", "first").with_title("First")],
        );
        corpus.insert(
            "b".to_string(),
            vec![
                RawDocument::text("shared/doc", "second").with_title("Second"),
                RawDocument::text("", "orphan"),
            ],
        );
        let docs = project_corpus(corpus);
        let_assert!([only] = docs.as_slice());
        check!(only.title == "First");
        check!(only.section == "shared");
    }

    #[tokio::test]
    async fn test_projection_from_static_source() {
        use crate::source::DocumentSource;
        let source = StaticSource::from_documents([RawDocument::text("x/y", "z")]);
        let docs = project_corpus(source.list_all_documents().await.unwrap());
        check!(docs[0].slug == "x/y");
    }
}
