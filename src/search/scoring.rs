//! Search relevance and ranking algorithms.
//!
//! Field scores are distances (0 best, 1 worst). A document's score is the
//! product of its matching fields' scores, each raised to the field's weight
//! times a length norm, so more matching fields and heavier fields pull the
//! product towards zero.

use crate::types::Field;

/// Relative importance of each searchable field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub title: f64,
    pub description: f64,
    pub content: f64,
    pub tags: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 0.4,
            description: 0.3,
            content: 0.2,
            tags: 0.1,
        }
    }
}

impl FieldWeights {
    pub const fn get(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::Description => self.description,
            Field::Content => self.content,
            Field::Tags => self.tags,
        }
    }

    /// Scale weights so they sum to 1. All-zero weights fall back to equal shares.
    pub fn normalized(self) -> Self {
        let total = self.title + self.description + self.content + self.tags;
        if total <= 0.0 {
            return Self {
                title: 0.25,
                description: 0.25,
                content: 0.25,
                tags: 0.25,
            };
        }
        Self {
            title: self.title / total,
            description: self.description / total,
            content: self.content / total,
            tags: self.tags / total,
        }
    }
}

/// Length norm of a field value: `1 / sqrt(token_count)`, rounded to 3 places.
///
/// Long fields (document bodies) get a smaller exponent, so a hit buried in
/// thousands of words moves the product less than a hit in a short title.
pub fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count();
    if tokens == 0 {
        return 1.0;
    }
    let norm = 1.0 / (tokens as f64).sqrt();
    (norm * 1000.0).round() / 1000.0
}

/// One matching field value's contribution to a document score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldScore {
    pub score: f64,
    pub weight: f64,
    pub norm: f64,
}

/// Combine field contributions into a document score in `0..=1`.
///
/// A perfect field (score 0) is replaced by `f64::EPSILON` so the document
/// still ranks by its other fields.
pub fn combine(fields: impl IntoIterator<Item = FieldScore>) -> f64 {
    fields.into_iter().fold(1.0, |total, field| {
        let base = if field.score == 0.0 && field.weight > 0.0 {
            f64::EPSILON
        } else {
            field.score
        };
        total * base.powf(field.weight * field.norm)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = FieldWeights::default().normalized();
        check!((w.title + w.description + w.content + w.tags - 1.0).abs() < 1e-12);
        check!((w.title - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_normalization_rescales() {
        let w = FieldWeights {
            title: 2.0,
            description: 1.0,
            content: 1.0,
            tags: 0.0,
        }
        .normalized();
        check!((w.title - 0.5).abs() < 1e-12);
        check!(w.tags == 0.0);
    }

    #[rstest]
    #[case("single", 1.0)]
    #[case("two words", 0.707)]
    #[case("one two three four", 0.5)]
    #[case("  spaced   out  ", 0.707)]
    #[case("", 1.0)]
    fn test_field_norm(#[case] text: &str, #[case] expected: f64) {
        check!((field_norm(text) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_more_fields_lower_score() {
        let title = FieldScore {
            score: 0.2,
            weight: 0.4,
            norm: 1.0,
        };
        let content = FieldScore {
            score: 0.2,
            weight: 0.2,
            norm: 0.5,
        };
        check!(combine([title, content]) < combine([title]));
    }

    #[test]
    fn test_perfect_field_is_near_zero() {
        let perfect = FieldScore {
            score: 0.0,
            weight: 0.4,
            norm: 1.0,
        };
        let score = combine([perfect]);
        check!(score > 0.0);
        check!(score < 1e-3);
    }

    #[test]
    fn test_no_fields_is_worst() {
        check!(combine(std::iter::empty()) == 1.0);
    }
}
