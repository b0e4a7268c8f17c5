//! Approximate string matching for a single field value.
//!
//! The [`Matcher`] trait is the seam between the weighted index and the fuzzy
//! algorithm. [`ApproximateMatcher`] scores a field by the fewest edits needed to
//! turn the pattern into *some* substring of the text (Sellers' variant of
//! Levenshtein), so a match anywhere in the field counts equally.

use std::fmt::Debug;

/// Default maximum `errors / pattern_len` for a field to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Default minimum length of a highlighted run.
pub const DEFAULT_MIN_MATCH_CHAR_LENGTH: usize = 2;

/// Floor applied to every non-identical match so it ranks below an exact field.
const MIN_PARTIAL_SCORE: f64 = 0.001;

/// A query folded to lowercase characters, prepared once per search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    chars: Vec<char>,
}

impl Pattern {
    pub fn new(query: &str) -> Self {
        Self {
            chars: fold_chars(query),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

/// Outcome of matching one field value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    /// Distance in `0..=1`; 0 only when the whole field equals the pattern.
    pub score: f64,
    /// Inclusive `[start, end]` character ranges to highlight.
    pub indices: Vec<[usize; 2]>,
}

/// Scores a prepared pattern against one field value.
pub trait Matcher: Send + Sync + Debug {
    /// Returns `None` when the field does not match.
    fn match_text(&self, pattern: &Pattern, text: &str) -> Option<FieldMatch>;
}

/// Edit-distance substring matcher with a relative error threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMatcher {
    threshold: f64,
    min_match_char_length: usize,
}

impl Default for ApproximateMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_MIN_MATCH_CHAR_LENGTH)
    }
}

impl ApproximateMatcher {
    pub const fn new(threshold: f64, min_match_char_length: usize) -> Self {
        Self {
            threshold,
            min_match_char_length,
        }
    }

    /// Largest error count whose relative score stays within the threshold.
    fn max_errors(&self, pattern_len: usize) -> usize {
        (0..=pattern_len)
            .take_while(|&errors| errors as f64 / pattern_len as f64 <= self.threshold)
            .last()
            .unwrap_or(0)
    }
}

impl Matcher for ApproximateMatcher {
    fn match_text(&self, pattern: &Pattern, text: &str) -> Option<FieldMatch> {
        let needle = pattern.chars();
        if needle.is_empty() {
            return None;
        }

        let haystack = fold_chars(text);
        if haystack.is_empty() {
            return None;
        }

        if haystack == needle {
            return Some(FieldMatch {
                score: 0.0,
                indices: vec![[0, haystack.len() - 1]],
            });
        }

        let mut mask = vec![false; haystack.len()];
        let errors = if mark_exact_occurrences(needle, &haystack, &mut mask) {
            0
        } else {
            let (errors, end) = best_alignment_end(needle, &haystack);
            if errors > self.max_errors(needle.len()) {
                return None;
            }
            mark_alignment(needle, &haystack, end, errors, &mut mask);
            errors
        };

        let indices = mask_to_indices(&mask, self.min_match_char_length);
        if indices.is_empty() {
            return None;
        }

        Some(FieldMatch {
            score: (errors as f64 / needle.len() as f64).max(MIN_PARTIAL_SCORE),
            indices,
        })
    }
}

/// Lowercase character by character so offsets line up with the original text.
fn fold_chars(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Mark every non-overlapping exact occurrence. Returns whether any was found.
fn mark_exact_occurrences(needle: &[char], haystack: &[char], mask: &mut [bool]) -> bool {
    let m = needle.len();
    let mut found = false;
    let mut start = 0;
    while start + m <= haystack.len() {
        if haystack[start..start + m] == *needle {
            mask[start..start + m].fill(true);
            found = true;
            start += m;
        } else {
            start += 1;
        }
    }
    found
}

/// Minimum substring edit distance and the (inclusive) text index where the
/// leftmost best alignment ends.
fn best_alignment_end(needle: &[char], haystack: &[char]) -> (usize, usize) {
    let m = needle.len();
    let mut column: Vec<usize> = (0..=m).collect();
    let mut best = (usize::MAX, 0);

    for (j, &t) in haystack.iter().enumerate() {
        let mut diagonal = column[0];
        for i in 1..=m {
            let cost = usize::from(needle[i - 1] != t);
            let value = (diagonal + cost).min(column[i] + 1).min(column[i - 1] + 1);
            diagonal = column[i];
            column[i] = value;
        }
        if column[m] < best.0 {
            best = (column[m], j);
        }
    }

    // An empty haystack never reaches here; a pattern longer than the text
    // still aligns with `m - n` insertions at minimum.
    best
}

/// Trace the alignment ending at `end` and mark text characters that matched
/// the pattern exactly.
fn mark_alignment(needle: &[char], haystack: &[char], end: usize, errors: usize, mask: &mut [bool]) {
    let m = needle.len();
    let window_start = (end + 1).saturating_sub(m + errors);
    let window = &haystack[window_start..=end];
    let n = window.len();

    // Full matrix over the window only; rows are pattern prefixes.
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(needle[i - 1] != window[j - 1]);
            dp[i][j] = (dp[i - 1][j - 1] + cost)
                .min(dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1);
        }
    }

    let (mut i, mut j) = (m, n);
    while i > 0 {
        if j > 0 {
            let cost = usize::from(needle[i - 1] != window[j - 1]);
            if dp[i][j] == dp[i - 1][j - 1] + cost {
                if cost == 0 {
                    mask[window_start + j - 1] = true;
                }
                i -= 1;
                j -= 1;
                continue;
            }
            if dp[i][j] == dp[i][j - 1] + 1 {
                j -= 1;
                continue;
            }
        }
        i -= 1;
    }
}

/// Collapse a boolean mask into inclusive runs at least `min_len` long.
fn mask_to_indices(mask: &[bool], min_len: usize) -> Vec<[usize; 2]> {
    let mut indices = Vec::new();
    let mut run_start: Option<usize> = None;

    for (idx, &marked) in mask.iter().chain(std::iter::once(&false)).enumerate() {
        match (marked, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                if idx - start >= min_len {
                    indices.push([start, idx - 1]);
                }
                run_start = None;
            }
            _ => {}
        }
    }

    indices
}
