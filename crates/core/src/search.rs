//! Relevance search over topic names and content.
//!
//! This module lives in `core` (zero internal deps) and works on any
//! materialized topic list, independent of the hierarchy index.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::topic::Topic;

// ---------------------------------------------------------------------------
// Relevance weights
// ---------------------------------------------------------------------------

/// Query term found anywhere in the name.
pub const WEIGHT_NAME_SUBSTRING: f64 = 10.0;
/// Query term equal to a whole word of the name.
pub const WEIGHT_NAME_WORD: f64 = 8.0;
/// Query term contained in (but not equal to) a word of the name.
pub const WEIGHT_NAME_PARTIAL: f64 = 5.0;
/// Query term found anywhere in the content.
pub const WEIGHT_CONTENT_SUBSTRING: f64 = 3.0;
/// Query term equal to a whole word of the content.
pub const WEIGHT_CONTENT_WORD: f64 = 2.0;
/// Query term contained in (but not equal to) a word of the content.
pub const WEIGHT_CONTENT_PARTIAL: f64 = 1.0;

// ---------------------------------------------------------------------------
// Limits and defaults
// ---------------------------------------------------------------------------

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Maximum number of search results.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Default similarity threshold for fuzzy search (0.0 - 1.0).
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;

/// Length of a result snippet, in characters.
pub const SNIPPET_LENGTH: usize = 200;

/// How far a snippet edge may move to land on a word boundary.
const SNIPPET_BOUNDARY_SLACK: usize = 20;

/// Words dropped from queries before scoring.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from",
    "has", "have", "how", "i", "in", "into", "is", "it", "its", "of", "on", "or", "that", "the",
    "their", "this", "to", "was", "were", "what", "when", "where", "which", "who", "will",
    "with",
];

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<usize>, default: usize, max: usize) -> usize {
    limit.unwrap_or(default).clamp(1, max)
}

/// Validate a fuzzy similarity threshold (finite, in `(0, 1]`).
pub fn validate_threshold(threshold: f64) -> Result<(), CoreError> {
    if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "Fuzzy threshold must be greater than 0 and at most 1, got {threshold}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    Name,
    Content,
}

/// One ranked hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub topic: Topic,
    pub score: f64,
    pub matched_fields: Vec<MatchedField>,
    pub snippet: String,
}

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

/// Lowercase, strip punctuation, split on whitespace, drop stop words.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .filter(|term| !STOP_WORDS.contains(term))
        .map(str::to_string)
        .collect()
}

/// Words of a field, lowercased, split on anything that is not alphanumeric.
fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Exact search
// ---------------------------------------------------------------------------

/// Score one field against one term: substring, then exact word, else
/// partial word.
fn field_score(
    text_lower: &str,
    field_words: &[String],
    term: &str,
    weights: (f64, f64, f64),
) -> f64 {
    let (substring, word, partial) = weights;
    let mut score = 0.0;
    if text_lower.contains(term) {
        score += substring;
    }
    if field_words.iter().any(|w| w == term) {
        score += word;
    } else if field_words.iter().any(|w| w.contains(term)) {
        score += partial;
    }
    score
}

/// Damp scores of long content: `term_count × ln(content_length + 1)`,
/// floored at 1.
fn normalization(term_count: usize, content: &str) -> f64 {
    let len = content.chars().count() as f64;
    (term_count as f64 * (len + 1.0).ln()).max(1.0)
}

/// Rank `topics` against `query`, best first. Topics with zero score are
/// dropped; a query made only of stop words matches nothing.
pub fn search(query: &str, topics: &[Topic]) -> Vec<SearchResult> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let results = topics
        .iter()
        .filter_map(|topic| {
            let name_lower = topic.name.to_lowercase();
            let content_lower = topic.content.to_lowercase();
            let name_words = words(&topic.name);
            let content_words = words(&topic.content);

            let mut raw = 0.0;
            let mut fields = BTreeSet::new();
            for term in &terms {
                let in_name = field_score(
                    &name_lower,
                    &name_words,
                    term,
                    (WEIGHT_NAME_SUBSTRING, WEIGHT_NAME_WORD, WEIGHT_NAME_PARTIAL),
                );
                let in_content = field_score(
                    &content_lower,
                    &content_words,
                    term,
                    (
                        WEIGHT_CONTENT_SUBSTRING,
                        WEIGHT_CONTENT_WORD,
                        WEIGHT_CONTENT_PARTIAL,
                    ),
                );
                if in_name > 0.0 {
                    fields.insert(MatchedField::Name);
                }
                if in_content > 0.0 {
                    fields.insert(MatchedField::Content);
                }
                raw += in_name + in_content;
            }

            (raw > 0.0).then(|| SearchResult {
                score: raw / normalization(terms.len(), &topic.content),
                matched_fields: fields.into_iter().collect(),
                snippet: snippet(&topic.content, &terms),
                topic: topic.clone(),
            })
        })
        .collect();

    rank(results)
}

// ---------------------------------------------------------------------------
// Fuzzy search
// ---------------------------------------------------------------------------

/// Levenshtein edit distance between two strings, by character.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();
    if a.is_empty() {
        return n;
    }

    // Two DP rows: distances between `a[..i]` and `b[..j]`.
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for j in 1..=n {
            let cost = usize::from(ca != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity `1 - distance / max_len`, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Best similarity of `term` against any word, if it reaches `threshold`.
fn best_similarity(field_words: &[String], term: &str, threshold: f64) -> Option<f64> {
    field_words
        .iter()
        .map(|w| similarity(w, term))
        .filter(|s| *s >= threshold)
        .max_by(f64::total_cmp)
}

/// Rank `topics` by edit-distance similarity to the query terms.
///
/// A term matches a field when some word of the field reaches `threshold`;
/// the contribution is the field's word weight scaled by that similarity.
pub fn fuzzy_search(query: &str, topics: &[Topic], threshold: f64) -> Vec<SearchResult> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let results = topics
        .iter()
        .filter_map(|topic| {
            let name_words = words(&topic.name);
            let content_words = words(&topic.content);

            let mut raw = 0.0;
            let mut fields = BTreeSet::new();
            for term in &terms {
                if let Some(sim) = best_similarity(&name_words, term, threshold) {
                    raw += WEIGHT_NAME_WORD * sim;
                    fields.insert(MatchedField::Name);
                }
                if let Some(sim) = best_similarity(&content_words, term, threshold) {
                    raw += WEIGHT_CONTENT_WORD * sim;
                    fields.insert(MatchedField::Content);
                }
            }

            (raw > 0.0).then(|| SearchResult {
                score: raw / normalization(terms.len(), &topic.content),
                matched_fields: fields.into_iter().collect(),
                snippet: snippet(&topic.content, &terms),
                topic: topic.clone(),
            })
        })
        .collect();

    rank(results)
}

/// Sort descending by score; equal scores fall back to name, then id.
fn rank(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.topic.name.cmp(&b.topic.name))
            .then_with(|| a.topic.id.cmp(&b.topic.id))
    });
    results
}

// ---------------------------------------------------------------------------
// Snippets
// ---------------------------------------------------------------------------

/// Pick the [`SNIPPET_LENGTH`]-character window of `content` holding the most
/// term occurrences, nudge its edges onto word boundaries, and mark cut
/// edges with an ellipsis.
pub fn snippet(content: &str, terms: &[String]) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= SNIPPET_LENGTH {
        return content.to_string();
    }

    // One lowercase char per original char keeps indices aligned.
    let lower: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let mut occurrences: Vec<(usize, usize)> = Vec::new();
    for term in terms {
        let needle: Vec<char> = term.chars().collect();
        if needle.is_empty() || needle.len() > lower.len() {
            continue;
        }
        for start in 0..=(lower.len() - needle.len()) {
            if lower[start..start + needle.len()] == needle[..] {
                occurrences.push((start, start + needle.len()));
            }
        }
    }

    let last_start = chars.len() - SNIPPET_LENGTH;
    let mut best_start = 0;
    let mut best_count = 0;
    let candidates = std::iter::once(0).chain(occurrences.iter().map(|(s, _)| *s));
    for candidate in candidates {
        let start = candidate.min(last_start);
        let end = start + SNIPPET_LENGTH;
        let count = occurrences
            .iter()
            .filter(|(s, e)| *s >= start && *e <= end)
            .count();
        if count > best_count || (count == best_count && start < best_start) {
            best_count = count;
            best_start = start;
        }
    }

    let mut start = best_start;
    if start > 0 {
        // Back up to the start of the word the window cuts into.
        let floor = start.saturating_sub(SNIPPET_BOUNDARY_SLACK);
        while start > floor && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
    }
    let mut end = (start + SNIPPET_LENGTH).min(chars.len());
    if end < chars.len() {
        // Pull back to the end of the last whole word.
        let floor = end.saturating_sub(SNIPPET_BOUNDARY_SLACK).max(start);
        let mut cut = end;
        while cut > floor && !chars[cut].is_whitespace() {
            cut -= 1;
        }
        if chars[cut].is_whitespace() {
            end = cut;
        }
    }

    let body: String = chars[start..end].iter().collect();
    let mut out = String::with_capacity(body.len() + 6);
    if start > 0 {
        out.push_str("...");
    }
    out.push_str(body.trim());
    if end < chars.len() {
        out.push_str("...");
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
