//! Keyword ranking over service records
//!
//! Scores records by literal, case-insensitive substring occurrences of each
//! keyword across name, description, and tags. Matching is literal text, not
//! patterns, so keywords containing regex metacharacters need no escaping.

use crate::record::ServiceRecord;

/// Default number of results returned by [`rank`]
pub const DEFAULT_LIMIT: usize = 10;

/// Rank records against a keyword list
///
/// Records with a zero score are excluded. The order is total and
/// deterministic: score descending, then name ascending (case-sensitive),
/// then identifier ascending. An empty or all-blank keyword list and a zero
/// `limit` both yield an empty result.
pub fn rank(records: &[ServiceRecord], keywords: &[String], limit: usize) -> Vec<ServiceRecord> {
    if limit == 0 {
        return Vec::new();
    }
    let normalized = normalize_keywords(keywords);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&ServiceRecord, usize)> = records
        .iter()
        .map(|record| (record, score_normalized(record, &normalized)))
        .filter(|(_, score)| *score > 0)
        .collect();

    scored.sort_by(|(a, score_a), (b, score_b)| {
        score_b
            .cmp(score_a)
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.identifier().cmp(b.identifier()))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(record, _)| record.clone())
        .collect()
}

/// Total occurrence count for a record against raw keywords
pub fn keyword_score(record: &ServiceRecord, keywords: &[String]) -> usize {
    score_normalized(record, &normalize_keywords(keywords))
}

/// Lowercase and trim keywords, dropping blanks
fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

fn score_normalized(record: &ServiceRecord, keywords: &[String]) -> usize {
    if keywords.is_empty() {
        return 0;
    }

    // Each field is lowercased independently; matches never span fields.
    let name = record.name().to_lowercase();
    let description = record.description().to_lowercase();
    let tags: Vec<String> = record.tags().iter().map(|t| t.to_lowercase()).collect();

    keywords
        .iter()
        .map(|kw| {
            name.matches(kw.as_str()).count()
                + description.matches(kw.as_str()).count()
                + tags
                    .iter()
                    .map(|tag| tag.matches(kw.as_str()).count())
                    .sum::<usize>()
        })
        .sum()
}
