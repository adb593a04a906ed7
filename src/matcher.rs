//! Fuzzy matching core
//!
//! Ranks catalog names and their localized aliases against free-text or
//! voice-transcribed queries, tolerating misspellings, partial phrases,
//! and transcription noise.

use crate::i18n::Translations;
use strsim::normalized_levenshtein;

/// Score awarded when the candidate contains the query as a substring
const CANDIDATE_CONTAINS_QUERY: f64 = 0.9;

/// Score awarded when the query contains the candidate as a substring
const QUERY_CONTAINS_CANDIDATE: f64 = 0.8;

/// Minimum best-alias score an entity must exceed to be returned at all
const MIN_ENTITY_SCORE: f64 = 0.3;

/// A candidate string with its similarity score in [0, 1]
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub value: String,
    pub score: f64,
}

/// Case-insensitive similarity between two strings.
///
/// `1 - levenshtein(lower(a), lower(b)) / max(len(a), len(b))`, so two
/// empty strings score 1.0 and a score of 1.0 means case-insensitive
/// equality.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Containment bonus: candidate contains the query as a substring
fn contains_query_score(query: &str, candidate: &str) -> f64 {
    if candidate.to_lowercase().contains(&query.to_lowercase()) {
        CANDIDATE_CONTAINS_QUERY
    } else {
        0.0
    }
}

/// Containment bonus: query contains the candidate as a substring
fn query_contains_score(query: &str, candidate: &str) -> f64 {
    if query.to_lowercase().contains(&candidate.to_lowercase()) {
        QUERY_CONTAINS_CANDIDATE
    } else {
        0.0
    }
}

/// Score a single candidate: the maximum of the edit-distance similarity
/// and the two containment bonuses.
///
/// Voice transcripts often embed the canonical term inside a longer or
/// shorter phrase ("where is the legon library building" contains
/// "legon"), so containment outranks raw edit distance.
pub fn score_candidate(query: &str, candidate: &str) -> f64 {
    similarity(query, candidate)
        .max(contains_query_score(query, candidate))
        .max(query_contains_score(query, candidate))
}

/// Score every candidate against the query and sort descending.
///
/// The sort is stable: equally scored candidates keep their input order.
/// Pure function of its inputs; the output has the same cardinality as
/// `candidates`.
pub fn best_matches<S: AsRef<str>>(query: &str, candidates: &[S]) -> Vec<ScoredCandidate> {
    let mut matches: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            value: candidate.as_ref().to_string(),
            score: score_candidate(query, candidate.as_ref()),
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    matches
}

/// Resolve a free-text search term to a canonical entity name.
///
/// Looks up the alias table for `language` (falling back per
/// [`Translations::resolve`]), scores each entity by the best of its
/// aliases plus the canonical name itself, and returns the top entity.
/// Entities whose best alias does not score above [`MIN_ENTITY_SCORE`]
/// never surface; with no survivors the result is `None`.
pub fn find_matching_entity<'a>(
    search_term: &str,
    translations: &'a Translations,
    language: &str,
) -> Option<&'a str> {
    let table = translations.resolve(language)?;

    let mut best: Option<(&'a str, f64)> = None;
    for entry in table.entries() {
        let mut candidates: Vec<&str> = entry.aliases.iter().map(String::as_str).collect();
        candidates.push(entry.canonical.as_str());

        let ranked = best_matches(search_term, &candidates);
        let top = match ranked.first() {
            Some(top) if top.score > MIN_ENTITY_SCORE => top.score,
            _ => continue,
        };

        // Strictly-greater keeps the first-declared entity on ties
        if best.map_or(true, |(_, score)| top > score) {
            best = Some((entry.canonical.as_str(), top));
        }
    }

    best.map(|(canonical, _)| canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n;

    #[test]
    fn test_similarity_reflexive() {
        for s in ["", "legon", "Balme Library", "Korle Bu Campus"] {
            assert_eq!(similarity(s, s), 1.0);
        }
    }

    #[test]
    fn test_similarity_empty_strings() {
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_similarity_single_substitution() {
        // One substitution out of length 3
        let score = similarity("abc", "abd");
        assert!((score - 2.0 / 3.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_similarity_symmetric() {
        let pairs = [
            ("legon", "Legon Campus"),
            ("paracetamol", "panadol"),
            ("", "library"),
            ("night market", "Night Market"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn test_similarity_case_insensitive() {
        assert_eq!(similarity("BALME", "balme"), 1.0);
    }

    #[test]
    fn test_similarity_range() {
        for (a, b) in [("xyzxyz", "Legon Campus"), ("a", ""), ("ab", "ba")] {
            let score = similarity(a, b);
            assert!((0.0..=1.0).contains(&score), "{} vs {} -> {}", a, b, score);
        }
    }

    #[test]
    fn test_best_matches_substring_bonus_dominates() {
        let candidates = vec!["Legon Campus".to_string(), "Korle Bu Campus".to_string()];
        let ranked = best_matches("legon", &candidates);
        assert_eq!(ranked[0].value, "Legon Campus");
        assert!(ranked[0].score >= 0.9);
    }

    #[test]
    fn test_best_matches_query_contains_candidate() {
        let candidates = vec!["legon".to_string()];
        let ranked = best_matches("where is the legon library building", &candidates);
        assert_eq!(ranked[0].score, 0.8);
    }

    #[test]
    fn test_best_matches_total_ordering() {
        let candidates = vec![
            "Balme Library".to_string(),
            "Great Hall".to_string(),
            "Night Market".to_string(),
            "Legon Hospital".to_string(),
        ];
        let ranked = best_matches("balme", &candidates);
        assert_eq!(ranked.len(), candidates.len());
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for candidate in &candidates {
            assert_eq!(ranked.iter().filter(|m| m.value == *candidate).count(), 1);
        }
    }

    #[test]
    fn test_best_matches_stable_on_ties() {
        // Neither candidate is related to the query; both score identically
        let candidates = vec!["aaaa".to_string(), "aaab".to_string()];
        let ranked = best_matches("zzzz", &candidates);
        assert_eq!(ranked[0].value, "aaaa");
        assert_eq!(ranked[1].value, "aaab");
    }

    #[test]
    fn test_find_matching_entity_basic() {
        let translations = i18n::campus_translations();
        let found = find_matching_entity("korle bu", translations, "en-US");
        assert_eq!(found, Some("Korle Bu Campus"));
    }

    #[test]
    fn test_find_matching_entity_misspelled() {
        let translations = i18n::campus_translations();
        let found = find_matching_entity("ballme libary", translations, "en-US");
        assert_eq!(found, Some("Balme Library"));
    }

    #[test]
    fn test_find_matching_entity_below_threshold() {
        let translations = i18n::campus_translations();
        assert_eq!(find_matching_entity("xyzxyz", translations, "en-US"), None);
    }

    #[test]
    fn test_find_matching_entity_unsupported_language_falls_back() {
        let translations = i18n::campus_translations();
        let found = find_matching_entity("legon", translations, "de-DE");
        assert_eq!(found, Some("Legon Campus"));
    }

    #[test]
    fn test_find_matching_entity_localized_alias() {
        let translations = i18n::campus_translations();
        let found = find_matching_entity("bibliotheque", translations, "fr-FR");
        assert_eq!(found, Some("Balme Library"));
    }
}
