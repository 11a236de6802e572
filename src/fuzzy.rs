//! Typo-tolerant string similarity.
//!
//! A query matches a candidate when every character of the query appears in
//! the candidate in order (after case and diacritic folding). The rank of a
//! match is the number of candidate characters the query had to skip, so
//! `"prdct"` ranks 2 against `"product"`. Similarity is `1 / (1 + rank)`.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Fold case and strip diacritics so `"Résumé"` and `"resume"` compare equal.
pub fn fold(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Rank how far `query` is from matching `candidate`.
///
/// Returns `None` when the folded query is not an in-order subsequence of
/// the folded candidate, otherwise the count of unmatched candidate chars.
pub fn rank_match_fold(query: &str, candidate: &str) -> Option<usize> {
    let query = fold(query);
    let candidate = fold(candidate);

    let mut remaining = candidate.chars();
    let mut skipped = 0;
    'outer: for q in query.chars() {
        for c in remaining.by_ref() {
            if c == q {
                continue 'outer;
            }
            skipped += 1;
        }
        return None;
    }

    Some(skipped + remaining.count())
}

/// Similarity in `[0, 1]` between a normalized query and candidate.
///
/// Exact substring containment scores 1. Otherwise the fuzzy rank is mapped
/// to `1 / (1 + rank)`, and a non-match scores 0.
pub fn fuzzy_score(query: &str, candidate: &str) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    if candidate.contains(query) {
        return 1.0;
    }

    match rank_match_fold(query, candidate) {
        Some(rank) => (1.0 / (1.0 + rank as f64)).min(1.0),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_case_and_accents() {
        assert_eq!(fold("Résumé"), "resume");
        assert_eq!(fold("ÅNGSTRÖM"), "angstrom");
    }

    #[test]
    fn rank_counts_skipped_characters() {
        assert_eq!(rank_match_fold("prdct brf", "product brief"), Some(4));
        assert_eq!(rank_match_fold("abc", "abc"), Some(0));
        assert_eq!(rank_match_fold("ac", "abcd"), Some(2));
    }

    #[test]
    fn rank_rejects_out_of_order_characters() {
        assert_eq!(rank_match_fold("ba", "ab"), None);
        assert_eq!(rank_match_fold("abcd", "abc"), None);
    }

    #[test]
    fn rank_is_diacritic_insensitive() {
        assert_eq!(rank_match_fold("resume", "résumé"), Some(0));
    }

    #[test]
    fn score_substring_is_one() {
        assert_eq!(fuzzy_score("brief", "product brief"), 1.0);
    }

    #[test]
    fn score_maps_rank() {
        assert!((fuzzy_score("prdct brf", "product brief") - 0.2).abs() < 1e-9);
    }

    #[test]
    fn score_empty_inputs_are_zero() {
        assert_eq!(fuzzy_score("", "anything"), 0.0);
        assert_eq!(fuzzy_score("anything", ""), 0.0);
    }

    #[test]
    fn score_non_match_is_zero() {
        assert_eq!(fuzzy_score("zzz", "product brief"), 0.0);
    }
}
