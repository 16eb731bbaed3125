//! Pure similarity metrics.
//!
//! Every text metric maps two strings to `[0.0, 1.0]`, is symmetric, and
//! returns `1.0` for case-insensitive equality. Levenshtein and
//! Jaro-Winkler delegate to `rapidfuzz`; trigram and token-Jaccard are set
//! intersections over cheap fingerprints.

use std::collections::BTreeSet;

use rapidfuzz::distance::{jaro_winkler, levenshtein};

use collate_model::TextMetric;

use crate::normalize::tokens;

/// Dispatches to the metric declared on a field spec.
#[must_use]
pub fn text_similarity(metric: TextMetric, a: &str, b: &str) -> f64 {
    match metric {
        TextMetric::Levenshtein => levenshtein_similarity(a, b),
        TextMetric::JaroWinkler => jaro_winkler_similarity(a, b),
        TextMetric::Trigram => trigram_similarity(a, b),
        TextMetric::TokenJaccard => token_jaccard_similarity(a, b),
    }
}

/// `1 - edit_distance / max(len)`, insert/delete/substitute each cost 1.
/// Two empty strings score `1.0`.
#[must_use]
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    levenshtein::normalized_similarity(a.chars(), b.chars())
}

/// Jaro similarity with a common-prefix bonus (up to 4 chars, factor 0.1).
/// Optimized for short strings with shared prefixes.
#[must_use]
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    jaro_winkler::similarity(a.chars(), b.chars())
}

/// Jaccard index over padded 3-character substrings. O(n + m) and robust to
/// word reordering on longer strings.
#[must_use]
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    jaccard(&left, &right)
}

/// Jaccard index over word token sets; tokens of length 1 are discarded.
/// Use when word order varies ("Super Mario Bros" vs "Mario Bros Super").
#[must_use]
pub fn token_jaccard_similarity(a: &str, b: &str) -> f64 {
    if a.to_lowercase() == b.to_lowercase() {
        return 1.0;
    }
    jaccard(&tokens(a), &tokens(b))
}

/// Linear decay from `1.0` at equality to `0.0` at `tolerance` units apart.
#[must_use]
pub fn numeric_similarity(a: i64, b: i64, tolerance: i64) -> f64 {
    if a == b {
        return 1.0;
    }
    if tolerance <= 0 {
        return 0.0;
    }
    // Widen before subtracting: i64 operands can be further apart than
    // i64::MAX.
    let delta = (i128::from(a) - i128::from(b)).unsigned_abs() as f64;
    (1.0 - delta / tolerance as f64).max(0.0)
}

/// 3-grams of the lowercased string padded with one leading and trailing
/// space, so single-word edges still contribute.
fn trigrams(raw: &str) -> BTreeSet<Vec<char>> {
    let padded: Vec<char> = std::iter::once(' ')
        .chain(raw.to_lowercase().chars())
        .chain(std::iter::once(' '))
        .collect();
    padded.windows(3).map(<[char]>::to_vec).collect()
}

fn jaccard<T: Ord>(left: &BTreeSet<T>, right: &BTreeSet<T>) -> f64 {
    if left.is_empty() && right.is_empty() {
        return 1.0;
    }
    let intersection = left.intersection(right).count();
    let union = left.len() + right.len() - intersection;
    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}
