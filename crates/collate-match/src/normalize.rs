//! Text normalization for key comparison, blocking, and tokenization.
//!
//! `normalize` is idempotent: `normalize(normalize(s)) == normalize(s)`.
//! Leading articles are stripped to a fixed point so repeated application
//! cannot change the result again.

use std::collections::BTreeSet;

const QUOTE_CHARS: [char; 7] = ['\'', '\u{2018}', '\u{2019}', '`', '"', '\u{201C}', '\u{201D}'];

/// Normalizes a string for tier-3 key comparison.
///
/// Lowercases, drops quote characters, replaces other punctuation with
/// spaces, collapses whitespace, and strips leading "the "/"a " articles.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !QUOTE_CHARS.contains(c))
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    let mut result = collapse_whitespace(&stripped);
    loop {
        let next = strip_leading_article(&result);
        if next == result {
            break;
        }
        result = next;
    }
    result
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_leading_article(s: &str) -> String {
    for article in ["the ", "a "] {
        if let Some(rest) = s.strip_prefix(article) {
            return rest.to_string();
        }
    }
    s.to_string()
}

/// Splits a string into its comparison token set.
///
/// Lowercases, replaces punctuation with spaces, splits on whitespace, and
/// discards tokens of length 1 or less.
#[must_use]
pub fn tokens(raw: &str) -> BTreeSet<String> {
    raw.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(str::to_owned)
        .collect()
}

/// Blocking fingerprint: the first alphanumeric character of the normalized
/// string, or the empty string for records with no usable primary text.
#[must_use]
pub fn block_key(raw: &str) -> String {
    normalize(raw)
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(String::from)
        .unwrap_or_default()
}
