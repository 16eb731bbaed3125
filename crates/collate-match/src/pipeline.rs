//! Tiered matching pipeline.
//!
//! Tier 1 (exact-id) is resolved as a whole-collection pre-pass so an
//! identical id always wins, even when an earlier left record's tier-2/3
//! key would otherwise consume that right record. Tiers 2 and 3 then run
//! per left record in input order, consuming right records as they match.
//! Tier 4 draws candidates from the blocking index and defers commitment to
//! the conflict resolver, because several left records may claim the same
//! right record.

use std::collections::HashMap;

use tracing::debug;

use collate_model::{MatchConfig, MatchTier, Record};

use crate::blocking::BlockingIndex;
use crate::comparator::{primary_text_similarity, score_pair};
use crate::normalize::normalize;

pub(crate) const EXACT_KEY_SCORE: f64 = 0.95;
pub(crate) const NORMALIZED_KEY_SCORE: f64 = 0.85;

/// Identity-field keys are joined with a control character; control
/// characters are filtered out of each key segment, so a value containing a
/// literal separator cannot forge a key collision across field boundaries.
const KEY_SEPARATOR: char = '\u{1f}';

/// A scored tier-4 pairing, index-based; ids are resolved by the builder.
#[derive(Debug, Clone)]
pub(crate) struct FuzzyCandidate {
    pub right: usize,
    pub tier: MatchTier,
    pub score: f64,
    pub matched_fields: Vec<String>,
}

/// An exact (tier 1-3) pairing committed by the pipeline itself.
#[derive(Debug, Clone)]
pub(crate) struct ExactPair {
    pub left: usize,
    pub right: usize,
    pub tier: MatchTier,
    pub score: f64,
    pub matched_fields: Vec<String>,
}

/// Everything the resolver needs: committed exact pairs plus per-left fuzzy
/// candidate lists (sorted descending by score, capped).
#[derive(Debug)]
pub(crate) struct PipelineOutput {
    pub exact: Vec<ExactPair>,
    /// `(left index, candidates)`; lefts with an exact match are absent,
    /// lefts with no surviving candidates carry an empty list.
    pub fuzzy: Vec<(usize, Vec<FuzzyCandidate>)>,
}

pub(crate) fn run(left: &[Record], right: &[Record], config: &MatchConfig) -> PipelineOutput {
    let mut consumed_right = vec![false; right.len()];
    let mut matched_left = vec![false; left.len()];
    let mut exact = Vec::new();

    // Tier 1: exact-id pre-pass over the whole collection.
    let right_by_id: HashMap<&str, usize> = right
        .iter()
        .enumerate()
        .map(|(index, record)| (record.id.as_str(), index))
        .collect();
    for (left_index, record) in left.iter().enumerate() {
        if let Some(&right_index) = right_by_id.get(record.id.as_str()) {
            consumed_right[right_index] = true;
            matched_left[left_index] = true;
            exact.push(ExactPair {
                left: left_index,
                right: right_index,
                tier: MatchTier::ExactId,
                score: 1.0,
                matched_fields: score_pair(record, &right[right_index], config).matched_fields,
            });
        }
    }
    debug!(pairs = exact.len(), "exact-id tier resolved");

    // Key maps for tiers 2 and 3; each key buckets right indices in input
    // order, skipped over as they are consumed.
    let exact_keys = key_map(right, config, identity_key);
    let normalized_keys = key_map(right, config, normalized_identity_key);

    let index = BlockingIndex::build(right, config);
    let mut fuzzy = Vec::new();

    for (left_index, record) in left.iter().enumerate() {
        if matched_left[left_index] {
            continue;
        }

        // Tier 2: exact identity key.
        if let Some(right_index) =
            take_key_match(record, config, &exact_keys, &consumed_right, identity_key)
        {
            consumed_right[right_index] = true;
            exact.push(ExactPair {
                left: left_index,
                right: right_index,
                tier: MatchTier::ExactKey,
                score: EXACT_KEY_SCORE,
                matched_fields: score_pair(record, &right[right_index], config).matched_fields,
            });
            continue;
        }

        // Tier 3: normalized identity key.
        if let Some(right_index) = take_key_match(
            record,
            config,
            &normalized_keys,
            &consumed_right,
            normalized_identity_key,
        ) {
            consumed_right[right_index] = true;
            exact.push(ExactPair {
                left: left_index,
                right: right_index,
                tier: MatchTier::NormalizedKey,
                score: NORMALIZED_KEY_SCORE,
                matched_fields: score_pair(record, &right[right_index], config).matched_fields,
            });
            continue;
        }

        // Tier 4: blocked fuzzy / multi-field candidates.
        let candidates = fuzzy_candidates(record, right, &consumed_right, &index, config);
        fuzzy.push((left_index, candidates));
    }

    debug!(
        exact = exact.len(),
        fuzzy_lefts = fuzzy.len(),
        "pipeline tiers complete"
    );
    PipelineOutput { exact, fuzzy }
}

fn fuzzy_candidates(
    record: &Record,
    right: &[Record],
    consumed_right: &[bool],
    index: &BlockingIndex,
    config: &MatchConfig,
) -> Vec<FuzzyCandidate> {
    let mut candidates = Vec::new();
    for right_index in index.candidates(record) {
        if consumed_right[right_index] {
            continue;
        }
        let other = &right[right_index];

        // Fast path: the highest-weighted text field alone is near-identical.
        if let Some(similarity) = primary_text_similarity(record, other, config)
            && similarity >= config.fuzzy_threshold
        {
            let primary = config
                .highest_weighted_text_field()
                .map(|spec| spec.name.clone());
            candidates.push(FuzzyCandidate {
                right: right_index,
                tier: MatchTier::Fuzzy,
                score: similarity,
                matched_fields: primary.into_iter().collect(),
            });
            continue;
        }

        let scored = score_pair(record, other, config);
        if scored.score >= config.field_threshold {
            candidates.push(FuzzyCandidate {
                right: right_index,
                tier: MatchTier::MultiField,
                score: scored.score,
                matched_fields: scored.matched_fields,
            });
        }
    }
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.right.cmp(&b.right)));
    candidates.truncate(config.max_candidates_per_record);
    candidates
}

/// Joins the identity field values of a record, or `None` when any identity
/// field is absent.
fn identity_key(record: &Record, config: &MatchConfig) -> Option<String> {
    join_identity_fields(record, config, str::to_lowercase)
}

/// Tier-3 variant of [`identity_key`] with full normalization.
fn normalized_identity_key(record: &Record, config: &MatchConfig) -> Option<String> {
    join_identity_fields(record, config, normalize)
}

fn join_identity_fields(
    record: &Record,
    config: &MatchConfig,
    mut fold_text: impl FnMut(&str) -> String,
) -> Option<String> {
    if config.identity_fields.is_empty() {
        return None;
    }
    let mut parts = Vec::with_capacity(config.identity_fields.len());
    for field in &config.identity_fields {
        let part = match record.field(field)? {
            collate_model::FieldValue::Text(text) => fold_text(text),
            collate_model::FieldValue::Integer(value) => value.to_string(),
            collate_model::FieldValue::Url(url) => url.to_lowercase(),
        };
        parts.push(part.chars().filter(|c| !c.is_control()).collect::<String>());
    }
    Some(parts.join(&KEY_SEPARATOR.to_string()))
}

fn key_map(
    right: &[Record],
    config: &MatchConfig,
    key_fn: fn(&Record, &MatchConfig) -> Option<String>,
) -> HashMap<String, Vec<usize>> {
    let mut map: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, record) in right.iter().enumerate() {
        if let Some(key) = key_fn(record, config) {
            map.entry(key).or_default().push(index);
        }
    }
    map
}

/// First unconsumed right record sharing the left record's key.
fn take_key_match(
    record: &Record,
    config: &MatchConfig,
    keys: &HashMap<String, Vec<usize>>,
    consumed_right: &[bool],
    key_fn: fn(&Record, &MatchConfig) -> Option<String>,
) -> Option<usize> {
    let key = key_fn(record, config)?;
    keys.get(&key)?
        .iter()
        .copied()
        .find(|&index| !consumed_right[index])
}

#[cfg(test)]
mod tests {
    use collate_model::{FieldSpec, TextMetric};

    use super::*;

    fn config() -> MatchConfig {
        MatchConfig::new(
            vec![
                FieldSpec::text("title", 3.0, TextMetric::JaroWinkler),
                FieldSpec::numeric("year", 1.0, 5),
            ],
            "title",
            vec!["title".to_string(), "year".to_string()],
        )
    }

    fn game(id: &str, title: &str, year: i64) -> Record {
        Record::new(id)
            .with_text("title", title)
            .with_integer("year", year)
    }

    #[test]
    fn exact_id_wins_over_later_key_matches() {
        // l0's identity key matches r1, but r1's id belongs to l1. The
        // exact-id pre-pass must reserve r1 for l1.
        let left = vec![game("a", "Tetris", 1989), game("b", "Tetris", 1989)];
        let right = vec![game("b", "Tetris", 1989)];
        let output = run(&left, &right, &config());

        let exact_id: Vec<_> = output
            .exact
            .iter()
            .filter(|pair| pair.tier == MatchTier::ExactId)
            .collect();
        assert_eq!(exact_id.len(), 1);
        assert_eq!(exact_id[0].left, 1);
        assert_eq!(exact_id[0].right, 0);
    }

    #[test]
    fn exact_key_requires_every_identity_field() {
        let left = vec![Record::new("a").with_text("title", "Tetris")];
        let right = vec![game("b", "Tetris", 1989)];
        let output = run(&left, &right, &config());

        // Missing year on the left means no identity key, so the record
        // falls through to tier 4.
        assert!(output.exact.is_empty());
        assert_eq!(output.fuzzy.len(), 1);
    }

    #[test]
    fn normalized_key_catches_punctuation_variants() {
        let left = vec![game("a", "Super Mario Bros.", 1985)];
        let right = vec![game("b", "The Super Mario Bros", 1985)];
        let output = run(&left, &right, &config());

        assert_eq!(output.exact.len(), 1);
        assert_eq!(output.exact[0].tier, MatchTier::NormalizedKey);
        assert_eq!(output.exact[0].score, NORMALIZED_KEY_SCORE);
    }

    #[test]
    fn fuzzy_candidates_are_sorted_and_capped() {
        let mut cfg = config();
        cfg.max_candidates_per_record = 2;
        let left = vec![game("a", "Street Fighter II", 1991)];
        let right = vec![
            game("r1", "Street Fighter III", 1997),
            game("r2", "Street Fighter II Turbo", 1993),
            game("r3", "Street Fighter II", 1992),
        ];
        let output = run(&left, &right, &cfg);

        let (_, candidates) = &output.fuzzy[0];
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].score >= candidates[1].score);
        assert_eq!(candidates[0].right, 2);
    }

    #[test]
    fn control_characters_cannot_forge_identity_keys() {
        let cfg = MatchConfig::new(
            vec![
                FieldSpec::text("title", 2.0, TextMetric::JaroWinkler),
                FieldSpec::text("platform", 1.0, TextMetric::JaroWinkler),
            ],
            "title",
            vec!["title".to_string(), "platform".to_string()],
        );
        // A literal separator inside a value must not shift content across
        // the field boundary and collide with a differently-shaped record.
        let left = vec![
            Record::new("a")
                .with_text("title", "Mega Man\u{1f}NES")
                .with_text("platform", "X"),
        ];
        let right = vec![
            Record::new("b")
                .with_text("title", "Mega Man")
                .with_text("platform", "NES\u{1f}X"),
        ];
        let output = run(&left, &right, &cfg);

        assert!(output.exact.is_empty());
    }

    #[test]
    fn consumed_rights_leave_candidacy() {
        let left = vec![game("a", "Doom", 1993), game("x", "Doom", 1993)];
        let right = vec![game("b", "Doom", 1993)];
        let output = run(&left, &right, &config());

        // l0 consumes r0 at tier 2; l1 must not see it at tier 4.
        assert_eq!(output.exact.len(), 1);
        assert_eq!(output.exact[0].tier, MatchTier::ExactKey);
        let (_, candidates) = &output.fuzzy[0];
        assert!(candidates.is_empty());
    }
}
