//! Blocking index: restricts tier-4 comparison to candidates sharing a
//! cheap fingerprint of the primary text field.
//!
//! Blocking is a recall/performance trade-off, not a correctness guarantee:
//! two matching records whose normalized primary fields start with different
//! characters are never compared at tier 4 (e.g. a typo in the first
//! letter). Records with no usable primary text fall into a reserved empty
//! block that is considered everywhere.

use std::collections::HashMap;

use tracing::warn;

use collate_model::{MatchConfig, Record};

use crate::normalize::block_key;

/// Buckets right-collection record indices by blocking fingerprint.
#[derive(Debug)]
pub struct BlockingIndex {
    blocks: HashMap<String, Vec<usize>>,
    empty_block: Vec<usize>,
    total: usize,
    cap: usize,
    primary_field: String,
}

impl BlockingIndex {
    /// Indexes the right collection on the config's primary text field.
    #[must_use]
    pub fn build(right: &[Record], config: &MatchConfig) -> Self {
        let mut blocks: HashMap<String, Vec<usize>> = HashMap::new();
        let mut empty_block = Vec::new();
        for (index, record) in right.iter().enumerate() {
            let key = record
                .text(&config.primary_field)
                .map(block_key)
                .unwrap_or_default();
            if key.is_empty() {
                empty_block.push(index);
            } else {
                blocks.entry(key).or_default().push(index);
            }
        }
        Self {
            blocks,
            empty_block,
            total: right.len(),
            cap: config.blocking_cap(),
            primary_field: config.primary_field.clone(),
        }
    }

    /// Returns candidate right indices for one left record, in input order,
    /// capped at `max_candidates_per_record * 10` to bound worst-case skew
    /// (e.g. many titles starting with "The").
    ///
    /// A left record with no usable primary text is compared against every
    /// block; this is O(k) for the k such records.
    #[must_use]
    pub fn candidates(&self, left: &Record) -> Vec<usize> {
        let key = left
            .text(&self.primary_field)
            .map(block_key)
            .unwrap_or_default();
        let mut indices: Vec<usize> = if key.is_empty() {
            (0..self.total).collect()
        } else {
            let mut same_block = self.blocks.get(&key).cloned().unwrap_or_default();
            same_block.extend_from_slice(&self.empty_block);
            same_block.sort_unstable();
            same_block
        };
        if indices.len() > self.cap {
            warn!(
                left_id = %left.id,
                block = %key,
                candidates = indices.len(),
                cap = self.cap,
                "blocking cap reached, truncating candidate list"
            );
            indices.truncate(self.cap);
        }
        indices
    }
}

#[cfg(test)]
mod tests {
    use collate_model::{FieldSpec, TextMetric};

    use super::*;

    fn config() -> MatchConfig {
        MatchConfig::new(
            vec![FieldSpec::text("title", 1.0, TextMetric::JaroWinkler)],
            "title",
            vec!["title".to_string()],
        )
    }

    fn titled(id: &str, title: &str) -> Record {
        Record::new(id).with_text("title", title)
    }

    #[test]
    fn candidates_share_a_block() {
        let right = vec![
            titled("r1", "Zelda"),
            titled("r2", "The Zombies"),
            titled("r3", "Mario"),
        ];
        let index = BlockingIndex::build(&right, &config());

        // "The " is stripped before fingerprinting, so both z-titles bucket
        // together.
        let candidates = index.candidates(&titled("l1", "Zelda II"));
        assert_eq!(candidates, vec![0, 1]);
    }

    #[test]
    fn empty_primary_field_joins_every_lookup() {
        let right = vec![titled("r1", "Zelda"), titled("r2", "")];
        let index = BlockingIndex::build(&right, &config());

        assert_eq!(index.candidates(&titled("l1", "Zelda")), vec![0, 1]);
        // An empty-keyed left record is compared against everything.
        assert_eq!(index.candidates(&titled("l2", "...")), vec![0, 1]);
    }

    #[test]
    fn candidate_list_respects_hard_cap() {
        let mut cfg = config();
        cfg.max_candidates_per_record = 1;
        let right: Vec<Record> = (0..25)
            .map(|i| titled(&format!("r{i}"), &format!("The Game {i}")))
            .collect();
        let index = BlockingIndex::build(&right, &cfg);

        let candidates = index.candidates(&titled("l1", "The Game 3"));
        assert_eq!(candidates.len(), 10);
    }
}
