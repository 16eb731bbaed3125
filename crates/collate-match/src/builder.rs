//! Assembles the final [`ComparisonResult`] and asserts the partition
//! invariant: every input record lands in exactly one output bucket.
//!
//! An invariant violation is a defect in the pipeline or resolver, not bad
//! input, so it panics instead of returning an error.

use std::collections::HashSet;

use collate_model::{ComparisonResult, MatchCandidate, MatchedPair, Record};

use crate::pipeline::PipelineOutput;
use crate::resolver::Resolution;

pub(crate) fn build(
    left: Vec<Record>,
    right: Vec<Record>,
    output: PipelineOutput,
    resolution: Resolution,
) -> ComparisonResult {
    let left_total = left.len();
    let right_total = right.len();
    let mut left_slots: Vec<Option<Record>> = left.into_iter().map(Some).collect();
    let mut right_slots: Vec<Option<Record>> = right.into_iter().map(Some).collect();

    // Committed pairs, ordered by left input position.
    let mut pairs: Vec<(usize, usize, collate_model::MatchTier, f64, Vec<String>)> = output
        .exact
        .into_iter()
        .map(|p| (p.left, p.right, p.tier, p.score, p.matched_fields))
        .chain(
            resolution
                .committed
                .into_iter()
                .map(|p| (p.left, p.right, p.tier, p.score, p.matched_fields)),
        )
        .collect();
    pairs.sort_by_key(|(left_index, ..)| *left_index);

    let mut matched = Vec::with_capacity(pairs.len());
    for (left_index, right_index, tier, score, matched_fields) in pairs {
        let left_record = take_slot(&mut left_slots, left_index, "left");
        let right_record = take_slot(&mut right_slots, right_index, "right");
        matched.push(MatchedPair {
            left: left_record,
            right: right_record,
            tier,
            score,
            matched_fields,
        });
    }

    let mut ambiguous = Vec::with_capacity(resolution.ambiguous.len());
    for group in resolution.ambiguous {
        let left_record = take_slot(&mut left_slots, group.left, "left");
        let candidates: Vec<MatchCandidate> = group
            .candidates
            .into_iter()
            .map(|candidate| {
                let right_record = take_slot(&mut right_slots, candidate.right, "right");
                MatchCandidate {
                    left_id: left_record.id.clone(),
                    right_id: right_record.id,
                    tier: candidate.tier,
                    score: candidate.score,
                }
            })
            .collect();
        assert!(
            !candidates.is_empty(),
            "partition invariant violated: empty ambiguous group for left record {}",
            left_record.id
        );
        ambiguous.push(candidates);
    }

    for &left_index in &resolution.unmatched_left {
        assert!(
            left_slots[left_index].is_some(),
            "partition invariant violated: left record #{left_index} is both unmatched and claimed"
        );
    }

    let unmatched_left: Vec<Record> = left_slots.into_iter().flatten().collect();
    let unmatched_right: Vec<Record> = right_slots.into_iter().flatten().collect();

    let result = ComparisonResult {
        matched,
        ambiguous,
        unmatched_left,
        unmatched_right,
    };
    validate_partition(&result, left_total, right_total);
    result
}

/// Takes a record out of its slot; a second take means two output buckets
/// claimed the same record.
fn take_slot(slots: &mut [Option<Record>], index: usize, side: &str) -> Record {
    slots[index].take().unwrap_or_else(|| {
        panic!("partition invariant violated: {side} record #{index} claimed twice")
    })
}

/// Exhaustive-partition check: record counts add up and no id appears in
/// more than one bucket.
fn validate_partition(result: &ComparisonResult, left_total: usize, right_total: usize) {
    let ambiguous_rights: usize = result.ambiguous.iter().map(Vec::len).sum();
    let left_seen = result.matched.len() + result.ambiguous.len() + result.unmatched_left.len();
    let right_seen = result.matched.len() + ambiguous_rights + result.unmatched_right.len();
    assert!(
        left_seen == left_total && right_seen == right_total,
        "partition invariant violated: {left_seen}/{left_total} left and \
         {right_seen}/{right_total} right records accounted for"
    );

    let mut left_ids = HashSet::with_capacity(left_total);
    let mut right_ids = HashSet::with_capacity(right_total);
    let mut unique = true;
    for pair in &result.matched {
        unique &= left_ids.insert(pair.left.id.as_str());
        unique &= right_ids.insert(pair.right.id.as_str());
    }
    for group in &result.ambiguous {
        unique &= left_ids.insert(group[0].left_id.as_str());
        for candidate in group {
            unique &= right_ids.insert(candidate.right_id.as_str());
        }
    }
    for record in &result.unmatched_left {
        unique &= left_ids.insert(record.id.as_str());
    }
    for record in &result.unmatched_right {
        unique &= right_ids.insert(record.id.as_str());
    }
    assert!(
        unique,
        "partition invariant violated: a record id appears in more than one bucket"
    );
}
