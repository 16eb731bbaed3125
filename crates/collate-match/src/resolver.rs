//! Conflict resolution for tier-4 candidates.
//!
//! Ambiguity is checked per left record first: when the best and
//! second-best candidate scores sit within the ambiguity margin, the group
//! is surfaced for manual review instead of being auto-committed. Remaining
//! candidates are assigned greedily in descending score order (first come,
//! first served on ties, keyed to input order) rather than by optimal
//! bipartite matching; this is a deliberate speed/complexity trade-off.

use std::collections::HashSet;

use tracing::debug;

use collate_model::{MatchConfig, MatchTier};

use crate::pipeline::{FuzzyCandidate, PipelineOutput};

/// A committed tier-4 pairing.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedPair {
    pub left: usize,
    pub right: usize,
    pub tier: MatchTier,
    pub score: f64,
    pub matched_fields: Vec<String>,
}

/// An unresolved group: one left record with several near-equal candidates.
#[derive(Debug, Clone)]
pub(crate) struct AmbiguousGroup {
    pub left: usize,
    pub candidates: Vec<FuzzyCandidate>,
}

#[derive(Debug)]
pub(crate) struct Resolution {
    pub committed: Vec<ResolvedPair>,
    pub ambiguous: Vec<AmbiguousGroup>,
    pub unmatched_left: Vec<usize>,
}

pub(crate) fn resolve(
    output: &PipelineOutput,
    config: &MatchConfig,
    right_len: usize,
) -> Resolution {
    let mut taken_right = vec![false; right_len];
    for pair in &output.exact {
        taken_right[pair.right] = true;
    }

    // Split lefts by the ambiguity margin. Candidate lists arrive sorted
    // descending by score.
    let mut clear: Vec<(usize, &[FuzzyCandidate])> = Vec::new();
    let mut contested: Vec<(usize, &[FuzzyCandidate])> = Vec::new();
    let mut unmatched_left = Vec::new();
    for (left, candidates) in &output.fuzzy {
        if candidates.is_empty() {
            unmatched_left.push(*left);
        } else if is_ambiguous(candidates, config.ambiguity_margin) {
            contested.push((*left, candidates));
        } else {
            clear.push((*left, candidates));
        }
    }

    // Greedy global assignment over the clear lefts: highest score first,
    // ties broken by left then right input order.
    let mut edges: Vec<(usize, &FuzzyCandidate)> = clear
        .iter()
        .flat_map(|(left, candidates)| candidates.iter().map(move |c| (*left, c)))
        .collect();
    edges.sort_by(|a, b| {
        b.1.score
            .total_cmp(&a.1.score)
            .then(a.0.cmp(&b.0))
            .then(a.1.right.cmp(&b.1.right))
    });

    let mut committed = Vec::new();
    let mut taken_left: HashSet<usize> = HashSet::new();
    for (left, candidate) in edges {
        if taken_left.contains(&left) || taken_right[candidate.right] {
            continue;
        }
        if candidate.score < config.field_threshold {
            continue;
        }
        taken_left.insert(left);
        taken_right[candidate.right] = true;
        committed.push(ResolvedPair {
            left,
            right: candidate.right,
            tier: candidate.tier,
            score: candidate.score,
            matched_fields: candidate.matched_fields.clone(),
        });
    }
    for (left, _) in &clear {
        if !taken_left.contains(left) {
            unmatched_left.push(*left);
        }
    }

    // Contested lefts, in input order. Commits elsewhere may have consumed
    // some of their candidates; re-evaluate against what is still free.
    let mut ambiguous = Vec::new();
    for (left, candidates) in contested {
        let live: Vec<FuzzyCandidate> = candidates
            .iter()
            .filter(|c| !taken_right[c.right])
            .cloned()
            .collect();
        if live.is_empty() {
            unmatched_left.push(left);
        } else if is_ambiguous(&live, config.ambiguity_margin) {
            // Reserve every still-free candidate within the margin of the
            // best; the user decides.
            let best = live[0].score;
            let group: Vec<FuzzyCandidate> = live
                .into_iter()
                .filter(|c| best - c.score < config.ambiguity_margin)
                .collect();
            for candidate in &group {
                taken_right[candidate.right] = true;
            }
            ambiguous.push(AmbiguousGroup {
                left,
                candidates: group,
            });
        } else if live[0].score >= config.field_threshold {
            // A clear winner emerged once competing rights were consumed.
            taken_right[live[0].right] = true;
            committed.push(ResolvedPair {
                left,
                right: live[0].right,
                tier: live[0].tier,
                score: live[0].score,
                matched_fields: live[0].matched_fields.clone(),
            });
        } else {
            unmatched_left.push(left);
        }
    }

    unmatched_left.sort_unstable();
    debug!(
        committed = committed.len(),
        ambiguous = ambiguous.len(),
        unmatched = unmatched_left.len(),
        "conflict resolution complete"
    );
    Resolution {
        committed,
        ambiguous,
        unmatched_left,
    }
}

/// True when the top two scores are within the margin of each other.
fn is_ambiguous(candidates: &[FuzzyCandidate], margin: f64) -> bool {
    candidates.len() >= 2 && candidates[0].score - candidates[1].score < margin
}

#[cfg(test)]
mod tests {
    use collate_model::{FieldSpec, TextMetric};

    use super::*;
    use crate::pipeline::PipelineOutput;

    fn config() -> MatchConfig {
        MatchConfig::new(
            vec![FieldSpec::text("title", 1.0, TextMetric::JaroWinkler)],
            "title",
            vec!["title".to_string()],
        )
    }

    fn candidate(right: usize, score: f64) -> FuzzyCandidate {
        FuzzyCandidate {
            right,
            tier: MatchTier::MultiField,
            score,
            matched_fields: vec!["title".to_string()],
        }
    }

    fn output(fuzzy: Vec<(usize, Vec<FuzzyCandidate>)>) -> PipelineOutput {
        PipelineOutput {
            exact: Vec::new(),
            fuzzy,
        }
    }

    #[test]
    fn greedy_takes_the_globally_best_edge_first() {
        // Both lefts want r0; l1 scores higher and must win it, leaving l0
        // its weaker alternative.
        let out = output(vec![
            (0, vec![candidate(0, 0.80), candidate(1, 0.62)]),
            (1, vec![candidate(0, 0.97)]),
        ]);
        let resolution = resolve(&out, &config(), 2);

        assert_eq!(resolution.committed.len(), 2);
        let l1 = resolution
            .committed
            .iter()
            .find(|pair| pair.left == 1)
            .expect("l1 committed");
        assert_eq!(l1.right, 0);
        let l0 = resolution
            .committed
            .iter()
            .find(|pair| pair.left == 0)
            .expect("l0 committed");
        assert_eq!(l0.right, 1);
    }

    #[test]
    fn near_equal_candidates_are_flagged_ambiguous() {
        let out = output(vec![(0, vec![candidate(0, 0.75), candidate(1, 0.70)])]);
        let resolution = resolve(&out, &config(), 2);

        assert!(resolution.committed.is_empty());
        assert!(resolution.unmatched_left.is_empty());
        assert_eq!(resolution.ambiguous.len(), 1);
        assert_eq!(resolution.ambiguous[0].left, 0);
        assert_eq!(resolution.ambiguous[0].candidates.len(), 2);
    }

    #[test]
    fn distant_second_candidate_does_not_block_commit() {
        let out = output(vec![(0, vec![candidate(0, 0.90), candidate(1, 0.62)])]);
        let resolution = resolve(&out, &config(), 2);

        assert_eq!(resolution.committed.len(), 1);
        assert_eq!(resolution.committed[0].right, 0);
        assert!(resolution.ambiguous.is_empty());
    }

    #[test]
    fn group_shrunk_to_one_live_candidate_commits() {
        // l0 is contested between r0/r1, but l1 takes r1 outright, leaving
        // l0 a single live candidate.
        let out = output(vec![
            (0, vec![candidate(0, 0.72), candidate(1, 0.70)]),
            (1, vec![candidate(1, 0.95)]),
        ]);
        let resolution = resolve(&out, &config(), 2);

        assert_eq!(resolution.committed.len(), 2);
        assert!(resolution.ambiguous.is_empty());
        let l0 = resolution
            .committed
            .iter()
            .find(|pair| pair.left == 0)
            .expect("l0 committed");
        assert_eq!(l0.right, 0);
    }

    #[test]
    fn exact_pairs_reserve_their_rights() {
        let out = PipelineOutput {
            exact: vec![crate::pipeline::ExactPair {
                left: 0,
                right: 0,
                tier: MatchTier::ExactKey,
                score: 0.95,
                matched_fields: Vec::new(),
            }],
            fuzzy: vec![(1, vec![candidate(0, 0.9)])],
        };
        let resolution = resolve(&out, &config(), 1);

        assert!(resolution.committed.is_empty());
        assert_eq!(resolution.unmatched_left, vec![1]);
    }

    #[test]
    fn empty_candidate_list_is_unmatched() {
        let out = output(vec![(0, Vec::new())]);
        let resolution = resolve(&out, &config(), 0);
        assert_eq!(resolution.unmatched_left, vec![0]);
    }
}
