//! Engine outputs: candidates, matched pairs, the comparison result, and
//! derived views (summary, confidence triage).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// The matching strategy that produced a candidate or pair.
///
/// Tiers are tried in priority order; a left record terminates at the first
/// tier that yields a candidate meeting that tier's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    /// Identical record ids. Score 1.0, always tried first.
    ExactId,
    /// Identity fields exactly equal, case-insensitively. Score 0.95.
    ExactKey,
    /// Identity fields equal after normalization. Score 0.85.
    NormalizedKey,
    /// Fast path: highest-weighted text field alone cleared the fuzzy
    /// threshold.
    Fuzzy,
    /// Full weighted multi-field score cleared the field threshold.
    MultiField,
}

impl MatchTier {
    /// Canonical kebab-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::ExactId => "exact-id",
            MatchTier::ExactKey => "exact-key",
            MatchTier::NormalizedKey => "normalized-key",
            MatchTier::Fuzzy => "fuzzy",
            MatchTier::MultiField => "multi-field",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored (left, right) pairing produced by the pipeline and consumed by
/// the conflict resolver. Surfaces in the final output only inside
/// ambiguous groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub left_id: String,
    pub right_id: String,
    pub tier: MatchTier,
    pub score: f64,
}

/// A committed one-to-one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub left: Record,
    pub right: Record,
    pub tier: MatchTier,
    /// Confidence score in `[0.0, 1.0]`.
    pub score: f64,
    /// Field names that contributed non-zero similarity, for audit display.
    pub matched_fields: Vec<String>,
}

/// Final output of one comparison run.
///
/// Every record from both inputs appears in exactly one of: some
/// [`MatchedPair`], some ambiguous group, `unmatched_left`, or
/// `unmatched_right`. The result builder asserts this partition before
/// returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub matched: Vec<MatchedPair>,
    /// Candidate groups requiring manual resolution. All candidates in a
    /// group share the same left record.
    pub ambiguous: Vec<Vec<MatchCandidate>>,
    pub unmatched_left: Vec<Record>,
    pub unmatched_right: Vec<Record>,
}

impl ComparisonResult {
    /// True when no group awaits manual resolution.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.ambiguous.is_empty()
    }

    /// Derived caller-facing view: bucket counts, per-tier counts, and
    /// average confidence over committed pairs.
    #[must_use]
    pub fn summary(&self) -> ComparisonSummary {
        let mut matched_by_tier = BTreeMap::new();
        let mut confidence_total = 0.0;
        for pair in &self.matched {
            *matched_by_tier
                .entry(pair.tier.as_str().to_owned())
                .or_insert(0) += 1;
            confidence_total += pair.score;
        }
        let average_confidence = if self.matched.is_empty() {
            0.0
        } else {
            confidence_total / self.matched.len() as f64
        };
        let ambiguous_candidates = self.ambiguous.iter().map(Vec::len).sum();
        ComparisonSummary {
            left_total: self.matched.len() + self.ambiguous.len() + self.unmatched_left.len(),
            right_total: self.matched.len()
                + ambiguous_candidates
                + self.unmatched_right.len(),
            matched: self.matched.len(),
            ambiguous_groups: self.ambiguous.len(),
            ambiguous_candidates,
            unmatched_left: self.unmatched_left.len(),
            unmatched_right: self.unmatched_right.len(),
            matched_by_tier,
            average_confidence,
        }
    }

    /// Counts committed pairs per confidence level.
    #[must_use]
    pub fn count_by_level(
        &self,
        thresholds: &ConfidenceThresholds,
    ) -> BTreeMap<ConfidenceLevel, usize> {
        let mut counts = BTreeMap::new();
        for pair in &self.matched {
            if let Some(level) = thresholds.categorize(pair.score) {
                *counts.entry(level).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Counts and aggregate confidence derived from a [`ComparisonResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub left_total: usize,
    pub right_total: usize,
    pub matched: usize,
    pub ambiguous_groups: usize,
    /// Right-side records held inside ambiguous groups.
    pub ambiguous_candidates: usize,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
    pub matched_by_tier: BTreeMap<String, usize>,
    pub average_confidence: f64,
}

/// Confidence triage for committed pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Uncertain; needs verification.
    Low,
    /// Reasonable; should be reviewed.
    Medium,
    /// Near-certain; typically correct.
    High,
}

impl ConfidenceLevel {
    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }

    /// Human-readable description of the level.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high confidence - likely correct",
            ConfidenceLevel::Medium => "medium confidence - should review",
            ConfidenceLevel::Low => "low confidence - needs verification",
        }
    }
}

/// Boundaries between confidence levels.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThresholds {
    /// Minimum score for [`ConfidenceLevel::High`] (default 0.95).
    pub high: f64,
    /// Minimum score for [`ConfidenceLevel::Medium`] (default 0.80).
    pub medium: f64,
    /// Minimum score to categorize at all (default 0.60).
    pub low: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.95,
            medium: 0.80,
            low: 0.60,
        }
    }
}

impl ConfidenceThresholds {
    /// Categorizes a score, or `None` when below the low threshold.
    #[must_use]
    pub fn categorize(&self, score: f64) -> Option<ConfidenceLevel> {
        if score >= self.high {
            Some(ConfidenceLevel::High)
        } else if score >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if score >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}
