//! Weighted multi-field comparison of one record pair.
//!
//! Fields absent on either side are excluded from both numerator and
//! denominator, so the aggregate is always normalized by the weight that
//! actually applied. A field whose runtime value type disagrees with its
//! declared kind is likewise excluded for that pair (and logged), rather
//! than aborting the comparison: one malformed field must not sink an
//! entire collection comparison.

use tracing::warn;

use collate_model::{FieldKind, FieldSpec, FieldValue, MatchConfig, Record};

use crate::similarity::{numeric_similarity, text_similarity};

/// Aggregate score plus the fields that contributed non-zero similarity.
#[derive(Debug, Clone)]
pub struct PairScore {
    /// Weighted aggregate in `[0.0, 1.0]`; `0.0` when no field was
    /// comparable on both sides.
    pub score: f64,
    pub matched_fields: Vec<String>,
}

/// Per-field contribution, for audit output.
#[derive(Debug, Clone)]
pub struct FieldBreakdown {
    pub field: String,
    pub similarity: f64,
    pub weight: f64,
}

/// Scores one (left, right) pair across all configured fields.
#[must_use]
pub fn score_pair(left: &Record, right: &Record, config: &MatchConfig) -> PairScore {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut matched_fields = Vec::new();
    for spec in &config.fields {
        let Some(similarity) = field_similarity(left, right, spec) else {
            continue;
        };
        numerator += similarity * spec.weight;
        denominator += spec.weight;
        if similarity > 0.0 {
            matched_fields.push(spec.name.clone());
        }
    }
    let score = if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    };
    PairScore {
        score,
        matched_fields,
    }
}

/// Per-field audit breakdown for one pair; skips fields that were not
/// comparable on both sides.
#[must_use]
pub fn explain_pair(left: &Record, right: &Record, config: &MatchConfig) -> Vec<FieldBreakdown> {
    config
        .fields
        .iter()
        .filter_map(|spec| {
            field_similarity(left, right, spec).map(|similarity| FieldBreakdown {
                field: spec.name.clone(),
                similarity,
                weight: spec.weight,
            })
        })
        .collect()
}

/// Similarity of the highest-weighted text field alone, the tier-4 fast
/// path. `None` when either side lacks the field.
#[must_use]
pub fn primary_text_similarity(
    left: &Record,
    right: &Record,
    config: &MatchConfig,
) -> Option<f64> {
    let spec = config.highest_weighted_text_field()?;
    let left_value = left.text(&spec.name)?;
    let right_value = right.text(&spec.name)?;
    Some(text_similarity(spec.effective_metric(), left_value, right_value))
}

/// Similarity for one field, or `None` when the field is not comparable on
/// both sides (absent or type-mismatched).
fn field_similarity(left: &Record, right: &Record, spec: &FieldSpec) -> Option<f64> {
    let left_value = typed_value(left, spec)?;
    let right_value = typed_value(right, spec)?;
    let similarity = match spec.kind {
        FieldKind::Exact => exact_similarity(left_value, right_value),
        FieldKind::Text => text_similarity(
            spec.effective_metric(),
            left_value.as_text().unwrap_or_default(),
            right_value.as_text().unwrap_or_default(),
        ),
        FieldKind::Numeric => numeric_similarity(
            left_value.as_integer().unwrap_or_default(),
            right_value.as_integer().unwrap_or_default(),
            spec.effective_tolerance(),
        ),
    };
    Some(similarity)
}

/// Fetches a record's value for the spec, excluding it on type mismatch.
fn typed_value<'a>(record: &'a Record, spec: &FieldSpec) -> Option<&'a FieldValue> {
    let value = record.field(&spec.name)?;
    let compatible = match spec.kind {
        FieldKind::Exact => true,
        FieldKind::Text => matches!(value, FieldValue::Text(_)),
        FieldKind::Numeric => matches!(value, FieldValue::Integer(_)),
    };
    if compatible {
        Some(value)
    } else {
        warn!(
            record_id = %record.id,
            field = %spec.name,
            declared = ?spec.kind,
            actual = value.type_name(),
            "field value type disagrees with its spec, excluding from scoring"
        );
        None
    }
}

fn exact_similarity(left: &FieldValue, right: &FieldValue) -> f64 {
    let equal = match (left, right) {
        (FieldValue::Text(a), FieldValue::Text(b)) => a.to_lowercase() == b.to_lowercase(),
        (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
        (FieldValue::Url(a), FieldValue::Url(b)) => a == b,
        _ => false,
    };
    if equal { 1.0 } else { 0.0 }
}
