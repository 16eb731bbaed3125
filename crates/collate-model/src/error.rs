use thiserror::Error;

/// Errors surfaced before any comparison begins.
///
/// Configuration problems always fail fast; a partially processed comparison
/// is never returned. Type mismatches between a field value and its declared
/// kind are deliberately *not* represented here: the comparator excludes the
/// offending field from scoring for that pair instead of aborting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("no field specs configured")]
    EmptyFieldSpecs,
    #[error("threshold '{name}' out of range: {value} (expected 0.0..=1.0)")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("max_candidates_per_record must be at least 1")]
    InvalidCandidateCap,
    #[error("field '{field}' has non-positive weight {weight}")]
    NonPositiveWeight { field: String, weight: f64 },
    #[error("{context} references field '{field}', which is not declared in any field spec")]
    UnknownField {
        field: String,
        context: &'static str,
    },
    #[error("primary field '{field}' must be declared with kind 'text'")]
    PrimaryFieldNotText { field: String },
}

pub type Result<T> = std::result::Result<T, MatchError>;
