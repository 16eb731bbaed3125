#![deny(unsafe_code)]

//! Data model for the collate collection matching engine.
//!
//! Records, field specs, matching configuration, and result types shared by
//! the engine and its callers. The engine itself lives in `collate-match`.

pub mod config;
pub mod error;
pub mod outcome;
pub mod record;

pub use config::{DEFAULT_NUMERIC_TOLERANCE, FieldKind, FieldSpec, MatchConfig, TextMetric};
pub use error::{MatchError, Result};
pub use outcome::{
    ComparisonResult, ComparisonSummary, ConfidenceLevel, ConfidenceThresholds, MatchCandidate,
    MatchTier, MatchedPair,
};
pub use record::{FieldValue, Record};
