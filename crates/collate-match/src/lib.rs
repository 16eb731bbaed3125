#![deny(unsafe_code)]

//! Collection matching engine.
//!
//! Given two independently-sourced record sets, determines which records
//! refer to the same real-world entity. Matching runs in tiers (exact-id →
//! exact-key → normalized-key → blocked fuzzy/multi-field); ambiguous
//! many-to-many candidates are resolved greedily by score, with near-ties
//! surfaced for manual review instead of being guessed at.
//!
//! The engine is a pure, synchronous computation: no I/O, no shared state,
//! nothing persisted between calls.
//!
//! ```
//! use collate_match::compare;
//! use collate_model::{FieldSpec, MatchConfig, Record, TextMetric};
//!
//! let config = MatchConfig::new(
//!     vec![FieldSpec::text("title", 1.0, TextMetric::JaroWinkler)],
//!     "title",
//!     vec!["title".to_string()],
//! );
//! let left = vec![Record::new("1").with_text("title", "Pac-Man")];
//! let right = vec![Record::new("1").with_text("title", "Pac-Man")];
//! let result = compare(left, right, &config).unwrap();
//! assert_eq!(result.matched.len(), 1);
//! ```

pub mod blocking;
pub mod comparator;
pub mod normalize;
pub mod similarity;

mod builder;
mod pipeline;
mod resolver;

use tracing::info;

use collate_model::{ComparisonResult, MatchConfig, Record, Result};

/// Compares two collections and partitions every record into matched pairs,
/// ambiguous groups, or the unmatched lists.
///
/// Fails fast with a configuration error before any comparison begins;
/// never returns a partially processed result.
///
/// # Panics
///
/// Panics if the internal partition invariant is violated; that indicates a
/// bug in the engine, not bad input.
pub fn compare(
    left: Vec<Record>,
    right: Vec<Record>,
    config: &MatchConfig,
) -> Result<ComparisonResult> {
    config.validate()?;
    let output = pipeline::run(&left, &right, config);
    let resolution = resolver::resolve(&output, config, right.len());
    let result = builder::build(left, right, output, resolution);
    info!(
        matched = result.matched.len(),
        ambiguous = result.ambiguous.len(),
        unmatched_left = result.unmatched_left.len(),
        unmatched_right = result.unmatched_right.len(),
        "comparison complete"
    );
    Ok(result)
}
