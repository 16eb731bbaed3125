//! Matching configuration: per-field specs, thresholds, and validation.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// Default tolerance window (in units) for numeric similarity decay.
pub const DEFAULT_NUMERIC_TOLERANCE: i64 = 5;

/// How a field participates in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Equal-or-not comparison (case-insensitive for text values).
    Exact,
    /// Fuzzy string similarity via the declared [`TextMetric`].
    Text,
    /// Linear decay over a tolerance window.
    Numeric,
}

/// Similarity metric applied to `text` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextMetric {
    /// Edit-distance ratio; good general default for short strings.
    Levenshtein,
    /// Prefix-boosted Jaro similarity; optimized for titles and names.
    JaroWinkler,
    /// Jaccard over padded 3-grams; robust on longer strings.
    Trigram,
    /// Jaccard over word tokens; robust to word reordering.
    TokenJaccard,
}

impl TextMetric {
    /// Canonical kebab-case name, as used in config files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TextMetric::Levenshtein => "levenshtein",
            TextMetric::JaroWinkler => "jaro-winkler",
            TextMetric::Trigram => "trigram",
            TextMetric::TokenJaccard => "token-jaccard",
        }
    }
}

/// Declares how one named field is compared and weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in [`crate::Record::fields`].
    pub name: String,
    pub kind: FieldKind,
    /// Positive contribution to the aggregate score. Weights need not sum
    /// to 1.0; the aggregate is normalized by the weight actually applicable
    /// to each compared pair.
    pub weight: f64,
    /// Metric for `text` fields. Defaults to Jaro-Winkler when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<TextMetric>,
    /// Tolerance window for `numeric` fields, in field units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<i64>,
}

impl FieldSpec {
    /// Declares a fuzzy text field.
    pub fn text(name: impl Into<String>, weight: f64, metric: TextMetric) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            weight,
            metric: Some(metric),
            tolerance: None,
        }
    }

    /// Declares an exact-equality field.
    pub fn exact(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Exact,
            weight,
            metric: None,
            tolerance: None,
        }
    }

    /// Declares a numeric field with the given tolerance window.
    pub fn numeric(name: impl Into<String>, weight: f64, tolerance: i64) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Numeric,
            weight,
            metric: None,
            tolerance: Some(tolerance),
        }
    }

    /// Effective metric for text fields.
    #[must_use]
    pub fn effective_metric(&self) -> TextMetric {
        self.metric.unwrap_or(TextMetric::JaroWinkler)
    }

    /// Effective tolerance for numeric fields.
    #[must_use]
    pub fn effective_tolerance(&self) -> i64 {
        self.tolerance.unwrap_or(DEFAULT_NUMERIC_TOLERANCE)
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.80
}

fn default_field_threshold() -> f64 {
    0.60
}

fn default_max_candidates() -> usize {
    5
}

fn default_ambiguity_margin() -> f64 {
    0.15
}

/// Full configuration for one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Field schema, resolved once per run.
    pub fields: Vec<FieldSpec>,
    /// Text field used for blocking and the fuzzy fast path.
    pub primary_field: String,
    /// Fields whose exact (tier 2) or normalized (tier 3) equality
    /// identifies a record, e.g. title + year.
    pub identity_fields: Vec<String>,
    /// Minimum single-field similarity for the fuzzy fast path.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Minimum weighted multi-field score to retain or commit a candidate.
    #[serde(default = "default_field_threshold")]
    pub field_threshold: f64,
    /// Cap on retained fuzzy candidates per left record.
    #[serde(default = "default_max_candidates")]
    pub max_candidates_per_record: usize,
    /// Minimum gap between best and second-best candidate scores required
    /// to auto-resolve instead of flagging for manual review.
    #[serde(default = "default_ambiguity_margin")]
    pub ambiguity_margin: f64,
}

impl MatchConfig {
    /// Creates a config with the default thresholds.
    pub fn new(
        fields: Vec<FieldSpec>,
        primary_field: impl Into<String>,
        identity_fields: Vec<String>,
    ) -> Self {
        Self {
            fields,
            primary_field: primary_field.into(),
            identity_fields,
            fuzzy_threshold: default_fuzzy_threshold(),
            field_threshold: default_field_threshold(),
            max_candidates_per_record: default_max_candidates(),
            ambiguity_margin: default_ambiguity_margin(),
        }
    }

    /// Looks up the spec for a declared field.
    #[must_use]
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// The text field with the largest weight, used by the fuzzy fast path.
    #[must_use]
    pub fn highest_weighted_text_field(&self) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .filter(|spec| spec.kind == FieldKind::Text)
            .max_by(|a, b| a.weight.total_cmp(&b.weight))
    }

    /// Hard cap on blocked candidates considered before scoring.
    #[must_use]
    pub fn blocking_cap(&self) -> usize {
        self.max_candidates_per_record * 10
    }

    /// Fails fast on invalid configuration, before any comparison begins.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(MatchError::EmptyFieldSpecs);
        }
        for (name, value) in [
            ("fuzzy_threshold", self.fuzzy_threshold),
            ("field_threshold", self.field_threshold),
            ("ambiguity_margin", self.ambiguity_margin),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(MatchError::ThresholdOutOfRange { name, value });
            }
        }
        if self.max_candidates_per_record < 1 {
            return Err(MatchError::InvalidCandidateCap);
        }
        for spec in &self.fields {
            if spec.weight <= 0.0 || spec.weight.is_nan() {
                return Err(MatchError::NonPositiveWeight {
                    field: spec.name.clone(),
                    weight: spec.weight,
                });
            }
        }
        for field in &self.identity_fields {
            if self.field_spec(field).is_none() {
                return Err(MatchError::UnknownField {
                    field: field.clone(),
                    context: "identity_fields",
                });
            }
        }
        match self.field_spec(&self.primary_field) {
            None => Err(MatchError::UnknownField {
                field: self.primary_field.clone(),
                context: "primary_field",
            }),
            Some(spec) if spec.kind != FieldKind::Text => Err(MatchError::PrimaryFieldNotText {
                field: self.primary_field.clone(),
            }),
            Some(_) => Ok(()),
        }
    }
}
