//! Collection file parsing and validation.
//!
//! Schema validation and field typing happen here, before the engine is
//! invoked: the engine itself only accepts already-typed records. Each
//! collection file is a JSON array of flat objects with a string `id` and
//! scalar fields.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;
use tracing::debug;

use collate_model::{FieldKind, FieldSpec, FieldValue, MatchConfig, Record, TextMetric};

/// Built-in schema for game-style collections: title, year, platform.
pub fn default_config() -> MatchConfig {
    MatchConfig::new(
        vec![
            FieldSpec::text("title", 3.0, TextMetric::JaroWinkler),
            FieldSpec::numeric("year", 1.0, 5),
            FieldSpec::exact("platform", 1.0),
        ],
        "title",
        vec!["title".to_string(), "year".to_string()],
    )
}

/// Loads the match config from a file, or the built-in default.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<MatchConfig> {
    let Some(path) = path else {
        return Ok(default_config());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: MatchConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Loads and validates one collection file.
pub fn load_collection(path: &Path, config: &MatchConfig) -> anyhow::Result<Vec<Record>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading collection {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing collection {}", path.display()))?;
    let records = parse_collection(&value, config)
        .with_context(|| format!("validating collection {}", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "collection loaded");
    Ok(records)
}

/// Converts a parsed JSON array into typed records, enforcing unique string
/// ids and coercing declared numeric fields.
pub fn parse_collection(value: &Value, config: &MatchConfig) -> anyhow::Result<Vec<Record>> {
    let Some(items) = value.as_array() else {
        bail!("expected a JSON array of records");
    };
    let mut seen_ids = BTreeSet::new();
    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            bail!("record #{position} is not a JSON object");
        };
        let id = match object.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => bail!("record #{position} has no usable 'id'"),
        };
        if !seen_ids.insert(id.clone()) {
            bail!("duplicate record id '{id}'");
        }
        let mut record = Record::new(id);
        for (name, field) in object {
            if name == "id" {
                continue;
            }
            if let Some(value) = field_value(name, field, config) {
                record.fields.insert(name.clone(), value);
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// Types one JSON scalar. Nulls and structured values are dropped; the
/// engine treats missing fields as null anyway.
fn field_value(name: &str, raw: &Value, config: &MatchConfig) -> Option<FieldValue> {
    let declared = config.field_spec(name).map(|spec| spec.kind);
    match raw {
        Value::String(text) => {
            // Numeric-declared fields arriving as digit strings are coerced
            // here so the engine never sees the mismatch.
            if declared == Some(FieldKind::Numeric)
                && let Ok(number) = text.trim().parse::<i64>()
            {
                return Some(FieldValue::Integer(number));
            }
            if text.starts_with("http://") || text.starts_with("https://") {
                return Some(FieldValue::Url(text.clone()));
            }
            Some(FieldValue::Text(text.clone()))
        }
        Value::Number(number) => number.as_i64().map(FieldValue::Integer),
        _ => None,
    }
}
