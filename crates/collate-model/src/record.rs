//! Input records: an opaque id plus a typed field map.
//!
//! Records are immutable inputs to the engine. Loosely-typed source data is
//! resolved into [`FieldValue`]s by the caller before comparison; per-field
//! lookup returns an `Option` instead of relying on duck-typed access.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A typed value carried by a record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// UTF-8 text (titles, names, publishers).
    Text(String),
    /// Integer scalar (years, counts).
    Integer(i64),
    /// A URL, compared verbatim when used with an exact field.
    Url(String),
}

impl FieldValue {
    /// Returns the text content for [`FieldValue::Text`] values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content for [`FieldValue::Integer`] values.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the URL content for [`FieldValue::Url`] values.
    #[must_use]
    pub fn as_url(&self) -> Option<&str> {
        match self {
            FieldValue::Url(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the runtime type, used in mismatch logging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Url(_) => "url",
        }
    }
}

/// A single record from one collection.
///
/// `id` is unique within its own collection. Fields absent from the map are
/// treated as null by the comparator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates a record with no fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Builder-style text field insertion.
    #[must_use]
    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(name, FieldValue::Text(value.into()))
    }

    /// Builder-style integer field insertion.
    #[must_use]
    pub fn with_integer(self, name: impl Into<String>, value: i64) -> Self {
        self.with_field(name, FieldValue::Integer(value))
    }

    /// Looks up a field value by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Looks up a field and narrows it to text.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_text)
    }

    /// Looks up a field and narrows it to an integer.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(FieldValue::as_integer)
    }
}
