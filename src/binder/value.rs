//! Materialized data produced by resolving data sources.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// One row of tabular data: field name to string value.
pub type Record = BTreeMap<String, String>;

/// A resolved data source value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BoundValue {
    /// A single string (JSON scalars, stringified).
    Scalar(String),
    /// A single mapping (JSON root object).
    Record(Record),
    /// Ordered rows (CSV, or a JSON array of objects). The only iterable value.
    Records(Vec<Record>),
    /// Opaque text blob (plain text files).
    Text(String),
}

impl BoundValue {
    /// Article-prefixed kind name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            BoundValue::Scalar(_) => "a scalar",
            BoundValue::Record(_) => "a record",
            BoundValue::Records(_) => "a sequence of records",
            BoundValue::Text(_) => "a text blob",
        }
    }

    /// Truthiness for `{{#if}}`: empty strings and empty sequences are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            BoundValue::Scalar(s) | BoundValue::Text(s) => !s.is_empty(),
            BoundValue::Record(_) => true,
            BoundValue::Records(rows) => !rows.is_empty(),
        }
    }

    /// Text substituted for a plain `{{name}}` reference.
    ///
    /// Scalars and text are verbatim; records are compact JSON.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            BoundValue::Scalar(s) | BoundValue::Text(s) => Cow::Borrowed(s),
            BoundValue::Record(record) => Cow::Owned(record_json(record)),
            BoundValue::Records(rows) => {
                Cow::Owned(serde_json::to_string(rows).unwrap_or_default())
            }
        }
    }
}

/// Compact JSON form of a single record.
pub fn record_json(record: &Record) -> String {
    serde_json::to_string(record).unwrap_or_default()
}

/// Binding name to bound value for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, BoundValue>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Insert a value, returning the previous value under that name.
    pub fn insert(&mut self, name: impl Into<String>, value: BoundValue) -> Option<BoundValue> {
        self.values.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Binding names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, BoundValue)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, BoundValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
