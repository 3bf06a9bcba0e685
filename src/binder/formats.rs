//! Decoders for the supported data source formats.

use super::value::{BoundValue, Record};
use anyhow::{Context, bail};
use serde_json::Value;
use std::fmt;

/// Declared format of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Json,
    Csv,
    Text,
}

impl DataFormat {
    /// Parse a `format` attribute value (ASCII case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "text" | "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Csv => "csv",
            DataFormat::Text => "text",
        }
    }

    /// Decode file content into a bound value.
    pub fn decode(self, content: &str) -> anyhow::Result<BoundValue> {
        match self {
            DataFormat::Json => decode_json(content),
            DataFormat::Csv => decode_csv(content),
            DataFormat::Text => Ok(BoundValue::Text(content.to_string())),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON: an array of objects becomes records, an object a single record,
/// anything else a scalar.
fn decode_json(content: &str) -> anyhow::Result<BoundValue> {
    let root: Value = serde_json::from_str(content).context("invalid JSON")?;

    let value = match root {
        Value::Array(items) if items.iter().all(Value::is_object) => BoundValue::Records(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(object_record)
                .collect(),
        ),
        Value::Object(map) => BoundValue::Record(object_record(&map)),
        other => BoundValue::Scalar(json_scalar(&other)),
    };
    Ok(value)
}

fn object_record(map: &serde_json::Map<String, Value>) -> Record {
    map.iter()
        .map(|(key, value)| (key.clone(), json_scalar(value)))
        .collect()
}

/// Stringify a JSON value: strings unquoted, null empty, the rest as JSON.
fn json_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// CSV: the header row names the fields; every later row is one record.
/// Values stay strings.
fn decode_csv(content: &str) -> anyhow::Result<BoundValue> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("invalid CSV header row")?.clone();
    if headers.is_empty() {
        bail!("missing header row");
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("invalid CSV data row {}", i + 1))?;
        rows.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect(),
        );
    }

    Ok(BoundValue::Records(rows))
}
