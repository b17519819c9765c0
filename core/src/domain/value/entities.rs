use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage kind of a column, deciding how raw filter text is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    String,
    Int,
    Uint,
    Float,
    Bool,
    Time,
    Uuid,
    /// Arbitrary JSON document; sub-paths are addressable with `field.key`.
    Json,
    /// JSON map from language code to localized text.
    Translations,
}

impl ColumnKind {
    pub fn is_json(&self) -> bool {
        matches!(self, ColumnKind::Json | ColumnKind::Translations)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::String => "string",
            ColumnKind::Int => "int",
            ColumnKind::Uint => "uint",
            ColumnKind::Float => "float",
            ColumnKind::Bool => "bool",
            ColumnKind::Time => "time",
            ColumnKind::Uuid => "uuid",
            ColumnKind::Json => "json",
            ColumnKind::Translations => "translations",
        };
        f.write_str(name)
    }
}

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
    Uuid(Uuid),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::String(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        SqlValue::Uint(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}
