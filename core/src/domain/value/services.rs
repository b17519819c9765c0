use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    query::value_objects::{Filter, FilterOperator},
    value::entities::{ColumnKind, SqlValue},
};

const NULL_SENTINELS: [&str; 3] = ["NULL", "null", "nil"];

pub fn is_null_sentinel(value: &str) -> bool {
    NULL_SENTINELS.contains(&value)
}

/// Converts one raw value to the parameter bound for a column of `kind`.
///
/// `filter` only names the offending filter in the error.
pub fn convert(kind: ColumnKind, raw: &str, filter: &str) -> Result<SqlValue, CoreError> {
    let failed = || CoreError::TypeConversion {
        filter: filter.to_string(),
        value: raw.to_string(),
        kind,
    };

    match kind {
        ColumnKind::String | ColumnKind::Json | ColumnKind::Translations => {
            Ok(SqlValue::String(raw.to_string()))
        }
        ColumnKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(SqlValue::Int)
            .map_err(|_| failed()),
        ColumnKind::Uint => raw
            .trim()
            .parse::<u64>()
            .map(SqlValue::Uint)
            .map_err(|_| failed()),
        ColumnKind::Float => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(SqlValue::Float(value)),
            _ => Err(failed()),
        },
        ColumnKind::Bool => parse_bool(raw.trim()).map(SqlValue::Bool).ok_or_else(failed),
        ColumnKind::Time => parse_time(raw.trim()).map(SqlValue::Time).ok_or_else(failed),
        ColumnKind::Uuid => Uuid::parse_str(raw.trim())
            .map(SqlValue::Uuid)
            .map_err(|_| failed()),
    }
}

/// Converts a filter value following operator semantics: `LK` always binds
/// the raw text, every other operator binds the column kind.
pub fn convert_for(filter: &Filter, kind: ColumnKind, raw: &str) -> Result<SqlValue, CoreError> {
    match filter.operation {
        FilterOperator::Lk => Ok(SqlValue::String(raw.to_string())),
        _ => convert(kind, raw, &filter.name),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.with_timezone(&Utc));
    }
    if let Ok(value) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(value.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}
