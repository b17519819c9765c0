//! Parsers for the filter and sort mini-languages.
//!
//! A filter is `<path><operator><value>` with the operator one of
//! `= != < <= > >= ~= |= *=`; a sort clause is `[-+ ]<path>`. Both come
//! comma-joined from clients, so commas cannot appear inside values.

use crate::domain::{
    common::entities::app_errors::CoreError,
    query::value_objects::{Filter, FilterOperator, Sort, SortDirection, is_valid_path},
};

const OPERATOR_CHARS: &[char] = &['=', '!', '<', '>', '~', '|', '*'];

pub fn parse_filter(raw: &str) -> Result<Filter, CoreError> {
    let raw = raw.trim_start();
    let start = raw
        .find(OPERATOR_CHARS)
        .ok_or_else(|| CoreError::UnsupportedOperator(raw.to_string()))?;

    let (path, rest) = raw.split_at(start);
    let path = path.trim();

    let operation = FilterOperator::ALL
        .into_iter()
        .find(|op| rest.starts_with(op.symbol()))
        .ok_or_else(|| CoreError::UnsupportedOperator(raw.to_string()))?;
    let value = &rest[operation.symbol().len()..];

    if !is_valid_path(path) {
        return Err(CoreError::InvalidFilter {
            filter: raw.to_string(),
            reason: format!("`{path}` is not a valid field path"),
        });
    }

    if value.is_empty() {
        return Err(CoreError::InvalidFilter {
            filter: raw.to_string(),
            reason: "empty value".to_string(),
        });
    }

    Ok(Filter::new(path, operation, value))
}

/// Parse comma-joined filters like `Name~=%ann%,Age>=18`
pub fn parse_filters(raw: &str) -> Result<Vec<Filter>, CoreError> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_filter)
        .collect()
}

pub fn parse_sort(raw: &str) -> Result<Sort, CoreError> {
    let (direction, path) = match raw.chars().next() {
        Some('-') => (SortDirection::Desc, &raw[1..]),
        Some('+') | Some(' ') => (SortDirection::Asc, &raw[1..]),
        _ => (SortDirection::Asc, raw),
    };
    let path = path.trim();

    if !is_valid_path(path) {
        return Err(CoreError::InvalidSort {
            sort: raw.to_string(),
            reason: format!("`{path}` is not a valid field path"),
        });
    }

    Ok(Sort {
        name: path.to_string(),
        direction,
    })
}

/// Parse sort string like "field1,-field2,+field3"
pub fn parse_sorts(raw: &str) -> Result<Vec<Sort>, CoreError> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse_sort(part.trim_start()))
        .collect()
}
