use ferrisql_core::domain::{
    common::entities::app_errors::CoreError,
    query::{LanguageCode, QuerySpec, parse_filters, parse_sorts},
};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub offset: u64,
    pub limit: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl PaginationParams {
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            offset: offset.unwrap_or(0).max(0) as u64,
            limit: limit
                .unwrap_or(DEFAULT_LIMIT as i64)
                .clamp(1, MAX_LIMIT as i64) as u64,
        }
    }
}

/// Builds a [`QuerySpec`] from decoded query-string pairs.
///
/// Handles:
/// - `_q=term` free-text search
/// - `_filter=Name~=%ann%,Age>=18` (repeatable, order preserved)
/// - `_sort=-CreatedAt,Title`
/// - `_fields=ID,Title` and `_preload=Author.Profile`
/// - `_offset=0`, `_limit=20`
/// - `_lang=en` or `_lang=all`
///
/// Other keys are left to the handler.
pub fn from_query_pairs(pairs: &[(String, String)]) -> Result<QuerySpec, CoreError> {
    let mut spec = QuerySpec::new();
    let mut offset: Option<i64> = None;
    let mut limit: Option<i64> = None;

    for (key, value) in pairs {
        match key.as_str() {
            "_q" => {
                let term = value.trim();
                spec.q = (!term.is_empty()).then(|| term.to_string());
            }
            "_filter" => spec.filters.extend(parse_filters(value)?),
            "_sort" => spec.sorts.extend(parse_sorts(value)?),
            "_fields" => spec.fields.extend(split_list(value)),
            "_preload" => spec.preloads.extend(split_list(value)),
            "_offset" => offset = value.trim().parse().ok(),
            "_limit" => limit = value.trim().parse().ok(),
            "_lang" if !value.trim().is_empty() => {
                spec.language = Some(LanguageCode::parse(value)?);
            }
            _ => {}
        }
    }

    let pagination = PaginationParams::new(offset, limit);
    Ok(spec.paginate(pagination.offset, pagination.limit))
}

fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

/// Helper trait for building a [`QuerySpec`] from query pairs
pub trait QueryParamsExt {
    fn parse_query_spec(&self) -> Result<QuerySpec, CoreError>;
}

impl QueryParamsExt for [(String, String)] {
    fn parse_query_spec(&self) -> Result<QuerySpec, CoreError> {
        from_query_pairs(self)
    }
}

impl QueryParamsExt for Vec<(String, String)> {
    fn parse_query_spec(&self) -> Result<QuerySpec, CoreError> {
        from_query_pairs(self)
    }
}

#[cfg(test)]
mod tests {
    use ferrisql_core::domain::query::{Filter, FilterOperator, Sort};

    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_filters_keep_order_across_keys() {
        let spec = pairs(&[
            ("_filter", "Title~=%rust%,Views>=10"),
            ("_filter", "Author.Name=Ann"),
        ])
        .parse_query_spec()
        .unwrap();

        assert_eq!(
            spec.filters,
            vec![
                Filter::new("Title", FilterOperator::Lk, "%rust%"),
                Filter::new("Views", FilterOperator::Gte, "10"),
                Filter::new("Author.Name", FilterOperator::Eq, "Ann"),
            ]
        );
    }

    #[test]
    fn test_sort_fields_preloads() {
        let spec = from_query_pairs(&pairs(&[
            ("_sort", "-CreatedAt,Title"),
            ("_fields", "ID, Title,"),
            ("_preload", "Author.Profile,Tags"),
            ("_q", "  rust "),
            ("_lang", "fr"),
        ]))
        .unwrap();

        assert_eq!(spec.sorts, vec![Sort::desc("CreatedAt"), Sort::asc("Title")]);
        assert_eq!(spec.fields, vec!["ID", "Title"]);
        assert_eq!(spec.preloads, vec!["Author.Profile", "Tags"]);
        assert_eq!(spec.q.as_deref(), Some("rust"));
        assert_eq!(spec.language.unwrap().as_str(), "fr");
    }

    #[test]
    fn test_pagination_defaults_and_clamp() {
        let spec = from_query_pairs(&[]).unwrap();
        assert_eq!((spec.offset, spec.limit), (0, Some(DEFAULT_LIMIT)));

        let spec = from_query_pairs(&pairs(&[("_offset", "-5"), ("_limit", "500")])).unwrap();
        assert_eq!((spec.offset, spec.limit), (0, Some(MAX_LIMIT)));

        let spec = from_query_pairs(&pairs(&[("_offset", "40"), ("_limit", "abc")])).unwrap();
        assert_eq!((spec.offset, spec.limit), (40, Some(DEFAULT_LIMIT)));
    }

    #[test]
    fn test_invalid_input() {
        let err = from_query_pairs(&pairs(&[("_filter", "Title=")])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilter { .. }));

        let err = from_query_pairs(&pairs(&[("_filter", "Title")])).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedOperator(_)));

        let err = from_query_pairs(&pairs(&[("_lang", "en'")])).unwrap_err();
        assert_eq!(err, CoreError::InvalidLanguage("en'".to_string()));
    }

    #[test]
    fn test_unrelated_keys_ignored() {
        let spec = from_query_pairs(&pairs(&[("page", "2"), ("sort", "Title")])).unwrap();
        assert!(spec.sorts.is_empty());
    }
}
