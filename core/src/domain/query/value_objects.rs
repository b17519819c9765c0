use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::common::entities::app_errors::CoreError;

static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid path regex")
});

static LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]{2,8})*$").expect("valid language regex")
});

/// Language sentinel selecting the raw translation map.
pub const ALL_LANGUAGES: &str = "all";

/// Whether `path` is a dot-separated list of identifiers.
pub fn is_valid_path(path: &str) -> bool {
    PATH_RE.is_match(path)
}

/// Filter operator of the filter mini-language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Eq,    // =
    Neq,   // !=
    Lt,    // <
    Lte,   // <=
    Gt,    // >
    Gte,   // >=
    Lk,    // ~=
    In,    // |=  values separated by `|`
    InAlt, // *=  values separated by `*`
}

impl FilterOperator {
    /// Two-character operators come first so they win over their one-character prefix.
    pub const ALL: [FilterOperator; 9] = [
        FilterOperator::Neq,
        FilterOperator::Lte,
        FilterOperator::Gte,
        FilterOperator::Lk,
        FilterOperator::In,
        FilterOperator::InAlt,
        FilterOperator::Eq,
        FilterOperator::Lt,
        FilterOperator::Gt,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Neq => "!=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lk => "~=",
            FilterOperator::In => "|=",
            FilterOperator::InAlt => "*=",
        }
    }

    /// Element separator for list operators.
    pub fn separator(&self) -> Option<char> {
        match self {
            FilterOperator::In => Some('|'),
            FilterOperator::InAlt => Some('*'),
            _ => None,
        }
    }
}

impl FromStr for FilterOperator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| CoreError::UnsupportedOperator(s.to_string()))
    }
}

/// Filter condition on a dotted path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub operation: FilterOperator,
    pub value: String,
}

impl Filter {
    pub fn new(name: impl Into<String>, operation: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation,
            value: value.into(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, self.operation.symbol(), self.value)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort clause for a single dotted path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub name: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A language code safe to embed in a JSON path literal, or `all`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        if raw == ALL_LANGUAGES || LANGUAGE_RE.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(CoreError::InvalidLanguage(raw.to_string()))
        }
    }

    pub fn all() -> Self {
        Self(ALL_LANGUAGES.to_string())
    }

    pub fn is_all(&self) -> bool {
        self.0 == ALL_LANGUAGES
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LanguageCode::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a list request asks for: built once per request, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub q: Option<String>,
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    pub fields: Vec<String>,
    pub preloads: Vec<String>,
    pub offset: u64,
    pub limit: Option<u64>,
    pub language: Option<LanguageCode>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.q = Some(term.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn preload(mut self, path: impl Into<String>) -> Self {
        self.preloads.push(path.into());
        self
    }

    pub fn paginate(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn language(mut self, language: LanguageCode) -> Self {
        self.language = Some(language);
        self
    }
}
