use serde::{Deserialize, Serialize};

use crate::domain::value::entities::SqlValue;

pub const PRIMARY_KEY: &str = "ID";

/// Identifier quoting style. JSON expressions are always MySQL syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Backticks: \`column\`
    #[default]
    #[serde(rename = "mysql")]
    MySql,
    /// Double quotes: "column" (ANSI_QUOTES mode)
    Ansi,
}

impl Dialect {
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Ansi => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// `table.column`, or the bare column when `table` is empty.
    pub fn column(&self, table: &str, column: &str) -> String {
        if table.is_empty() {
            self.quote(column)
        } else {
            format!("{}.{}", self.quote(table), self.quote(column))
        }
    }
}

pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// SQL text with its positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SqlFragment {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

impl SqlFragment {
    pub fn new(sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Joins non-empty fragments with `separator`, keeping argument order.
    pub fn join(fragments: impl IntoIterator<Item = SqlFragment>, separator: &str) -> Self {
        let mut parts = Vec::new();
        let mut args = Vec::new();
        for fragment in fragments.into_iter().filter(|f| !f.is_empty()) {
            parts.push(fragment.sql);
            args.extend(fragment.args);
        }
        Self::new(parts.join(separator), args)
    }

    /// AND of the fragments, parenthesized when there is more than one.
    pub fn all(fragments: impl IntoIterator<Item = SqlFragment>) -> Self {
        Self::combine(fragments, " AND ")
    }

    /// OR of the fragments, parenthesized when there is more than one.
    pub fn any(fragments: impl IntoIterator<Item = SqlFragment>) -> Self {
        Self::combine(fragments, " OR ")
    }

    fn combine(fragments: impl IntoIterator<Item = SqlFragment>, separator: &str) -> Self {
        let fragments: Vec<SqlFragment> = fragments.into_iter().filter(|f| !f.is_empty()).collect();
        let count = fragments.len();
        let mut combined = Self::join(fragments, separator);
        if count > 1 {
            combined.sql = format!("( {} )", combined.sql);
        }
        combined
    }

    pub fn placeholders(&self) -> usize {
        self.sql.matches('?').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(Dialect::MySql.quote("Name"), "`Name`");
        assert_eq!(Dialect::MySql.quote("we`ird"), "`we``ird`");
        assert_eq!(Dialect::Ansi.quote("Name"), "\"Name\"");
        assert_eq!(Dialect::MySql.column("Post", "Title"), "`Post`.`Title`");
        assert_eq!(Dialect::MySql.column("", "Title"), "`Title`");
    }

    #[test]
    fn test_string_literal_escapes_quotes() {
        assert_eq!(string_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_combine_fragments() {
        let a = SqlFragment::new("a = ?", vec![SqlValue::Int(1)]);
        let b = SqlFragment::new("b = ?", vec![SqlValue::Int(2)]);

        let single = SqlFragment::all([a.clone(), SqlFragment::default()]);
        assert_eq!(single, a);

        let both = SqlFragment::any([a, b]);
        assert_eq!(both.sql, "( a = ? OR b = ? )");
        assert_eq!(both.args, vec![SqlValue::Int(1), SqlValue::Int(2)]);
        assert_eq!(both.placeholders(), 2);

        assert!(SqlFragment::all(Vec::new()).is_empty());
    }
}
