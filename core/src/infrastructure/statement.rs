//! Hands compiled queries to sea-orm for execution.

use sea_orm::{DbBackend, Statement, Value};

use crate::{application::CompiledQuery, domain::compiler::sql::SqlFragment, domain::value::entities::SqlValue};

impl From<SqlValue> for Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::String(v) => v.into(),
            SqlValue::Int(v) => v.into(),
            SqlValue::Uint(v) => v.into(),
            SqlValue::Float(v) => v.into(),
            SqlValue::Bool(v) => v.into(),
            SqlValue::Time(v) => v.into(),
            SqlValue::Uuid(v) => v.into(),
        }
    }
}

/// `?` placeholders are MySQL syntax, whatever the identifier quoting.
pub fn to_statement(fragment: SqlFragment) -> Statement {
    Statement::from_sql_and_values(
        DbBackend::MySql,
        fragment.sql,
        fragment.args.into_iter().map(Value::from),
    )
}

impl From<&CompiledQuery> for Statement {
    fn from(query: &CompiledQuery) -> Self {
        to_statement(query.statement())
    }
}
