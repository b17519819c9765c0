use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    common::entities::app_errors::CoreError,
    compiler::{
        relation::{Scope, step_into, wrap_relation},
        sql::{Dialect, SqlFragment},
        translation::{json_path, resolve_column},
    },
    join::ports::JoinResolver,
    query::value_objects::{Filter, FilterOperator, LanguageCode, is_valid_path},
    schema::{entities::EntitySchema, services::SchemaRegistry},
    value::{
        entities::ColumnKind,
        services::{convert, convert_for, is_null_sentinel},
    },
};

/// Compiles `{path, operator, value}` filters into an AND-joined predicate.
///
/// Relation segments become correlated `IN ( SELECT ... )` subqueries built
/// from the innermost segment outward; JSON columns are compared through
/// their extracted sub-path without leaving the current table. Every
/// value, at every nesting level, is converted to its column kind.
pub struct FilterCompiler<'a, J: JoinResolver + ?Sized> {
    dialect: Dialect,
    schemas: &'a SchemaRegistry,
    joins: &'a J,
    language: Option<&'a LanguageCode>,
}

impl<'a, J: JoinResolver + ?Sized> FilterCompiler<'a, J> {
    pub fn new(dialect: Dialect, schemas: &'a SchemaRegistry, joins: &'a J) -> Self {
        Self {
            dialect,
            schemas,
            joins,
            language: None,
        }
    }

    pub fn with_language(mut self, language: Option<&'a LanguageCode>) -> Self {
        self.language = language;
        self
    }

    pub fn compile(
        &self,
        filters: &[Filter],
        root: Arc<EntitySchema>,
        root_table: &str,
    ) -> Result<SqlFragment, CoreError> {
        let scope = Scope::root(root, root_table);
        let fragments = filters
            .iter()
            .map(|filter| self.compile_filter(filter, &scope))
            .collect::<Result<Vec<_>, _>>()?;

        let fragment = SqlFragment::all(fragments);
        debug!(
            filters = filters.len(),
            placeholders = fragment.args.len(),
            "Compiled filters"
        );
        Ok(fragment)
    }

    fn compile_filter(&self, filter: &Filter, scope: &Scope) -> Result<SqlFragment, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidFilter {
            filter: filter.to_string(),
            reason: reason.to_string(),
        };

        if !is_valid_path(&filter.name) {
            return Err(invalid("not a valid field path"));
        }
        if filter.value.is_empty() {
            return Err(invalid("empty value"));
        }

        let segments: Vec<&str> = filter.name.split('.').collect();
        self.compile_path(filter, scope, &segments)
    }

    fn compile_path(
        &self,
        filter: &Filter,
        scope: &Scope,
        segments: &[&str],
    ) -> Result<SqlFragment, CoreError> {
        let Some((head, rest)) = segments.split_first() else {
            return Err(CoreError::InvalidFilter {
                filter: filter.to_string(),
                reason: "empty path".to_string(),
            });
        };
        let field = scope.schema.field(head)?;

        if rest.is_empty() {
            let kind = match field.column_kind() {
                Some(ColumnKind::Translations) => ColumnKind::String,
                Some(kind) => kind,
                None => {
                    return Err(CoreError::InvalidFilter {
                        filter: filter.to_string(),
                        reason: format!("relation `{head}` cannot be compared directly"),
                    });
                }
            };
            let expr = resolve_column(self.dialect, field, scope.qualifier(), self.language);
            return self.predicate(filter, expr, kind);
        }

        if field.is_json() {
            let expr = json_path(self.dialect, field, scope.qualifier(), rest);
            return self.predicate(filter, expr, ColumnKind::String);
        }

        let step = step_into(self.schemas, self.joins, scope, field)?;
        let inner = self.compile_path(filter, &step.scope, rest)?;

        Ok(SqlFragment::new(
            wrap_relation(self.dialect, scope, &step.config, &inner.sql),
            inner.args,
        ))
    }

    fn predicate(
        &self,
        filter: &Filter,
        expr: String,
        kind: ColumnKind,
    ) -> Result<SqlFragment, CoreError> {
        let value = filter.value.as_str();

        let fragment = match filter.operation {
            FilterOperator::Eq if is_null_sentinel(value) => {
                SqlFragment::new(format!("{expr} IS NULL"), Vec::new())
            }
            FilterOperator::Neq if is_null_sentinel(value) => {
                SqlFragment::new(format!("{expr} IS NOT NULL"), Vec::new())
            }
            FilterOperator::In | FilterOperator::InAlt => {
                let separator = filter.operation.separator().unwrap_or('|');
                let args = value
                    .split(separator)
                    .map(|raw| convert(kind, raw, &filter.name))
                    .collect::<Result<Vec<_>, _>>()?;
                let placeholders = vec!["?"; args.len()].join(", ");
                SqlFragment::new(format!("{expr} IN ({placeholders})"), args)
            }
            FilterOperator::Lk => SqlFragment::new(
                format!("{expr} LIKE ?"),
                vec![convert_for(filter, kind, value)?],
            ),
            operation => SqlFragment::new(
                format!("{expr} {} ?", comparator(operation)),
                vec![convert_for(filter, kind, value)?],
            ),
        };

        Ok(fragment)
    }
}

fn comparator(operation: FilterOperator) -> &'static str {
    match operation {
        FilterOperator::Eq => "=",
        FilterOperator::Neq => "<>",
        FilterOperator::Lt => "<",
        FilterOperator::Lte => "<=",
        FilterOperator::Gt => ">",
        FilterOperator::Gte => ">=",
        FilterOperator::Lk => "LIKE",
        FilterOperator::In | FilterOperator::InAlt => "IN",
    }
}
