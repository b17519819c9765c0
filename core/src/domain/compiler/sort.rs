use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{
    common::entities::app_errors::CoreError,
    compiler::{
        relation::{Scope, step_into},
        sql::Dialect,
        translation::{json_path, resolve_column},
    },
    join::{ports::JoinResolver, services::generate_aliased_join},
    query::value_objects::{LanguageCode, Sort, is_valid_path},
    schema::{entities::EntitySchema, services::SchemaRegistry},
};

/// ORDER BY fragment plus what relation sorts require from the statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledSort {
    /// Comma-joined clauses, without the `ORDER BY` keyword.
    pub order_by: String,
    pub joins: Vec<String>,
    /// Discriminator matches to AND into the WHERE clause.
    pub conditions: Vec<String>,
}

impl CompiledSort {
    pub fn is_empty(&self) -> bool {
        self.order_by.is_empty()
    }

    fn merge(&mut self, other: CompiledSort) {
        for clause in other.joins {
            if !self.joins.contains(&clause) {
                self.joins.push(clause);
            }
        }
        for condition in other.conditions {
            if !self.conditions.contains(&condition) {
                self.conditions.push(condition);
            }
        }
    }
}

pub struct SortCompiler<'a, J: JoinResolver + ?Sized> {
    dialect: Dialect,
    schemas: &'a SchemaRegistry,
    joins: &'a J,
    language: Option<&'a LanguageCode>,
    strict: bool,
}

impl<'a, J: JoinResolver + ?Sized> SortCompiler<'a, J> {
    pub fn new(dialect: Dialect, schemas: &'a SchemaRegistry, joins: &'a J) -> Self {
        Self {
            dialect,
            schemas,
            joins,
            language: None,
            strict: true,
        }
    }

    pub fn with_language(mut self, language: Option<&'a LanguageCode>) -> Self {
        self.language = language;
        self
    }

    /// In lenient mode unknown fields are ordered by their quoted path.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn compile(
        &self,
        sorts: &[Sort],
        root: Arc<EntitySchema>,
        root_table: &str,
    ) -> Result<CompiledSort, CoreError> {
        let scope = Scope::root(root, root_table);
        let mut compiled = CompiledSort::default();
        let mut clauses = Vec::with_capacity(sorts.len());

        for sort in sorts {
            if !is_valid_path(&sort.name) {
                return Err(CoreError::InvalidSort {
                    sort: sort.name.clone(),
                    reason: "not a valid field path".to_string(),
                });
            }

            let mut resolved = CompiledSort::default();
            let expr = match self.resolve(sort, &scope, &mut resolved) {
                Ok(expr) => {
                    compiled.merge(resolved);
                    expr
                }
                Err(CoreError::FieldNotFound { entity, field }) if !self.strict => {
                    warn!(sort = %sort.name, %entity, %field, "Sorting by unknown field");
                    sort.name
                        .split('.')
                        .map(|segment| self.dialect.quote(segment))
                        .collect::<Vec<_>>()
                        .join(".")
                }
                Err(err) => return Err(err),
            };

            clauses.push(format!("{expr} {}", sort.direction.as_sql()));
        }

        compiled.order_by = clauses.join(", ");
        debug!(
            sorts = sorts.len(),
            joins = compiled.joins.len(),
            "Compiled sort"
        );
        Ok(compiled)
    }

    /// Column expression for one sort path, collecting the joins it crosses.
    ///
    /// Every joined table is aliased by its relation path from the root, so
    /// self-relations and several relations to one table stay distinct.
    fn resolve(
        &self,
        sort: &Sort,
        root: &Scope,
        out: &mut CompiledSort,
    ) -> Result<String, CoreError> {
        let segments: Vec<&str> = sort.name.split('.').collect();
        let mut scope = root.clone();
        let mut alias = root.table.clone();

        for (i, segment) in segments.iter().enumerate() {
            let field = scope.schema.field(segment)?;
            let rest = &segments[i + 1..];

            if rest.is_empty() {
                if field.is_relation() {
                    return Err(CoreError::InvalidSort {
                        sort: sort.name.clone(),
                        reason: format!("`{segment}` is a relation"),
                    });
                }
                return Ok(resolve_column(
                    self.dialect,
                    field,
                    &alias,
                    self.language,
                ));
            }

            if field.is_json() {
                return Ok(json_path(self.dialect, field, &alias, rest));
            }

            let step = step_into(self.schemas, self.joins, &scope, field)?;
            let join = generate_aliased_join(
                self.dialect,
                &alias,
                &step.config,
                &step.scope.path,
            )?;
            out.joins.push(join.clause);
            if let Some(condition) = join.condition {
                out.conditions.push(condition);
            }

            alias = step.scope.path.clone();
            scope = step.scope;
        }

        Err(CoreError::InvalidSort {
            sort: sort.name.clone(),
            reason: "empty path".to_string(),
        })
    }
}
