//! Relation traversal shared by the filter, search and sort compilers.

use std::sync::Arc;

use crate::domain::{
    common::entities::app_errors::CoreError,
    compiler::sql::{Dialect, PRIMARY_KEY, string_literal},
    join::{
        entities::{JoinConfig, JoinKeys},
        ports::JoinResolver,
    },
    schema::{
        entities::{EntitySchema, FieldMeta},
        services::SchemaRegistry,
    },
};

/// Where a path segment is being resolved.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    pub schema: Arc<EntitySchema>,
    pub table: String,
    /// Whether leaf columns are written as `table.column`. Off inside
    /// many-to-many subqueries, where the selected table is unambiguous.
    pub qualify: bool,
    /// Relation path from the root, empty at the root.
    pub path: String,
    pub depth: usize,
}

impl Scope {
    pub fn root(schema: Arc<EntitySchema>, table: &str) -> Self {
        Self {
            schema,
            table: table.to_string(),
            qualify: true,
            path: String::new(),
            depth: 0,
        }
    }

    pub fn qualifier(&self) -> &str {
        if self.qualify { &self.table } else { "" }
    }

    pub fn relation_path(&self, segment: &str) -> String {
        if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{segment}", self.path)
        }
    }
}

pub(crate) struct RelationStep {
    pub config: JoinConfig,
    pub scope: Scope,
}

/// Resolves the join strategy for `field` (registered first, derived from
/// the field otherwise) and the scope of its target entity.
pub(crate) fn step_into<J: JoinResolver + ?Sized>(
    schemas: &SchemaRegistry,
    joins: &J,
    scope: &Scope,
    field: &FieldMeta,
) -> Result<RelationStep, CoreError> {
    let path = scope.relation_path(&field.name);
    let not_found = || CoreError::JoinNotFound { path: path.clone() };

    let relation = field.relation().ok_or_else(not_found)?;
    let config = match joins.resolve(&path) {
        Some(config) => {
            config.validate(&path)?;
            config
        }
        None => JoinConfig::for_field(&scope.table, field).ok_or_else(not_found)?,
    };
    let schema = schemas.describe_ref(&relation.target)?;

    let child = Scope {
        schema,
        table: config.table.clone(),
        qualify: !matches!(config.keys, JoinKeys::Pivot { .. }),
        path,
        depth: scope.depth + 1,
    };

    Ok(RelationStep {
        config,
        scope: child,
    })
}

/// Wraps a condition on the related table into a correlated subquery on
/// the parent.
pub(crate) fn wrap_relation(
    dialect: Dialect,
    parent: &Scope,
    config: &JoinConfig,
    inner: &str,
) -> String {
    let table = dialect.quote(&config.table);

    match &config.keys {
        JoinKeys::Direct {
            local_key,
            foreign_key,
        } => format!(
            "{} IN ( SELECT {} FROM {table} WHERE ( {inner} ) )",
            dialect.column(parent.qualifier(), local_key),
            dialect.column(&config.table, foreign_key),
        ),
        JoinKeys::Pivot {
            pivot_table,
            pivot_local_key,
            pivot_foreign_key,
        } => {
            let base = match parent.qualifier() {
                "" => PRIMARY_KEY.to_string(),
                qualifier => format!("{}.{PRIMARY_KEY}", dialect.quote(qualifier)),
            };
            format!(
                "{base} IN ( SELECT {} FROM {} WHERE ( {} IN ( SELECT {PRIMARY_KEY} FROM {table} WHERE ( {inner} ) ) ) )",
                dialect.quote(pivot_local_key),
                dialect.quote(pivot_table),
                dialect.quote(pivot_foreign_key),
            )
        }
        JoinKeys::Polymorphic {
            id_column,
            type_column,
            type_value,
        } => {
            let id = dialect.column(&config.table, id_column);
            format!(
                "{} IN ( SELECT {id} FROM {table} WHERE ( {inner} AND {id} = {} AND {} = {} ) )",
                dialect.column(parent.qualifier(), PRIMARY_KEY),
                dialect.column(&parent.table, PRIMARY_KEY),
                dialect.column(&config.table, type_column),
                string_literal(type_value),
            )
        }
    }
}
