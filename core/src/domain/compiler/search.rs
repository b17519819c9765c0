use std::any::TypeId;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    common::{DEFAULT_MAX_RELATION_DEPTH, entities::app_errors::CoreError},
    compiler::{
        relation::{Scope, step_into, wrap_relation},
        sql::{Dialect, SqlFragment},
        translation::resolve_column,
    },
    join::{entities::JoinKeys, ports::JoinResolver},
    query::value_objects::LanguageCode,
    schema::{entities::EntitySchema, services::SchemaRegistry, value_objects::SearchTag},
    value::entities::SqlValue,
};

/// Expands one search term into OR-joined LIKE predicates over every field
/// tagged with a search pattern, following relations tagged `search`.
pub struct SearchCompiler<'a, J: JoinResolver + ?Sized> {
    dialect: Dialect,
    schemas: &'a SchemaRegistry,
    joins: &'a J,
    language: Option<&'a LanguageCode>,
    max_depth: usize,
}

impl<'a, J: JoinResolver + ?Sized> SearchCompiler<'a, J> {
    pub fn new(dialect: Dialect, schemas: &'a SchemaRegistry, joins: &'a J) -> Self {
        Self {
            dialect,
            schemas,
            joins,
            language: None,
            max_depth: DEFAULT_MAX_RELATION_DEPTH,
        }
    }

    pub fn with_language(mut self, language: Option<&'a LanguageCode>) -> Self {
        self.language = language;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Empty fragment when the term is blank or nothing is searchable.
    pub fn compile(
        &self,
        term: &str,
        root: Arc<EntitySchema>,
        root_table: &str,
    ) -> Result<SqlFragment, CoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(SqlFragment::default());
        }

        let scope = Scope::root(root, root_table);
        let mut visiting = vec![scope.schema.entity.type_id];
        let branches = self.branches(term, &scope, &mut visiting)?;

        let fragment = SqlFragment::any(branches);
        debug!(branches = fragment.args.len(), "Compiled search");
        Ok(fragment)
    }

    fn branches(
        &self,
        term: &str,
        scope: &Scope,
        visiting: &mut Vec<TypeId>,
    ) -> Result<Vec<SqlFragment>, CoreError> {
        let mut branches = Vec::new();

        for field in &scope.schema.fields {
            match &field.search {
                Some(SearchTag::Pattern(pattern)) => {
                    let expr = resolve_column(self.dialect, field, scope.qualifier(), self.language);
                    branches.push(SqlFragment::new(
                        format!("{expr} LIKE ?"),
                        vec![SqlValue::String(pattern.replacen('*', term, 1))],
                    ));
                }
                Some(SearchTag::Traverse) => {
                    let Some(relation) = field.relation() else {
                        continue;
                    };
                    let path = scope.relation_path(&field.name);

                    if scope.depth + 1 > self.max_depth {
                        return Err(CoreError::invalid_schema(
                            scope.schema.name(),
                            format!(
                                "search through `{path}` exceeds {} relation levels",
                                self.max_depth
                            ),
                        ));
                    }
                    if visiting.contains(&relation.target.type_id) {
                        return Err(CoreError::invalid_schema(
                            scope.schema.name(),
                            format!("search relation cycle through `{path}`"),
                        ));
                    }

                    let step = step_into(self.schemas, self.joins, scope, field)?;
                    visiting.push(relation.target.type_id);
                    let inner = self.branches(term, &step.scope, visiting)?;
                    visiting.pop();

                    if inner.is_empty() {
                        continue;
                    }

                    let grouped = inner.len() > 1
                        && matches!(step.config.keys, JoinKeys::Polymorphic { .. });
                    let mut inner = SqlFragment::join(inner, " OR ");
                    if grouped {
                        inner.sql = format!("( {} )", inner.sql);
                    }

                    branches.push(SqlFragment::new(
                        wrap_relation(self.dialect, scope, &step.config, &inner.sql),
                        inner.args,
                    ));
                }
                None => {}
            }
        }

        Ok(branches)
    }
}
