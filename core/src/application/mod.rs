use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::{
    common::{CompilerConfig, entities::app_errors::CoreError},
    compiler::{
        CompiledSort, FilterCompiler, SearchCompiler, SortCompiler,
        sql::{Dialect, SqlFragment},
        translation,
    },
    join::{ports::JoinResolver, services::JoinRegistry},
    query::value_objects::{Filter, LanguageCode, QuerySpec, Sort},
    schema::{entities::EntitySchema, ports::Entity, services::SchemaRegistry},
};

/// Compiles a [`QuerySpec`] against an entity schema.
///
/// Holds the configuration and the two registries; cheap to clone and safe
/// to share across threads.
#[derive(Debug)]
pub struct QueryCompiler<J: JoinResolver = JoinRegistry> {
    config: CompilerConfig,
    schemas: Arc<SchemaRegistry>,
    joins: Arc<J>,
}

impl<J: JoinResolver> Clone for QueryCompiler<J> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            schemas: self.schemas.clone(),
            joins: self.joins.clone(),
        }
    }
}

impl QueryCompiler<JoinRegistry> {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_registries(
            config,
            Arc::new(SchemaRegistry::new()),
            Arc::new(JoinRegistry::new()),
        )
    }
}

impl<J: JoinResolver> QueryCompiler<J> {
    pub fn with_registries(config: CompilerConfig, schemas: Arc<SchemaRegistry>, joins: Arc<J>) -> Self {
        Self {
            config,
            schemas,
            joins,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn joins(&self) -> &J {
        &self.joins
    }

    pub fn describe<E: Entity>(&self) -> Result<Arc<EntitySchema>, CoreError> {
        self.schemas.describe::<E>()
    }

    /// Runs every compiler over `spec`. All-or-nothing: the first error aborts.
    #[instrument(
        skip_all,
        fields(
            filters = spec.filters.len(),
            sorts = spec.sorts.len(),
            search = spec.q.is_some()
        )
    )]
    pub fn compile<E: Entity>(&self, spec: &QuerySpec) -> Result<CompiledQuery, CoreError> {
        let schema = self.describe::<E>()?;
        let language = spec
            .language
            .as_ref()
            .or(self.config.default_language.as_ref());

        let filter = self.compile_filters::<E>(&spec.filters, language)?;
        let search = match spec.q.as_deref() {
            Some(term) => self.compile_search::<E>(term, language)?,
            None => SqlFragment::default(),
        };
        let sort = self.compile_sort::<E>(&spec.sorts, language)?;
        let select = self.compile_select::<E>(&spec.fields, language)?;
        let preloads = self.resolve_preloads::<E>(&spec.preloads)?;

        let compiled = CompiledQuery {
            dialect: self.config.dialect,
            table: schema.table.clone(),
            select,
            joins: sort.joins,
            filter,
            search,
            order_by: sort.order_by,
            conditions: sort.conditions,
            preloads,
            offset: spec.offset,
            limit: spec.limit,
        };

        info!(
            table = %compiled.table,
            args = compiled.filter.args.len() + compiled.search.args.len(),
            "Compiled query"
        );
        Ok(compiled)
    }

    pub fn compile_filters<E: Entity>(
        &self,
        filters: &[Filter],
        language: Option<&LanguageCode>,
    ) -> Result<SqlFragment, CoreError> {
        let schema = self.describe::<E>()?;
        let table = schema.table.clone();
        FilterCompiler::new(self.config.dialect, &self.schemas, self.joins.as_ref())
            .with_language(language)
            .compile(filters, schema, &table)
    }

    pub fn compile_search<E: Entity>(
        &self,
        term: &str,
        language: Option<&LanguageCode>,
    ) -> Result<SqlFragment, CoreError> {
        let schema = self.describe::<E>()?;
        let table = schema.table.clone();
        SearchCompiler::new(self.config.dialect, &self.schemas, self.joins.as_ref())
            .with_language(language)
            .with_max_depth(self.config.max_relation_depth)
            .compile(term, schema, &table)
    }

    pub fn compile_sort<E: Entity>(
        &self,
        sorts: &[Sort],
        language: Option<&LanguageCode>,
    ) -> Result<CompiledSort, CoreError> {
        let schema = self.describe::<E>()?;
        let table = schema.table.clone();
        SortCompiler::new(self.config.dialect, &self.schemas, self.joins.as_ref())
            .with_language(language)
            .with_strict(self.config.strict_sort)
            .compile(sorts, schema, &table)
    }

    pub fn compile_select<E: Entity>(
        &self,
        fields: &[String],
        language: Option<&LanguageCode>,
    ) -> Result<String, CoreError> {
        let schema = self.describe::<E>()?;
        translation::compile_select(self.config.dialect, &schema, &schema.table, fields, language)
    }

    pub fn resolve_preloads<E: Entity>(&self, preloads: &[String]) -> Result<Vec<String>, CoreError> {
        let schema = self.describe::<E>()?;
        crate::domain::compiler::resolve_preloads(&self.schemas, schema, preloads)
    }
}

/// Output of [`QueryCompiler::compile`]. Fragments are kept apart so callers
/// can assemble their own statement; [`CompiledQuery::statement`] builds the
/// usual list query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub dialect: Dialect,
    pub table: String,
    pub select: String,
    pub joins: Vec<String>,
    pub filter: SqlFragment,
    pub search: SqlFragment,
    pub order_by: String,
    /// Discriminator matches required by polymorphic sort joins.
    pub conditions: Vec<String>,
    pub preloads: Vec<String>,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl CompiledQuery {
    /// AND of the filter, the search and the join conditions.
    pub fn where_clause(&self) -> SqlFragment {
        let conditions = self
            .conditions
            .iter()
            .map(|condition| SqlFragment::new(condition.clone(), Vec::new()));

        SqlFragment::all(
            [self.filter.clone(), self.search.clone()]
                .into_iter()
                .chain(conditions),
        )
    }

    /// `SELECT ... FROM ... [JOIN ...] [WHERE ...] [ORDER BY ...] [LIMIT n OFFSET m]`
    pub fn statement(&self) -> SqlFragment {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select,
            self.dialect.quote(&self.table)
        );

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        let where_clause = self.where_clause();
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.sql);
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by);
        }

        match self.limit {
            Some(limit) => sql.push_str(&format!(" LIMIT {limit} OFFSET {}", self.offset)),
            // MySQL has no OFFSET without LIMIT
            None if self.offset > 0 => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", u64::MAX, self.offset))
            }
            None => {}
        }

        SqlFragment::new(sql, where_clause.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        fixtures::{Author, Ping, Post},
        join::{entities::JoinConfig, ports::MockJoinResolver},
        query::value_objects::{FilterOperator, LanguageCode},
        value::entities::SqlValue,
    };

    fn compiler() -> QueryCompiler {
        QueryCompiler::new(CompilerConfig::default())
    }

    #[test]
    fn test_compile_full_spec() {
        let spec = QuerySpec::new()
            .filter(Filter::new("Published", FilterOperator::Eq, "true"))
            .filter(Filter::new("Author.Name", FilterOperator::Lk, "%ann%"))
            .search("rust")
            .sort(Sort::desc("Comments.Body"))
            .field("ID")
            .field("Title")
            .preload("Author")
            .paginate(40, 20);

        let compiled = compiler().compile::<Post>(&spec).unwrap();

        assert_eq!(compiled.table, "Post");
        assert_eq!(compiled.select, "`Post`.`ID`, `Post`.`Title`");
        assert_eq!(compiled.filter.args.len(), 2);
        assert_eq!(compiled.search.args.len(), 6);
        assert_eq!(compiled.order_by, "`Comments`.`Body` DESC");
        assert_eq!(compiled.conditions, vec!["`Comments`.`HolderType` = 'Post'"]);
        assert_eq!(compiled.preloads, vec!["Author"]);

        let statement = compiled.statement();
        assert!(statement.sql.starts_with(
            "SELECT `Post`.`ID`, `Post`.`Title` FROM `Post` LEFT JOIN `Comment` AS `Comments` ON `Post`.`ID` = `Comments`.`HolderID` WHERE ( "
        ));
        assert!(statement.sql.ends_with(
            " AND `Comments`.`HolderType` = 'Post' ) ORDER BY `Comments`.`Body` DESC LIMIT 20 OFFSET 40"
        ));
        assert_eq!(statement.args.len(), statement.placeholders());
        assert_eq!(statement.args[0], SqlValue::Bool(true));
    }

    #[test]
    fn test_relation_only_fields_select_every_column() {
        let spec = QuerySpec::new().field("Profile").preload("Profile");
        let compiled = compiler().compile::<Author>(&spec).unwrap();
        assert_eq!(
            compiled.statement().sql,
            "SELECT `Author`.`ID`, `Author`.`Name`, `Author`.`Email`, `Author`.`ProfileID` FROM `Author`"
        );
    }

    #[test]
    fn test_empty_spec() {
        let compiled = compiler().compile::<Author>(&QuerySpec::new()).unwrap();
        assert!(compiled.where_clause().is_empty());
        assert_eq!(
            compiled.statement().sql,
            "SELECT `Author`.`ID`, `Author`.`Name`, `Author`.`Email`, `Author`.`ProfileID` FROM `Author`"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        let spec = QuerySpec {
            offset: 10,
            ..QuerySpec::new()
        };
        let compiled = compiler().compile::<Author>(&spec).unwrap();
        assert!(
            compiled
                .statement()
                .sql
                .ends_with("LIMIT 18446744073709551615 OFFSET 10")
        );
    }

    #[test]
    fn test_default_language_and_override() {
        let config = CompilerConfig {
            default_language: Some(LanguageCode::parse("en").unwrap()),
            ..CompilerConfig::default()
        };
        let compiler = QueryCompiler::new(config);

        let spec = QuerySpec::new().field("Headline");
        let compiled = compiler.compile::<Post>(&spec).unwrap();
        assert_eq!(
            compiled.select,
            "JSON_UNQUOTE(JSON_EXTRACT(`Post`.`Headline`, '$.\"en\"')) AS `Headline`"
        );

        let compiled = compiler
            .compile::<Post>(&spec.clone().language(LanguageCode::all()))
            .unwrap();
        assert_eq!(compiled.select, "`Post`.`Headline`");
    }

    #[test]
    fn test_all_or_nothing() {
        let spec = QuerySpec::new()
            .filter(Filter::new("Title", FilterOperator::Eq, "ok"))
            .sort(Sort::asc("Missing"));
        let err = compiler().compile::<Post>(&spec).unwrap_err();
        assert_eq!(err, CoreError::field_not_found("Post", "Missing"));
    }

    #[test]
    fn test_lenient_sort_from_config() {
        let config = CompilerConfig {
            strict_sort: false,
            ..CompilerConfig::default()
        };
        let spec = QuerySpec::new().sort(Sort::desc("score"));
        let compiled = QueryCompiler::new(config).compile::<Post>(&spec).unwrap();
        assert_eq!(compiled.order_by, "`score` DESC");
    }

    #[test]
    fn test_max_relation_depth_from_config() {
        let config = CompilerConfig {
            max_relation_depth: 1,
            ..CompilerConfig::default()
        };
        let err = QueryCompiler::new(config)
            .compile::<Post>(&QuerySpec::new().search("x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSchema { .. }));

        let err = compiler()
            .compile::<Ping>(&QuerySpec::new().search("x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSchema { .. }));
    }

    #[test]
    fn test_with_mocked_resolver() {
        let mut joins = MockJoinResolver::new();
        joins
            .expect_resolve()
            .returning(|path| match path {
                "Author" => Some(JoinConfig::one_to_one("writers", "AuthorID", "ID")),
                _ => None,
            });

        let compiler = QueryCompiler::with_registries(
            CompilerConfig::default(),
            Arc::new(SchemaRegistry::new()),
            Arc::new(joins),
        );
        let spec = QuerySpec::new().filter(Filter::new("Author.Email", FilterOperator::Eq, "a@b.c"));
        let compiled = compiler.compile::<Post>(&spec).unwrap();

        assert_eq!(
            compiled.filter.sql,
            "`Post`.`AuthorID` IN ( SELECT `writers`.`ID` FROM `writers` WHERE ( `writers`.`Email` = ? ) )"
        );
    }

    #[test]
    fn test_shared_schemas_are_cached() {
        let compiler = compiler();
        compiler.compile::<Post>(&QuerySpec::new().search("x")).unwrap();
        // Post, Author, Profile, Tag, Comment
        assert_eq!(compiler.schemas().len(), 5);
    }
}
