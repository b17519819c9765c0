//! Column references for translated (language -> text JSON map) and JSON
//! columns, and the SELECT projection built from them.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{
    common::entities::app_errors::CoreError,
    compiler::sql::Dialect,
    query::value_objects::LanguageCode,
    schema::entities::{EntitySchema, FieldMeta},
};

/// Expression selecting `field` on `table`.
///
/// Translated columns are narrowed to `language` unless it is absent or
/// `all`, in which case the raw JSON map is returned.
pub fn resolve_column(
    dialect: Dialect,
    field: &FieldMeta,
    table: &str,
    language: Option<&LanguageCode>,
) -> String {
    let column = dialect.column(table, &field.column);
    match language {
        Some(language) if field.is_translated() && !language.is_all() => {
            format!("JSON_UNQUOTE(JSON_EXTRACT({column}, '$.\"{language}\"'))")
        }
        _ => column,
    }
}

/// `CAST(table.column->'$.a.b' AS CHAR)` for a JSON sub-path.
pub fn json_path(dialect: Dialect, field: &FieldMeta, table: &str, keys: &[&str]) -> String {
    format!(
        "CAST({}->'$.{}' AS CHAR)",
        dialect.column(table, &field.column),
        keys.join(".")
    )
}

/// Comma-joined SELECT list for `fields`, or every column of the entity
/// when `fields` is empty. Relation fields are skipped; when nothing but
/// relations was requested every column is selected instead.
pub fn compile_select(
    dialect: Dialect,
    schema: &EntitySchema,
    table: &str,
    fields: &[String],
    language: Option<&LanguageCode>,
) -> Result<String, CoreError> {
    let selected: Vec<&FieldMeta> = fields
        .iter()
        .map(|name| schema.field(name.trim()))
        .collect::<Result<_, _>>()?;

    let mut columns = select_columns(dialect, selected, table, language);
    if columns.is_empty() {
        if !fields.is_empty() {
            debug!(table, ?fields, "Only relations selected, selecting every column");
        }
        columns = select_columns(dialect, schema.fields.iter().collect(), table, language);
    }

    if columns.is_empty() {
        return Err(CoreError::invalid_schema(
            schema.entity.type_name,
            "no selectable columns",
        ));
    }

    Ok(columns.join(", "))
}

fn select_columns(
    dialect: Dialect,
    selected: Vec<&FieldMeta>,
    table: &str,
    language: Option<&LanguageCode>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    selected
        .into_iter()
        .filter(|field| !field.is_relation())
        .filter(|field| seen.insert(field.name.clone()))
        .map(|field| {
            let expr = resolve_column(dialect, field, table, language);
            if field.is_translated() && language.is_some_and(|l| !l.is_all()) {
                format!("{expr} AS {}", dialect.quote(&field.column))
            } else {
                expr
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fixtures::Post, schema::services::SchemaRegistry};

    fn en() -> LanguageCode {
        LanguageCode::parse("en").unwrap()
    }

    #[test]
    fn test_resolve_translated_column() {
        let schema = SchemaRegistry::new().describe::<Post>().unwrap();
        let headline = schema.field("Headline").unwrap();

        assert_eq!(
            resolve_column(Dialect::MySql, headline, "Post", Some(&en())),
            "JSON_UNQUOTE(JSON_EXTRACT(`Post`.`Headline`, '$.\"en\"'))"
        );
        assert_eq!(
            resolve_column(Dialect::MySql, headline, "Post", Some(&LanguageCode::all())),
            "`Post`.`Headline`"
        );
        assert_eq!(
            resolve_column(Dialect::MySql, headline, "Post", None),
            "`Post`.`Headline`"
        );
    }

    #[test]
    fn test_plain_column_ignores_language() {
        let schema = SchemaRegistry::new().describe::<Post>().unwrap();
        let views = schema.field("Views").unwrap();
        assert_eq!(
            resolve_column(Dialect::MySql, views, "Post", Some(&en())),
            "`Post`.`view_count`"
        );
    }

    #[test]
    fn test_json_path() {
        let schema = SchemaRegistry::new().describe::<Post>().unwrap();
        let meta = schema.field("Meta").unwrap();
        assert_eq!(
            json_path(Dialect::MySql, meta, "Post", &["seo", "score"]),
            "CAST(`Post`.`Meta`->'$.seo.score' AS CHAR)"
        );
    }

    #[test]
    fn test_select_requested_fields() {
        let schema = SchemaRegistry::new().describe::<Post>().unwrap();
        let fields = vec![
            "ID".to_string(),
            "Headline".to_string(),
            "Author".to_string(),
            "ID".to_string(),
        ];
        let select = compile_select(Dialect::MySql, &schema, "Post", &fields, Some(&en())).unwrap();
        assert_eq!(
            select,
            "`Post`.`ID`, JSON_UNQUOTE(JSON_EXTRACT(`Post`.`Headline`, '$.\"en\"')) AS `Headline`"
        );
    }

    #[test]
    fn test_select_all_columns_skips_relations() {
        let schema = SchemaRegistry::new().describe::<Post>().unwrap();
        let select = compile_select(Dialect::MySql, &schema, "Post", &[], None).unwrap();
        assert!(select.starts_with("`Post`.`ID`, `Post`.`Title`, `Post`.`view_count`"));
        assert!(select.ends_with("`Post`.`Headline`, `Post`.`AuthorID`"));
        assert!(!select.contains("Tags"));
    }

    #[test]
    fn test_select_only_relations_falls_back_to_all_columns() {
        let schema = SchemaRegistry::new().describe::<Post>().unwrap();
        let fields = vec!["Author".to_string(), "Tags".to_string()];
        let select = compile_select(Dialect::MySql, &schema, "Post", &fields, None).unwrap();
        assert_eq!(
            select,
            compile_select(Dialect::MySql, &schema, "Post", &[], None).unwrap()
        );
        assert!(select.starts_with("`Post`.`ID`, "));
    }

    #[test]
    fn test_select_unknown_field() {
        let schema = SchemaRegistry::new().describe::<Post>().unwrap();
        let result = compile_select(Dialect::MySql, &schema, "Post", &["Nope".to_string()], None);
        assert_eq!(result, Err(CoreError::field_not_found("Post", "Nope")));
    }
}
