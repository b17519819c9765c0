use std::sync::Arc;

use crate::domain::{
    common::entities::app_errors::CoreError,
    schema::{entities::EntitySchema, services::SchemaRegistry},
};

/// Validates preload paths against the schema graph.
///
/// Every segment must name a relation field; the deduplicated paths are
/// returned in input order for the caller's loader.
pub fn resolve_preloads(
    schemas: &SchemaRegistry,
    root: Arc<EntitySchema>,
    preloads: &[String],
) -> Result<Vec<String>, CoreError> {
    let mut resolved: Vec<String> = Vec::with_capacity(preloads.len());

    for path in preloads {
        let path = path.trim();
        if path.is_empty() {
            continue;
        }

        let mut schema = root.clone();
        let mut walked = String::new();
        for segment in path.split('.') {
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(segment);

            let field = schema.field(segment)?;
            let relation = field.relation().ok_or_else(|| CoreError::JoinNotFound {
                path: walked.clone(),
            })?;
            schema = schemas.describe_ref(&relation.target)?;
        }

        if !resolved.iter().any(|p| p == path) {
            resolved.push(path.to_string());
        }
    }

    Ok(resolved)
}
