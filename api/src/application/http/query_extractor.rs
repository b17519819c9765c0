use axum::{extract::FromRequestParts, http::request::Parts};
use ferrisql_core::domain::query::QuerySpec;
use tracing::debug;

use super::{query_params::from_query_pairs, server::api_entities::api_error::ApiError};

/// Extractor for the query DSL: filters, search, sort, projection,
/// preloads, pagination and language.
///
/// Usage:
/// ```rust,ignore
/// async fn handler(
///     QuerySpecExtractor(spec): QuerySpecExtractor,
///     State(state): State<AppState>,
/// ) -> Result<Response, ApiError> {
///     let compiled = state.compiler.compile::<Post>(&spec)?;
///     // hand compiled.statement() to the database
/// }
/// ```
#[derive(Debug, Clone)]
pub struct QuerySpecExtractor(pub QuerySpec);

impl<S> FromRequestParts<S> for QuerySpecExtractor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query_string = parts.uri.query().unwrap_or("");
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query_string)
            .map_err(|e| ApiError::BadRequest(format!("Invalid query string: {e}")))?;

        let spec = from_query_pairs(&pairs)?;
        debug!(
            filters = spec.filters.len(),
            sorts = spec.sorts.len(),
            "Parsed query parameters"
        );

        Ok(QuerySpecExtractor(spec))
    }
}
