use thiserror::Error;

use crate::domain::value::entities::ColumnKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("field `{field}` not found on `{entity}`")]
    FieldNotFound { entity: String, field: String },

    #[error("no join strategy for relation path `{path}`")]
    JoinNotFound { path: String },

    #[error("invalid join config for `{path}`: {reason}")]
    InvalidJoinConfig { path: String, reason: String },

    #[error("filter `{filter}`: cannot convert `{value}` to {kind}")]
    TypeConversion {
        filter: String,
        value: String,
        kind: ColumnKind,
    },

    #[error("unsupported operator in `{0}`")]
    UnsupportedOperator(String),

    #[error("invalid schema for `{entity}`: {reason}")]
    InvalidSchema { entity: String, reason: String },

    #[error("invalid filter `{filter}`: {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("invalid sort `{sort}`: {reason}")]
    InvalidSort { sort: String, reason: String },

    #[error("invalid language code `{0}`")]
    InvalidLanguage(String),
}

impl CoreError {
    pub fn field_not_found(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn invalid_schema(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_join(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidJoinConfig {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Errors caused by the caller's query rather than by schema or join
    /// configuration.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::InvalidSchema { .. } | Self::InvalidJoinConfig { .. }
        )
    }
}
