use serde::{Deserialize, Serialize};

use crate::domain::{compiler::sql::Dialect, query::value_objects::LanguageCode};

pub mod entities;

pub const DEFAULT_MAX_RELATION_DEPTH: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub dialect: Dialect,
    /// Reject sort clauses naming unknown fields instead of passing them through.
    pub strict_sort: bool,
    pub max_relation_depth: usize,
    pub default_language: Option<LanguageCode>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            strict_sort: true,
            max_relation_depth: DEFAULT_MAX_RELATION_DEPTH,
            default_language: None,
        }
    }
}
