use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::domain::{
    common::entities::app_errors::CoreError,
    compiler::sql::{Dialect, PRIMARY_KEY, string_literal},
    join::{
        entities::{JoinConfig, JoinKeys},
        ports::JoinResolver,
    },
};

/// Declarative catalog of join strategies keyed by relation path
/// (`Author`, `Author.Profile`, ...).
#[derive(Debug, Default)]
pub struct JoinRegistry {
    configs: RwLock<HashMap<String, JoinConfig>>,
}

impl JoinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, path: impl Into<String>, config: JoinConfig) -> Result<(), CoreError> {
        let path = path.into();
        config.validate(&path)?;
        debug!(path = %path, table = %config.table, "Registered join strategy");
        self.configs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, config);
        Ok(())
    }

    pub fn require(&self, path: &str) -> Result<JoinConfig, CoreError> {
        self.resolve(path).ok_or_else(|| CoreError::JoinNotFound {
            path: path.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JoinResolver for JoinRegistry {
    fn resolve(&self, path: &str) -> Option<JoinConfig> {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

/// JOIN clause for one relation plus the condition the caller must AND into
/// its WHERE clause (polymorphic discriminator match).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedJoin {
    pub clause: String,
    pub condition: Option<String>,
}

pub fn generate_join(
    dialect: Dialect,
    base_table: &str,
    config: &JoinConfig,
) -> Result<GeneratedJoin, CoreError> {
    build_join(dialect, base_table, config, None)
}

/// Same as [`generate_join`] with the target table joined `AS alias`, so a
/// table can be joined more than once (self-relations, several relations to
/// one table). The pivot of a many-to-many join is aliased `alias.pivot`.
pub fn generate_aliased_join(
    dialect: Dialect,
    base_table: &str,
    config: &JoinConfig,
    alias: &str,
) -> Result<GeneratedJoin, CoreError> {
    build_join(dialect, base_table, config, Some(alias))
}

fn build_join(
    dialect: Dialect,
    base_table: &str,
    config: &JoinConfig,
    alias: Option<&str>,
) -> Result<GeneratedJoin, CoreError> {
    config.validate(&config.table)?;

    let join = config.join_type().as_sql();
    let target = alias.unwrap_or(config.table.as_str());
    let table = match alias {
        Some(alias) => format!("{} AS {}", dialect.quote(&config.table), dialect.quote(alias)),
        None => dialect.quote(&config.table),
    };

    let generated = match &config.keys {
        JoinKeys::Direct {
            local_key,
            foreign_key,
        } => GeneratedJoin {
            clause: format!(
                "{join} {table} ON {} = {}",
                dialect.column(base_table, local_key),
                dialect.column(target, foreign_key)
            ),
            condition: None,
        },
        JoinKeys::Pivot {
            pivot_table,
            pivot_local_key,
            pivot_foreign_key,
        } => {
            let (pivot, pivot_ref) = match alias {
                Some(alias) => {
                    let pivot_alias = format!("{alias}.{pivot_table}");
                    (
                        format!("{} AS {}", dialect.quote(pivot_table), dialect.quote(&pivot_alias)),
                        pivot_alias,
                    )
                }
                None => (dialect.quote(pivot_table), pivot_table.clone()),
            };
            GeneratedJoin {
                clause: format!(
                    "{join} {pivot} ON {} = {} {join} {table} ON {} = {}",
                    dialect.column(base_table, PRIMARY_KEY),
                    dialect.column(&pivot_ref, pivot_local_key),
                    dialect.column(&pivot_ref, pivot_foreign_key),
                    dialect.column(target, PRIMARY_KEY)
                ),
                condition: None,
            }
        }
        JoinKeys::Polymorphic {
            id_column,
            type_column,
            type_value,
        } => GeneratedJoin {
            clause: format!(
                "{join} {table} ON {} = {}",
                dialect.column(base_table, PRIMARY_KEY),
                dialect.column(target, id_column)
            ),
            condition: Some(format!(
                "{} = {}",
                dialect.column(target, type_column),
                string_literal(type_value)
            )),
        },
    };

    Ok(generated)
}
