use crate::domain::join::entities::JoinConfig;

/// Source of registered join strategies, keyed by dotted relation path.
#[cfg_attr(test, mockall::automock)]
pub trait JoinResolver: Send + Sync {
    fn resolve(&self, path: &str) -> Option<JoinConfig>;
}
