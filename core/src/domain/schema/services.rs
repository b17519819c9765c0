use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::domain::{
    common::entities::app_errors::CoreError,
    schema::{
        entities::{EntityRef, EntitySchema},
        ports::Entity,
    },
};

/// Per-type schema cache.
///
/// Schemas are built outside the lock on a miss; when two threads race, the
/// first insert wins and both observe the same `Arc`.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    cache: RwLock<HashMap<TypeId, Arc<EntitySchema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first access and never dropped.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    pub fn describe<E: Entity>(&self) -> Result<Arc<EntitySchema>, CoreError> {
        self.describe_ref(&EntityRef::of::<E>())
    }

    pub fn describe_ref(&self, entity: &EntityRef) -> Result<Arc<EntitySchema>, CoreError> {
        if let Some(schema) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity.type_id)
        {
            return Ok(schema.clone());
        }

        let schema = Arc::new(EntitySchema::build(entity)?);
        debug!(
            entity = entity.type_name,
            table = %schema.table,
            fields = schema.fields.len(),
            "Described entity schema"
        );

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(entity.type_id).or_insert(schema).clone())
    }

    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
