use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::domain::{
    common::entities::app_errors::CoreError,
    schema::{
        ports::{Entity, short_type_name},
        value_objects::{FieldDef, SearchTag, parse_tag},
    },
    value::entities::ColumnKind,
};

/// Type-erased handle to an [`Entity`] implementation.
#[derive(Clone, Copy)]
pub struct EntityRef {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub table_name: fn() -> String,
    pub fields: fn() -> Vec<FieldDef>,
}

impl EntityRef {
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: short_type_name(std::any::type_name::<E>()),
            table_name: E::table_name,
            fields: E::fields,
        }
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityRef {}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.type_name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    None,
    Direct,
    ManyToMany { pivot_table: String },
    Polymorphic { prefix: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,
    pub target: EntityRef,
    pub target_table: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Column(ColumnKind),
    Relation(Relation),
}

/// Validated metadata for one entity field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: String,
    pub column: String,
    pub kind: FieldKind,
    pub search: Option<SearchTag>,
}

impl FieldMeta {
    pub fn column_kind(&self) -> Option<ColumnKind> {
        match &self.kind {
            FieldKind::Column(kind) => Some(*kind),
            FieldKind::Relation(_) => None,
        }
    }

    pub fn relation(&self) -> Option<&Relation> {
        match &self.kind {
            FieldKind::Relation(relation) => Some(relation),
            FieldKind::Column(_) => None,
        }
    }

    pub fn relation_kind(&self) -> RelationKind {
        self.relation()
            .map(|relation| relation.kind.clone())
            .unwrap_or(RelationKind::None)
    }

    pub fn is_relation(&self) -> bool {
        self.relation().is_some()
    }

    pub fn is_translated(&self) -> bool {
        self.column_kind() == Some(ColumnKind::Translations)
    }

    pub fn is_json(&self) -> bool {
        self.column_kind().is_some_and(|kind| kind.is_json())
    }

    pub fn search_pattern(&self) -> Option<&str> {
        match &self.search {
            Some(SearchTag::Pattern(pattern)) => Some(pattern),
            _ => None,
        }
    }
}

/// Table name and field metadata of one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    pub entity: EntityRef,
    pub table: String,
    pub fields: Vec<FieldMeta>,
    index: HashMap<String, usize>,
}

impl EntitySchema {
    pub fn build(entity: &EntityRef) -> Result<Self, CoreError> {
        let table = (entity.table_name)();
        if table.trim().is_empty() {
            return Err(CoreError::invalid_schema(entity.type_name, "empty table name"));
        }

        let mut fields = Vec::new();
        let mut index = HashMap::new();
        for def in (entity.fields)() {
            let meta = resolve_field(entity.type_name, def)?;
            if index.insert(meta.name.clone(), fields.len()).is_some() {
                return Err(CoreError::invalid_schema(
                    entity.type_name,
                    format!("field `{}` declared twice", meta.name),
                ));
            }
            fields.push(meta);
        }

        Ok(Self {
            entity: *entity,
            table,
            fields,
            index,
        })
    }

    pub fn name(&self) -> &str {
        self.entity.type_name
    }

    /// Looks a field up by name, then by column name.
    pub fn field(&self, name: &str) -> Result<&FieldMeta, CoreError> {
        self.index
            .get(name)
            .map(|&i| &self.fields[i])
            .or_else(|| self.fields.iter().find(|field| field.column == name))
            .ok_or_else(|| CoreError::field_not_found(self.name(), name))
    }
}

fn resolve_field(entity: &str, def: FieldDef) -> Result<FieldMeta, CoreError> {
    let invalid = |reason: String| {
        CoreError::invalid_schema(entity, format!("field `{}`: {reason}", def.name))
    };

    let tag = match &def.tag {
        Some(tag) => parse_tag(tag).map_err(invalid)?,
        None => Default::default(),
    };

    let column = tag
        .column
        .or_else(|| def.column.clone())
        .unwrap_or_else(|| def.name.clone());
    let polymorphic = tag.polymorphic.or_else(|| def.polymorphic.clone());
    let many2many = tag.many2many.or_else(|| def.many2many.clone());
    let search = tag.search.or_else(|| def.search.clone());

    if polymorphic.is_some() && many2many.is_some() {
        return Err(invalid(
            "polymorphic and many2many are mutually exclusive".to_string(),
        ));
    }

    let kind = match &def.target {
        Some(target) => {
            if tag.translate {
                return Err(invalid("relation fields cannot be translated".to_string()));
            }
            if matches!(search, Some(SearchTag::Pattern(_))) {
                return Err(invalid(
                    "relation fields take a bare `search` tag, not a pattern".to_string(),
                ));
            }
            let kind = match (polymorphic, many2many) {
                (Some(prefix), None) => RelationKind::Polymorphic { prefix },
                (None, Some(pivot_table)) => RelationKind::ManyToMany { pivot_table },
                _ => RelationKind::Direct,
            };
            FieldKind::Relation(Relation {
                kind,
                target: *target,
                target_table: (target.table_name)(),
            })
        }
        None => {
            if polymorphic.is_some() || many2many.is_some() {
                return Err(invalid("relation tag on a non-relation field".to_string()));
            }
            match &search {
                Some(SearchTag::Traverse) => {
                    return Err(invalid("search tag on a column needs a pattern".to_string()));
                }
                Some(SearchTag::Pattern(pattern)) if pattern.matches('*').count() != 1 => {
                    return Err(invalid(format!(
                        "search pattern `{pattern}` must contain exactly one `*`"
                    )));
                }
                _ => {}
            }
            if tag.translate {
                FieldKind::Column(ColumnKind::Translations)
            } else {
                FieldKind::Column(def.kind)
            }
        }
    };

    Ok(FieldMeta {
        name: def.name.clone(),
        column,
        kind,
        search,
    })
}
