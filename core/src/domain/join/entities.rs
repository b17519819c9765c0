use serde::{Deserialize, Serialize};

use crate::domain::{
    common::entities::app_errors::CoreError,
    compiler::sql::PRIMARY_KEY,
    schema::entities::{FieldMeta, RelationKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToMany,
    Polymorphic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    Inner,
    #[default]
    Left,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

/// Key columns of a join; exactly one group, matching the relation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKeys {
    Direct {
        local_key: String,
        foreign_key: String,
    },
    Pivot {
        pivot_table: String,
        pivot_local_key: String,
        pivot_foreign_key: String,
    },
    Polymorphic {
        id_column: String,
        type_column: String,
        type_value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    pub relation_type: RelationType,
    pub table: String,
    #[serde(default)]
    pub join_type: Option<JoinType>,
    pub keys: JoinKeys,
}

impl JoinConfig {
    /// `<base>.<local_key> = <table>.<foreign_key>`, a belongs-to / has-one link.
    pub fn one_to_one(
        table: impl Into<String>,
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            relation_type: RelationType::OneToOne,
            table: table.into(),
            join_type: None,
            keys: JoinKeys::Direct {
                local_key: local_key.into(),
                foreign_key: foreign_key.into(),
            },
        }
    }

    pub fn one_to_many(
        table: impl Into<String>,
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            relation_type: RelationType::OneToMany,
            ..Self::one_to_one(table, local_key, foreign_key)
        }
    }

    pub fn many_to_many(
        table: impl Into<String>,
        pivot_table: impl Into<String>,
        pivot_local_key: impl Into<String>,
        pivot_foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            relation_type: RelationType::ManyToMany,
            table: table.into(),
            join_type: None,
            keys: JoinKeys::Pivot {
                pivot_table: pivot_table.into(),
                pivot_local_key: pivot_local_key.into(),
                pivot_foreign_key: pivot_foreign_key.into(),
            },
        }
    }

    pub fn polymorphic(
        table: impl Into<String>,
        id_column: impl Into<String>,
        type_column: impl Into<String>,
        type_value: impl Into<String>,
    ) -> Self {
        Self {
            relation_type: RelationType::Polymorphic,
            table: table.into(),
            join_type: None,
            keys: JoinKeys::Polymorphic {
                id_column: id_column.into(),
                type_column: type_column.into(),
                type_value: type_value.into(),
            },
        }
    }

    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = Some(join_type);
        self
    }

    /// LEFT JOIN unless specified.
    pub fn join_type(&self) -> JoinType {
        self.join_type.unwrap_or_default()
    }

    /// Strategy implied by a relation field when nothing is registered for its path.
    pub fn for_field(parent_table: &str, field: &FieldMeta) -> Option<Self> {
        let relation = field.relation()?;
        let table = relation.target_table.clone();

        let config = match &relation.kind {
            RelationKind::None => return None,
            RelationKind::Direct => {
                Self::one_to_one(table, format!("{}{PRIMARY_KEY}", field.name), PRIMARY_KEY)
            }
            RelationKind::ManyToMany { pivot_table } => Self::many_to_many(
                table.clone(),
                pivot_table.clone(),
                format!("{parent_table}{PRIMARY_KEY}"),
                format!("{table}{PRIMARY_KEY}"),
            ),
            RelationKind::Polymorphic { prefix } => Self::polymorphic(
                table,
                format!("{prefix}{PRIMARY_KEY}"),
                format!("{prefix}Type"),
                parent_table,
            ),
        };

        Some(config)
    }

    pub fn validate(&self, path: &str) -> Result<(), CoreError> {
        if self.table.trim().is_empty() {
            return Err(CoreError::invalid_join(path, "missing table"));
        }

        let required: Vec<(&str, &String)> = match (&self.relation_type, &self.keys) {
            (
                RelationType::OneToOne | RelationType::OneToMany,
                JoinKeys::Direct {
                    local_key,
                    foreign_key,
                },
            ) => vec![("local_key", local_key), ("foreign_key", foreign_key)],
            (
                RelationType::ManyToMany,
                JoinKeys::Pivot {
                    pivot_table,
                    pivot_local_key,
                    pivot_foreign_key,
                },
            ) => vec![
                ("pivot_table", pivot_table),
                ("pivot_local_key", pivot_local_key),
                ("pivot_foreign_key", pivot_foreign_key),
            ],
            (
                RelationType::Polymorphic,
                JoinKeys::Polymorphic {
                    id_column,
                    type_column,
                    type_value,
                },
            ) => vec![
                ("id_column", id_column),
                ("type_column", type_column),
                ("type_value", type_value),
            ],
            (relation_type, _) => {
                return Err(CoreError::invalid_join(
                    path,
                    format!("keys do not match relation type {relation_type:?}"),
                ));
            }
        };

        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CoreError::invalid_join(path, format!("missing {name}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fixtures::Post, schema::services::SchemaRegistry};

    #[test]
    fn test_default_join_type_is_left() {
        let config = JoinConfig::one_to_one("Profile", "ProfileID", "ID");
        assert_eq!(config.join_type(), JoinType::Left);
        assert_eq!(
            config.with_join_type(JoinType::Inner).join_type(),
            JoinType::Inner
        );
    }

    #[test]
    fn test_for_field_defaults() {
        let schema = SchemaRegistry::new().describe::<Post>().unwrap();

        let author = JoinConfig::for_field("Post", schema.field("Author").unwrap()).unwrap();
        assert_eq!(author, JoinConfig::one_to_one("Author", "AuthorID", "ID"));

        let tags = JoinConfig::for_field("Post", schema.field("Tags").unwrap()).unwrap();
        assert_eq!(
            tags,
            JoinConfig::many_to_many("Tag", "PostTag", "PostID", "TagID")
        );

        let comments = JoinConfig::for_field("Post", schema.field("Comments").unwrap()).unwrap();
        assert_eq!(
            comments,
            JoinConfig::polymorphic("Comment", "HolderID", "HolderType", "Post")
        );

        assert!(JoinConfig::for_field("Post", schema.field("Title").unwrap()).is_none());
    }

    #[test]
    fn test_validate_mismatched_keys() {
        let mut config = JoinConfig::one_to_one("Profile", "ProfileID", "ID");
        config.relation_type = RelationType::ManyToMany;
        assert!(matches!(
            config.validate("Profile"),
            Err(CoreError::InvalidJoinConfig { .. })
        ));
    }

    #[test]
    fn test_validate_missing_key() {
        let config = JoinConfig::polymorphic("Comment", "HolderID", "", "Post");
        assert_eq!(
            config.validate("Comments"),
            Err(CoreError::invalid_join("Comments", "missing type_column"))
        );
        assert!(
            JoinConfig::one_to_one("", "a", "b")
                .validate("X")
                .is_err()
        );
    }

    #[test]
    fn test_config_from_json() {
        let config: JoinConfig = serde_json::from_str(
            r#"{
                "relation_type": "one_to_many",
                "table": "Comment",
                "join_type": "inner",
                "keys": {"direct": {"local_key": "ID", "foreign_key": "PostID"}}
            }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            JoinConfig::one_to_many("Comment", "ID", "PostID").with_join_type(JoinType::Inner)
        );
        assert!(config.validate("Comments").is_ok());
    }
}
