//! Blog entities shared by the unit tests.

use crate::domain::{
    schema::{ports::Entity, value_objects::FieldDef},
    value::entities::ColumnKind,
};

pub struct Post;

impl Entity for Post {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("ID", ColumnKind::Uint),
            FieldDef::new("Title", ColumnKind::String).tag("search:%*%"),
            FieldDef::new("Views", ColumnKind::Int).column("view_count"),
            FieldDef::new("Rating", ColumnKind::Float),
            FieldDef::new("Published", ColumnKind::Bool),
            FieldDef::new("CreatedAt", ColumnKind::Time),
            FieldDef::new("OwnerID", ColumnKind::Uuid),
            FieldDef::new("Meta", ColumnKind::Json),
            FieldDef::translated("Headline").search("%*%"),
            FieldDef::new("AuthorID", ColumnKind::Uint),
            FieldDef::relation::<Author>("Author").searchable(),
            FieldDef::relation::<Tag>("Tags").tag("many2many:PostTag;search"),
            FieldDef::relation::<Comment>("Comments").tag("polymorphic:Holder;search"),
        ]
    }
}

pub struct Author;

impl Entity for Author {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("ID", ColumnKind::Uint),
            FieldDef::new("Name", ColumnKind::String).search("*%"),
            FieldDef::new("Email", ColumnKind::String),
            FieldDef::new("ProfileID", ColumnKind::Uint),
            FieldDef::relation::<Profile>("Profile").searchable(),
        ]
    }
}

pub struct Profile;

impl Entity for Profile {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("ID", ColumnKind::Uint),
            FieldDef::new("Bio", ColumnKind::String).search("%*%"),
            FieldDef::new("Age", ColumnKind::Int),
        ]
    }
}

pub struct Tag;

impl Entity for Tag {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("ID", ColumnKind::Uint),
            FieldDef::new("Label", ColumnKind::String).search("%*%"),
            FieldDef::new("Weight", ColumnKind::Int),
        ]
    }
}

pub struct Comment;

impl Entity for Comment {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("ID", ColumnKind::Uint),
            FieldDef::new("Body", ColumnKind::String).search("%*%"),
            FieldDef::new("HolderID", ColumnKind::Uint),
            FieldDef::new("HolderType", ColumnKind::String),
        ]
    }
}

/// Two entities whose searchable relations point at each other.
pub struct Ping;

impl Entity for Ping {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("Name", ColumnKind::String).search("%*%"),
            FieldDef::relation::<Pong>("Pong").searchable(),
        ]
    }
}

pub struct Pong;

impl Entity for Pong {
    fn table_name() -> String {
        "pongs".to_string()
    }

    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("Name", ColumnKind::String).search("%*%"),
            FieldDef::relation::<Ping>("Ping").searchable(),
        ]
    }
}
