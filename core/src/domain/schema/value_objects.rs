use crate::domain::{
    schema::{entities::EntityRef, ports::Entity},
    value::entities::ColumnKind,
};

/// How a field takes part in free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTag {
    /// LIKE template with one `*` standing for the search term, e.g. `%*%`.
    Pattern(String),
    /// Relation field: search recurses into the target's tagged fields.
    Traverse,
}

/// Field declaration as written by an entity, before validation.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub kind: ColumnKind,
    pub column: Option<String>,
    pub target: Option<EntityRef>,
    pub polymorphic: Option<String>,
    pub many2many: Option<String>,
    pub search: Option<SearchTag>,
    pub tag: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            column: None,
            target: None,
            polymorphic: None,
            many2many: None,
            search: None,
            tag: None,
        }
    }

    /// Column holding a language -> text JSON map.
    pub fn translated(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Translations)
    }

    /// Direct relation to `T`, refined with [`many2many`](Self::many2many)
    /// or [`polymorphic`](Self::polymorphic).
    pub fn relation<T: Entity>(name: impl Into<String>) -> Self {
        Self {
            target: Some(EntityRef::of::<T>()),
            ..Self::new(name, ColumnKind::Uint)
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn many2many(mut self, pivot_table: impl Into<String>) -> Self {
        self.many2many = Some(pivot_table.into());
        self
    }

    pub fn polymorphic(mut self, prefix: impl Into<String>) -> Self {
        self.polymorphic = Some(prefix.into());
        self
    }

    pub fn search(mut self, pattern: impl Into<String>) -> Self {
        self.search = Some(SearchTag::Pattern(pattern.into()));
        self
    }

    pub fn searchable(mut self) -> Self {
        self.search = Some(SearchTag::Traverse);
        self
    }

    /// Struct-tag style declaration, e.g. `column:title;search:%*%;translate`.
    /// Parsed and validated when the schema is described.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Declarations read from a tag string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTag {
    pub column: Option<String>,
    pub polymorphic: Option<String>,
    pub many2many: Option<String>,
    pub search: Option<SearchTag>,
    pub translate: bool,
}

pub fn parse_tag(tag: &str) -> Result<ParsedTag, String> {
    let mut parsed = ParsedTag::default();

    for part in tag.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = match part.split_once(':') {
            Some((key, value)) => (key.trim(), Some(value.trim())),
            None => (part, None),
        };

        match (key, value) {
            ("column", Some(v)) if !v.is_empty() => parsed.column = Some(v.to_string()),
            ("polymorphic", Some(v)) if !v.is_empty() => parsed.polymorphic = Some(v.to_string()),
            ("many2many", Some(v)) if !v.is_empty() => parsed.many2many = Some(v.to_string()),
            ("search", Some(v)) if !v.is_empty() => {
                parsed.search = Some(SearchTag::Pattern(v.to_string()))
            }
            ("search", None) => parsed.search = Some(SearchTag::Traverse),
            ("translate", None) => parsed.translate = true,
            _ => return Err(format!("unsupported tag entry `{part}`")),
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_tag() {
        let parsed = parse_tag("column:title; search:%*% ;translate").unwrap();
        assert_eq!(parsed.column.as_deref(), Some("title"));
        assert_eq!(parsed.search, Some(SearchTag::Pattern("%*%".to_string())));
        assert!(parsed.translate);
        assert!(parsed.polymorphic.is_none());
    }

    #[test]
    fn test_parse_relation_tag() {
        let parsed = parse_tag("many2many:PostTag;search").unwrap();
        assert_eq!(parsed.many2many.as_deref(), Some("PostTag"));
        assert_eq!(parsed.search, Some(SearchTag::Traverse));
    }

    #[test]
    fn test_parse_rejects_unknown_or_empty() {
        assert!(parse_tag("colour:red").is_err());
        assert!(parse_tag("column:").is_err());
        assert!(parse_tag("translate:yes").is_err());
        assert_eq!(parse_tag("").unwrap(), ParsedTag::default());
    }
}
