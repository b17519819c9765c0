use crate::domain::schema::value_objects::FieldDef;

/// Declarative description of a queryable entity.
///
/// Implementations are read once per type and cached by the
/// [`SchemaRegistry`](super::services::SchemaRegistry).
pub trait Entity: 'static {
    /// Table name, defaulting to the type's own name.
    fn table_name() -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    fn fields() -> Vec<FieldDef>;
}

/// `crate::module::Post<T>` -> `Post`
pub fn short_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
