pub mod common;
pub mod compiler;
pub mod join;
pub mod query;
pub mod schema;
pub mod value;

#[cfg(test)]
pub(crate) mod fixtures;
