//! SQL fragment compilers.
//!
//! Every compiler resolves dotted paths against an [`EntitySchema`] and the
//! registered join strategies, producing parameterized fragments whose `?`
//! placeholders line up left-to-right with the returned arguments.
//!
//! [`EntitySchema`]: crate::domain::schema::entities::EntitySchema

pub mod filter;
pub mod preload;
pub(crate) mod relation;
pub mod search;
pub mod sort;
pub mod sql;
pub mod translation;

pub use filter::FilterCompiler;
pub use preload::resolve_preloads;
pub use search::SearchCompiler;
pub use sort::{CompiledSort, SortCompiler};
pub use sql::{Dialect, SqlFragment};
pub use translation::{compile_select, resolve_column};
