pub mod parser;
pub mod value_objects;

pub use parser::*;
pub use value_objects::*;
