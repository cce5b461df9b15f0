pub mod error;
pub mod schema_name;
pub mod types;

pub use error::{CatalogError, Result};
pub use schema_name::SchemaName;
pub use types::{Column, ColumnDefault, Constraint, DataType, Index, TableStructure};
