pub mod registry;
pub mod table;

pub use registry::Registry;
pub use table::{TableBuilder, TableDefinition, table_key};
