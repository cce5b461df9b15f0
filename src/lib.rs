// ============================================================================
// schemabind Library
// ============================================================================

//! Table catalogs whose lookup keys follow their tables' schemas.
//!
//! A [`Registry`] keys every table by `schema.name`. Changing a registry's
//! default schema only affects tables defined afterwards; to move existing
//! tables use a [`SchemaSynchronizer`], either in place or by cloning into a
//! new registry.
//!
//! ```
//! use schemabind::{clone_with_schema, models};
//!
//! # fn main() -> schemabind::Result<()> {
//! let shared = models::metadata()?;
//! let tenant = clone_with_schema(&shared, "tenant_a")?;
//!
//! assert_eq!(tenant.list_tables(), vec!["tenant_a.test"]);
//! assert_eq!(shared.list_tables(), vec!["test"]);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod demo;
pub mod migration;
pub mod models;
pub mod storage;
pub mod sync;

// Re-export main types for convenience
pub use crate::core::{
    CatalogError, Column, ColumnDefault, Constraint, DataType, Index, Result, SchemaName,
    TableStructure,
};
pub use migration::{BindStrategy, MigrationConfig, MigrationContext, MigrationEnvironment, RunMode};
pub use storage::{Registry, TableBuilder, TableDefinition, table_key};
pub use sync::{RebindReport, SchemaSynchronizer, clone_with_schema, rebind_in_place};
