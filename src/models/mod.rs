//! Shared table definitions.
//!
//! These tables are declared without a schema, the way a models package
//! shared between several services would declare them. Consumers bind them
//! to a tenant schema with [`crate::sync`] or build them directly into a
//! schema-bound registry with [`registry_with_schema`].

use crate::core::{Column, ColumnDefault, DataType, Result};
use crate::storage::{Registry, TableBuilder};

pub const TEST_TABLE: &str = "test";
pub const ANOTHER_TABLE: &str = "another";

fn id_column() -> Column {
    Column::new("id", DataType::Uuid)
        .primary_key()
        .default(ColumnDefault::GenerateUuid)
}

pub fn test_table() -> TableBuilder {
    TableBuilder::new(TEST_TABLE)
        .column(id_column())
        .column(Column::new("name", DataType::Text).not_null())
}

pub fn another_table() -> TableBuilder {
    TableBuilder::new(ANOTHER_TABLE)
        .column(id_column())
        .column(Column::new("value", DataType::Integer).not_null())
}

pub fn define_test(registry: &mut Registry) -> Result<()> {
    registry.define_table(test_table())?;
    Ok(())
}

pub fn define_another(registry: &mut Registry) -> Result<()> {
    registry.define_table(another_table())?;
    Ok(())
}

/// The shared registry: no default schema, one `test` table.
pub fn metadata() -> Result<Registry> {
    let mut registry = Registry::new();
    define_test(&mut registry)?;
    Ok(registry)
}

/// Builds the models into a registry whose default schema is set before any
/// table is defined, so every table is born in `schema`.
pub fn registry_with_schema(schema: &str) -> Result<Registry> {
    let mut registry = Registry::with_default_schema(schema)?;
    define_test(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_has_no_schema() {
        let registry = metadata().unwrap();
        assert_eq!(registry.default_schema(), None);
        assert_eq!(registry.list_tables(), vec!["test"]);

        let table = registry.get_table("test").unwrap();
        assert_eq!(table.schema(), None);
        assert_eq!(table.structure().primary_key_columns(), vec!["id"]);
        assert!(!table.structure().get_column("name").unwrap().nullable);
    }

    #[test]
    fn test_registry_with_schema() {
        let registry = registry_with_schema("tenant_c").unwrap();
        assert_eq!(registry.default_schema(), Some("tenant_c"));
        assert_eq!(registry.list_tables(), vec!["tenant_c.test"]);
        assert!(registry_with_schema("").is_err());
    }

    #[test]
    fn test_define_another() {
        let mut registry = metadata().unwrap();
        define_another(&mut registry).unwrap();
        assert_eq!(registry.list_tables(), vec!["another", "test"]);
        assert!(define_another(&mut registry).is_err());
    }
}
