use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{CatalogError, Column, Constraint, Index, Result, SchemaName, TableStructure};

/// Registry key of a table: `schema.name`, or just `name` without a schema.
pub fn table_key(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", schema, name),
        None => name.to_string(),
    }
}

fn check_table_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::InvalidTable(
            "Table name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// A named table with an optional schema qualifier.
///
/// The structure is shared copy-on-write: cloning a definition is cheap and
/// the first mutation through [`TableDefinition::add_column`] or
/// [`TableDefinition::add_index`] detaches the copy. The schema has no public
/// setter; it only changes when a [`Registry`](super::Registry) moves the
/// entry, which keeps the registry key in step with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    name: String,
    schema: Option<SchemaName>,
    structure: Arc<TableStructure>,
}

impl TableDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn key(&self) -> String {
        table_key(self.schema(), &self.name)
    }

    /// Same as [`TableDefinition::key`]; the qualified name used in SQL.
    pub fn fullname(&self) -> String {
        self.key()
    }

    pub fn structure(&self) -> &TableStructure {
        &self.structure
    }

    pub fn columns(&self) -> &[Column] {
        &self.structure.columns
    }

    /// True when both definitions point at the same structure allocation.
    pub fn shares_structure_with(&self, other: &TableDefinition) -> bool {
        Arc::ptr_eq(&self.structure, &other.structure)
    }

    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.structure.get_column(&column.name).is_some() {
            return Err(CatalogError::InvalidTable(format!(
                "Column '{}' declared twice in table '{}'",
                column.name, self.name
            )));
        }
        Arc::make_mut(&mut self.structure).columns.push(column);
        Ok(())
    }

    pub fn add_index(&mut self, index: Index) -> Result<()> {
        for column in &index.columns {
            if self.structure.get_column(column).is_none() {
                return Err(CatalogError::InvalidTable(format!(
                    "Column '{}' not found in table '{}'",
                    column, self.name
                )));
            }
        }
        Arc::make_mut(&mut self.structure).indexes.push(index);
        Ok(())
    }

    /// Checks the name and the structure, e.g. after deserializing.
    pub(crate) fn validate(&self) -> Result<()> {
        check_table_name(&self.name)?;
        self.structure.validate(&self.name)
    }

    pub(crate) fn set_schema(&mut self, schema: Option<SchemaName>) {
        self.schema = schema;
    }

    /// Copy of this definition bound to `schema`, structure shared.
    pub(crate) fn retargeted(&self, schema: &SchemaName) -> Self {
        Self {
            name: self.name.clone(),
            schema: Some(schema.clone()),
            structure: Arc::clone(&self.structure),
        }
    }
}

/// Builder for a [`TableDefinition`].
///
/// A builder without an explicit schema takes the registry's default schema
/// at the moment it is defined, and keeps it even if that default changes
/// later.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    schema: Option<String>,
    structure: TableStructure,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            structure: TableStructure::default(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.structure.columns.push(column);
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.structure.constraints.push(constraint);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.structure.indexes.push(index);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds without any inherited schema.
    pub fn build(self) -> Result<TableDefinition> {
        self.build_with_default(None)
    }

    pub(crate) fn build_with_default(
        self,
        default_schema: Option<&SchemaName>,
    ) -> Result<TableDefinition> {
        check_table_name(&self.name)?;
        self.structure.validate(&self.name)?;

        let schema = match self.schema {
            Some(label) => Some(SchemaName::new(label)?),
            None => default_schema.cloned(),
        };

        Ok(TableDefinition {
            name: self.name,
            schema,
            structure: Arc::new(self.structure),
        })
    }
}
