use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{TableBuilder, TableDefinition};
use crate::core::{CatalogError, Result, SchemaName};

/// Keyed catalog of table definitions with a default schema.
///
/// Keys are always derived from each table's `(schema, name)` pair. The table
/// map sits behind an `Arc` and is copied on the first write, so cloning a
/// registry is cheap and the clone never observes later writes to the
/// original (or the other way round).
///
/// The default schema only applies to tables defined *after* it is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistrySnapshot", into = "RegistrySnapshot")]
pub struct Registry {
    default_schema: Option<SchemaName>,
    tables: Arc<BTreeMap<String, TableDefinition>>,
}

/// Serialized form: the key of each table is implied by its definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistrySnapshot {
    default_schema: Option<SchemaName>,
    tables: Vec<TableDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_schema(schema: &str) -> Result<Self> {
        Ok(Self {
            default_schema: Some(SchemaName::new(schema)?),
            tables: Arc::new(BTreeMap::new()),
        })
    }

    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    /// Sets the schema for tables defined from now on.
    ///
    /// Existing tables keep both their schema and their key. Use
    /// [`crate::sync::rebind_in_place`] to move them.
    pub fn set_default_schema(&mut self, schema: Option<&str>) -> Result<()> {
        self.default_schema = schema.map(SchemaName::new).transpose()?;
        Ok(())
    }

    pub(crate) fn set_default_schema_name(&mut self, schema: SchemaName) {
        self.default_schema = Some(schema);
    }

    /// Builds the table against the current default schema and registers it.
    pub fn define_table(&mut self, builder: TableBuilder) -> Result<&TableDefinition> {
        let table = builder.build_with_default(self.default_schema.as_ref())?;
        let key = table.key();
        self.add_table(table)?;
        self.get_table(&key)
    }

    pub fn add_table(&mut self, table: TableDefinition) -> Result<()> {
        let key = table.key();
        if self.tables.contains_key(&key) {
            return Err(CatalogError::TableExists(key));
        }
        Arc::make_mut(&mut self.tables).insert(key, table);
        Ok(())
    }

    pub fn remove_table(&mut self, key: &str) -> Result<TableDefinition> {
        Arc::make_mut(&mut self.tables)
            .remove(key)
            .ok_or_else(|| CatalogError::TableNotFound(key.to_string()))
    }

    pub fn get_table(&self, key: &str) -> Result<&TableDefinition> {
        self.tables
            .get(key)
            .ok_or_else(|| CatalogError::TableNotFound(key.to_string()))
    }

    pub fn table(&self, key: &str) -> Option<&TableDefinition> {
        self.tables.get(key)
    }

    /// Mutable access for structural changes. Detaches shared storage.
    pub fn table_mut(&mut self, key: &str) -> Option<&mut TableDefinition> {
        if !self.tables.contains_key(key) {
            return None;
        }
        Arc::make_mut(&mut self.tables).get_mut(key)
    }

    pub fn contains_table(&self, key: &str) -> bool {
        self.tables.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn list_tables(&self) -> Vec<&str> {
        self.keys().collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDefinition> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Moves every table stored under `keys` to `schema` as one batch.
    ///
    /// Returns the new keys in the order of `keys`. A new key may be one that
    /// another table of the batch is leaving; it must not collide with another
    /// new key or with a table that stays put. On error the registry is left
    /// untouched.
    pub(crate) fn move_tables(
        &mut self,
        keys: &[String],
        schema: &SchemaName,
    ) -> Result<Vec<String>> {
        let leaving: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let mut targets = HashSet::with_capacity(keys.len());
        let mut new_keys = Vec::with_capacity(keys.len());

        for key in keys {
            let table = self.get_table(key)?;
            let new_key = super::table_key(Some(schema.as_str()), table.name());
            let occupied =
                self.tables.contains_key(&new_key) && !leaving.contains(new_key.as_str());
            if occupied || !targets.insert(new_key.clone()) {
                return Err(CatalogError::DuplicateKey(new_key));
            }
            new_keys.push(new_key);
        }
        if keys.is_empty() {
            return Ok(new_keys);
        }

        let tables = Arc::make_mut(&mut self.tables);
        let mut moved = Vec::with_capacity(keys.len());
        for (key, new_key) in keys.iter().zip(&new_keys) {
            if let Some(mut table) = tables.remove(key) {
                table.set_schema(Some(schema.clone()));
                moved.push((new_key.clone(), table));
            }
        }
        tables.extend(moved);
        Ok(new_keys)
    }

    /// Checks that every key matches the `(schema, name)` of its table.
    pub fn check_consistency(&self) -> Result<()> {
        for (key, table) in self.tables.iter() {
            if *key != table.key() {
                return Err(CatalogError::InvalidTable(format!(
                    "Registry key '{}' does not match table '{}'",
                    key,
                    table.fullname()
                )));
            }
        }
        Ok(())
    }
}

impl From<Registry> for RegistrySnapshot {
    fn from(registry: Registry) -> Self {
        Self {
            default_schema: registry.default_schema,
            tables: registry.tables.values().cloned().collect(),
        }
    }
}

impl TryFrom<RegistrySnapshot> for Registry {
    type Error = CatalogError;

    fn try_from(snapshot: RegistrySnapshot) -> Result<Self> {
        let mut registry = Registry {
            default_schema: snapshot.default_schema,
            tables: Arc::new(BTreeMap::new()),
        };
        for table in snapshot.tables {
            table.validate()?;
            registry.add_table(table)?;
        }
        Ok(registry)
    }
}
