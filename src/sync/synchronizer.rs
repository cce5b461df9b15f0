use std::collections::HashSet;

use tracing::{debug, info};

use crate::core::{CatalogError, Result, SchemaName};
use crate::storage::{Registry, table_key};

/// Outcome of [`SchemaSynchronizer::rebind_in_place`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebindReport {
    /// `(old_key, new_key)` for every table that moved, in key order.
    pub moved: Vec<(String, String)>,
    /// Tables already bound to the target schema.
    pub unchanged: usize,
}

impl RebindReport {
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty()
    }
}

/// Binds every table of a registry to one target schema.
///
/// All checks run before the first write: an operation either rebinds or
/// clones every table, or fails and leaves every registry as it was.
///
/// ```
/// use schemabind::{Registry, SchemaSynchronizer, TableBuilder};
///
/// let mut shared = Registry::new();
/// shared.define_table(TableBuilder::new("test"))?;
///
/// let sync = SchemaSynchronizer::new("tenant_a")?;
/// let tenant = sync.clone_with_schema(&shared)?;
///
/// assert_eq!(tenant.list_tables(), vec!["tenant_a.test"]);
/// assert_eq!(shared.list_tables(), vec!["test"]);
/// # Ok::<(), schemabind::CatalogError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSynchronizer {
    target: SchemaName,
}

impl SchemaSynchronizer {
    pub fn new(schema: &str) -> Result<Self> {
        Ok(Self {
            target: SchemaName::new(schema)?,
        })
    }

    pub fn target(&self) -> &SchemaName {
        &self.target
    }

    fn target_key(&self, name: &str) -> String {
        table_key(Some(self.target.as_str()), name)
    }

    /// Moves every table of `registry` under the target schema and makes the
    /// target the registry's default schema.
    ///
    /// Tables already in the target schema are left alone, so a second call
    /// with the same target changes nothing.
    pub fn rebind_in_place(&self, registry: &mut Registry) -> Result<RebindReport> {
        let mut seen = HashSet::with_capacity(registry.len());
        let mut leaving = Vec::new();
        let mut unchanged = 0;

        for table in registry.tables() {
            let new_key = self.target_key(table.name());
            if !seen.insert(new_key.clone()) {
                return Err(CatalogError::DuplicateKey(new_key));
            }
            if table.schema() == Some(self.target.as_str()) {
                unchanged += 1;
            } else {
                leaving.push(table.key());
            }
        }

        let new_keys = registry.move_tables(&leaving, &self.target)?;
        let plan: Vec<(String, String)> = leaving.into_iter().zip(new_keys).collect();
        for (old_key, new_key) in &plan {
            debug!(from = %old_key, to = %new_key, "rebound table");
        }
        registry.set_default_schema_name(self.target.clone());

        info!(
            schema = %self.target,
            moved = plan.len(),
            unchanged,
            "rebound registry in place"
        );

        Ok(RebindReport {
            moved: plan,
            unchanged,
        })
    }

    /// Returns a new registry holding a retargeted copy of every table in
    /// `source`. `source` is not modified.
    pub fn clone_with_schema(&self, source: &Registry) -> Result<Registry> {
        self.merge_with_schema([source])
    }

    /// Clones several registries into one fresh registry under the target
    /// schema. Two tables with the same name anywhere in `sources` are a
    /// [`CatalogError::DuplicateKey`].
    pub fn merge_with_schema<'a, I>(&self, sources: I) -> Result<Registry>
    where
        I: IntoIterator<Item = &'a Registry>,
    {
        let mut merged = Registry::new();
        merged.set_default_schema_name(self.target.clone());

        let sources: Vec<&Registry> = sources.into_iter().collect();
        self.validate_clone(&sources, &merged)?;
        for source in &sources {
            self.copy_tables(source, &mut merged)?;
        }

        info!(
            schema = %self.target,
            sources = sources.len(),
            tables = merged.len(),
            "cloned registry with schema"
        );
        Ok(merged)
    }

    /// Copies every table of `source`, retargeted, into `destination`.
    ///
    /// `destination` keeps its own default schema. Returns the number of
    /// tables copied.
    pub fn clone_into(&self, source: &Registry, destination: &mut Registry) -> Result<usize> {
        self.validate_clone(&[source], destination)?;
        let copied = self.copy_tables(source, destination)?;
        info!(schema = %self.target, copied, "cloned tables into registry");
        Ok(copied)
    }

    fn validate_clone(&self, sources: &[&Registry], destination: &Registry) -> Result<()> {
        let mut seen = HashSet::new();
        for table in sources.iter().flat_map(|source| source.tables()) {
            let key = self.target_key(table.name());
            if destination.contains_table(&key) || !seen.insert(key.clone()) {
                return Err(CatalogError::DuplicateKey(key));
            }
        }
        Ok(())
    }

    fn copy_tables(&self, source: &Registry, destination: &mut Registry) -> Result<usize> {
        let mut copied = 0;
        for table in source.tables() {
            let copy = table.retargeted(&self.target);
            debug!(from = %table.key(), to = %copy.key(), "cloned table");
            destination.add_table(copy)?;
            copied += 1;
        }
        Ok(copied)
    }
}

/// Rebinds `registry` to `schema`. See [`SchemaSynchronizer::rebind_in_place`].
pub fn rebind_in_place(registry: &mut Registry, schema: &str) -> Result<RebindReport> {
    SchemaSynchronizer::new(schema)?.rebind_in_place(registry)
}

/// Clones `registry` into `schema`. See [`SchemaSynchronizer::clone_with_schema`].
pub fn clone_with_schema(registry: &Registry, schema: &str) -> Result<Registry> {
    SchemaSynchronizer::new(schema)?.clone_with_schema(registry)
}
