use tracing::info;

use super::config::{BindStrategy, MigrationConfig, RunMode};
use super::ddl;
use crate::core::{Result, SchemaName};
use crate::storage::{Registry, table_key};
use crate::sync::SchemaSynchronizer;

/// Everything a migration engine needs once the target schema is applied.
#[derive(Debug, Clone)]
pub struct MigrationContext {
    target_metadata: Registry,
    version_table: String,
    version_table_schema: SchemaName,
    include_schemas: bool,
    mode: RunMode,
    url: Option<String>,
}

impl MigrationContext {
    /// Registry the engine compares against the database.
    pub fn target_metadata(&self) -> &Registry {
        &self.target_metadata
    }

    pub fn version_table_schema(&self) -> &SchemaName {
        &self.version_table_schema
    }

    /// `schema.version_table`
    pub fn version_table_key(&self) -> String {
        table_key(Some(self.version_table_schema.as_str()), &self.version_table)
    }

    pub fn include_schemas(&self) -> bool {
        self.include_schemas
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_offline(&self) -> bool {
        self.mode == RunMode::Offline
    }

    pub fn render_offline_script(&self) -> String {
        ddl::render_script(
            &self.target_metadata,
            &self.version_table_schema,
            &self.version_table,
        )
    }
}

/// Hook between the shared models and the migration engine.
#[derive(Debug, Clone)]
pub struct MigrationEnvironment {
    config: MigrationConfig,
}

impl MigrationEnvironment {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(MigrationConfig::from_env()?))
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Applies the target schema to `source` and builds the context.
    ///
    /// With [`BindStrategy::Clone`] `source` is only read. With
    /// [`BindStrategy::Rebind`] it is rebound in place and the context holds
    /// a copy of the result.
    pub fn configure(&self, source: &mut Registry) -> Result<MigrationContext> {
        self.config.validate()?;

        let sync = SchemaSynchronizer::new(&self.config.target_schema)?;
        let target_metadata = match self.config.strategy {
            BindStrategy::Clone => sync.clone_with_schema(source)?,
            BindStrategy::Rebind => {
                sync.rebind_in_place(source)?;
                source.clone()
            }
        };

        let context = MigrationContext {
            target_metadata,
            version_table: self.config.version_table.clone(),
            version_table_schema: self.config.effective_version_table_schema().clone(),
            include_schemas: self.config.include_schemas,
            mode: self.config.mode,
            url: self.config.url.clone(),
        };

        info!(
            schema = %self.config.target_schema,
            strategy = %self.config.strategy,
            tables = context.target_metadata.len(),
            version_table = %context.version_table_key(),
            "configured migration context"
        );
        Ok(context)
    }
}
