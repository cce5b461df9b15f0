use std::fmt;
use std::str::FromStr;

use crate::core::{CatalogError, Result, SchemaName};

pub const TARGET_SCHEMA_ENV: &str = "TARGET_SCHEMA";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const BIND_STRATEGY_ENV: &str = "SCHEMA_BIND_STRATEGY";

pub const DEFAULT_TARGET_SCHEMA: &str = "tenant_a";
pub const DEFAULT_VERSION_TABLE: &str = "alembic_version";

/// How the target schema is applied to the source registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindStrategy {
    /// Build a new registry; the source stays untouched.
    #[default]
    Clone,
    /// Move the source registry's tables in place.
    Rebind,
}

impl FromStr for BindStrategy {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "clone" => Ok(Self::Clone),
            "rebind" => Ok(Self::Rebind),
            other => Err(CatalogError::Config(format!(
                "Unknown bind strategy '{}' (expected 'clone' or 'rebind')",
                other
            ))),
        }
    }
}

impl fmt::Display for BindStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clone => write!(f, "clone"),
            Self::Rebind => write!(f, "rebind"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Emit a SQL script, no connection.
    #[default]
    Offline,
    /// Run against the database at the configured URL.
    Online,
}

impl FromStr for RunMode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "online" => Ok(Self::Online),
            other => Err(CatalogError::Config(format!(
                "Unknown run mode '{}' (expected 'offline' or 'online')",
                other
            ))),
        }
    }
}

/// Migration environment configuration.
///
/// Similar to an `env.py`: the target schema comes from the environment and
/// the version table lives in the same schema unless told otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Schema every model table is bound to
    pub target_schema: SchemaName,

    /// Database URL, required for online runs
    pub url: Option<String>,

    pub strategy: BindStrategy,

    pub mode: RunMode,

    /// Compare objects in every schema, not only the default one
    pub include_schemas: bool,

    /// Name of the table that records the applied revision
    pub version_table: String,

    /// Schema of the version table (defaults to the target schema)
    pub version_table_schema: Option<SchemaName>,
}

impl MigrationConfig {
    pub fn new(target_schema: &str) -> Result<Self> {
        Ok(Self {
            target_schema: SchemaName::new(target_schema)?,
            url: None,
            strategy: BindStrategy::default(),
            mode: RunMode::default(),
            include_schemas: true,
            version_table: DEFAULT_VERSION_TABLE.to_string(),
            version_table_schema: None,
        })
    }

    /// Reads `TARGET_SCHEMA`, `DATABASE_URL` and `SCHEMA_BIND_STRATEGY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`MigrationConfig::from_env`] with a custom variable source.
    ///
    /// An unset `TARGET_SCHEMA` falls back to `tenant_a`; a set but empty one
    /// is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let schema = lookup(TARGET_SCHEMA_ENV).unwrap_or_else(|| DEFAULT_TARGET_SCHEMA.to_string());
        let mut config = Self::new(&schema)?;

        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|url| !url.is_empty()) {
            config.url = Some(url);
        }
        if let Some(strategy) = lookup(BIND_STRATEGY_ENV) {
            config.strategy = strategy.parse()?;
        }
        Ok(config)
    }

    /// [`MigrationConfig::from_lookup`] with explicit values standing in for
    /// `TARGET_SCHEMA` and `SCHEMA_BIND_STRATEGY` when given.
    pub fn from_lookup_with_overrides<F>(
        lookup: F,
        schema: Option<&str>,
        strategy: Option<&str>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|name| {
            let explicit = match name {
                TARGET_SCHEMA_ENV => schema,
                BIND_STRATEGY_ENV => strategy,
                _ => None,
            };
            explicit.map(str::to_string).or_else(|| lookup(name))
        })
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn strategy(mut self, strategy: BindStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn include_schemas(mut self, include: bool) -> Self {
        self.include_schemas = include;
        self
    }

    pub fn version_table(mut self, name: &str) -> Self {
        self.version_table = name.to_string();
        self
    }

    pub fn version_table_schema(mut self, schema: &str) -> Result<Self> {
        self.version_table_schema = Some(SchemaName::new(schema)?);
        Ok(self)
    }

    pub fn effective_version_table_schema(&self) -> &SchemaName {
        self.version_table_schema
            .as_ref()
            .unwrap_or(&self.target_schema)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version_table.trim().is_empty() {
            return Err(CatalogError::Config(
                "Version table name cannot be empty".to_string(),
            ));
        }
        if self.mode == RunMode::Online && self.url.is_none() {
            return Err(CatalogError::Config(format!(
                "Online mode requires a database URL (set {})",
                DATABASE_URL_ENV
            )));
        }
        Ok(())
    }
}
