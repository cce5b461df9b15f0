pub mod config;
pub mod ddl;
pub mod environment;

pub use config::{
    BIND_STRATEGY_ENV, BindStrategy, DATABASE_URL_ENV, DEFAULT_TARGET_SCHEMA, MigrationConfig,
    RunMode, TARGET_SCHEMA_ENV,
};
pub use environment::{MigrationContext, MigrationEnvironment};
