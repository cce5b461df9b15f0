use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid schema label: {0:?}")]
    InvalidSchema(String),

    #[error("Duplicate table key '{0}'")]
    DuplicateKey(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Invalid table definition: {0}")]
    InvalidTable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
