use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CatalogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    BigInt,
    Float,
    Text,
    Varchar(u32),
    Boolean,
    Uuid,
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::Float => write!(f, "DOUBLE PRECISION"),
            Self::Text => write!(f, "TEXT"),
            Self::Varchar(len) => write!(f, "VARCHAR({})", len),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Uuid => write!(f, "UUID"),
            Self::Timestamp => write!(f, "TIMESTAMP WITH TIME ZONE"),
        }
    }
}

/// Server-side default applied when a row omits the column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnDefault {
    GenerateUuid,
    Now,
    Expression(String),
}

impl ColumnDefault {
    pub fn to_sql(&self) -> &str {
        match self {
            Self::GenerateUuid => "gen_random_uuid()",
            Self::Now => "now()",
            Self::Expression(expr) => expr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<ColumnDefault>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Primary key columns are implicitly NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    PrimaryKey {
        columns: Vec<String>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    /// `references` is `[schema.]table.column`, kept verbatim.
    ForeignKey {
        columns: Vec<String>,
        references: String,
    },
    Check {
        name: Option<String>,
        expr: String,
    },
}

impl Constraint {
    fn local_columns(&self) -> &[String] {
        match self {
            Self::PrimaryKey { columns }
            | Self::Unique { columns, .. }
            | Self::ForeignKey { columns, .. } => columns.as_slice(),
            Self::Check { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Explicit name, or `idx_<table>_<col>_<col>...`.
    pub fn resolved_name(&self, table_name: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let mut name = format!("idx_{}", sanitize_identifier(table_name));
                for column in &self.columns {
                    name.push('_');
                    name.push_str(&sanitize_identifier(column));
                }
                name
            }
        }
    }
}

/// Lowercases and maps every non-alphanumeric character to `_`.
pub fn sanitize_identifier(input: &str) -> String {
    input
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Everything about a table except its name and schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStructure {
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
}

impl TableStructure {
    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn primary_key_columns(&self) -> Vec<&str> {
        let declared = self.constraints.iter().find_map(|c| match c {
            Constraint::PrimaryKey { columns } => Some(columns),
            _ => None,
        });
        match declared {
            Some(columns) => columns.iter().map(String::as_str).collect(),
            None => self
                .columns
                .iter()
                .filter(|col| col.primary_key)
                .map(|col| col.name.as_str())
                .collect(),
        }
    }

    pub fn validate(&self, table_name: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name.is_empty() {
                return Err(CatalogError::InvalidTable(format!(
                    "Table '{}' has a column with an empty name",
                    table_name
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(CatalogError::InvalidTable(format!(
                    "Column '{}' declared twice in table '{}'",
                    column.name, table_name
                )));
            }
        }

        let referenced = self
            .constraints
            .iter()
            .flat_map(|c| c.local_columns())
            .chain(self.indexes.iter().flat_map(|idx| idx.columns.iter()));
        for name in referenced {
            if !seen.contains(name.as_str()) {
                return Err(CatalogError::InvalidTable(format!(
                    "Column '{}' not found in table '{}'",
                    name, table_name
                )));
            }
        }

        Ok(())
    }
}
