use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::{CatalogError, Result};

/// A validated schema label.
///
/// Labels are opaque and case-sensitive: `Tenant_A` and `tenant_a` are two
/// different schemas and no trimming is applied. The only rejected labels
/// are the empty string and strings made solely of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaName(String);

impl SchemaName {
    pub fn new(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(CatalogError::InvalidSchema(label));
        }
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SchemaName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SchemaName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SchemaName {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SchemaName {
    type Error = CatalogError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SchemaName> for String {
    fn from(value: SchemaName) -> Self {
        value.0
    }
}

impl PartialEq<str> for SchemaName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SchemaName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
