use crate::core::{CatalogError, Result};
use crate::models;
use crate::storage::Registry;
use crate::sync::{clone_with_schema, rebind_in_place};

use super::{Report, describe_registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Solution {
    RebindExisting,
    SchemaAtDefinition,
    Factory,
    Clone,
}

impl Solution {
    pub const ALL: [Solution; 4] = [
        Solution::RebindExisting,
        Solution::SchemaAtDefinition,
        Solution::Factory,
        Solution::Clone,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::RebindExisting => 1,
            Self::SchemaAtDefinition => 2,
            Self::Factory => 3,
            Self::Clone => 4,
        }
    }

    pub fn from_number(number: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.number() == number)
            .ok_or_else(|| CatalogError::Config(format!("No solution number {}", number)))
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::RebindExisting => "Rebind existing tables in place",
            Self::SchemaAtDefinition => "Explicit schema at definition time",
            Self::Factory => "Factory registry with a default schema",
            Self::Clone => "Clone the registry into a new schema",
        }
    }

    pub fn run(self) -> Result<Report> {
        let title = format!("SOLUTION {}: {}", self.number(), self.description());
        let mut report = Report::new(&title);
        match self {
            Self::RebindExisting => rebind_existing(&mut report)?,
            Self::SchemaAtDefinition => schema_at_definition(&mut report)?,
            Self::Factory => factory(&mut report)?,
            Self::Clone => clone_registry(&mut report)?,
        }
        Ok(report)
    }
}

fn describe_tables(report: &mut Report, registry: &Registry) {
    for table in registry.tables() {
        report.line(format!(
            "- {}: schema={:?}, fullname={:?}",
            table.key(),
            table.schema(),
            table.fullname()
        ));
    }
}

fn rebind_existing(report: &mut Report) -> Result<()> {
    report.raw("Models come from a shared package without a schema and must be");
    report.raw("bound to one at runtime, e.g. in a migration environment.");

    let mut registry = models::metadata()?;
    report.step("Initial state:");
    describe_registry(report, &registry);

    report.step("Rebinding every table to 'tenant_a'...");
    let outcome = rebind_in_place(&mut registry, "tenant_a")?;
    for (from, to) in &outcome.moved {
        report.line(format!("moved {} -> {}", from, to));
    }

    report.step("After rebinding:");
    describe_registry(report, &registry);
    describe_tables(report, &registry);
    Ok(())
}

fn schema_at_definition(report: &mut Report) -> Result<()> {
    report.raw("The schema is known up front and written into each table definition.");

    let mut registry = Registry::new();
    registry.define_table(models::test_table().schema("tenant_b"))?;

    report.step("Table defined with an explicit schema 'tenant_b':");
    describe_registry(report, &registry);
    describe_tables(report, &registry);
    Ok(())
}

fn factory(report: &mut Report) -> Result<()> {
    report.raw("Each deployment builds its own registry with the schema set");
    report.raw("before any table is defined.");

    report.step("Building the models with default schema 'tenant_c'...");
    let registry = models::registry_with_schema("tenant_c")?;

    report.step("Result:");
    describe_registry(report, &registry);
    describe_tables(report, &registry);
    Ok(())
}

fn clone_registry(report: &mut Report) -> Result<()> {
    report.raw("Shared models are cloned into a tenant schema; the shared registry");
    report.raw("is never modified, so several tenants can coexist.");

    let mut shared = models::metadata()?;
    models::define_another(&mut shared)?;

    report.step("Shared registry:");
    describe_registry(report, &shared);

    report.step("Cloning into 'tenant_d'...");
    let cloned = clone_with_schema(&shared, "tenant_d")?;

    report.step("Cloned registry:");
    describe_registry(report, &cloned);
    describe_tables(report, &cloned);

    report.step("Shared registry is unchanged:");
    describe_registry(report, &shared);
    Ok(())
}
