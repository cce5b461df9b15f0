use crate::core::Result;
use crate::models;

use super::{Report, describe_registry};

/// Sets the default schema on the shared registry after its tables exist and
/// shows that neither the keys nor the tables follow.
pub fn run() -> Result<Report> {
    let mut report = Report::new("DEMONSTRATING THE PROBLEM");
    let mut registry = models::metadata()?;

    report.step("Initial state (no schema set):");
    describe_registry(&mut report, &registry);
    let table = registry.get_table(models::TEST_TABLE)?;
    report.line(format!("table schema: {:?}", table.schema()));
    report.line(format!("table fullname: {:?}", table.fullname()));

    report.step("Setting the default schema to 'new_schema'...");
    registry.set_default_schema(Some("new_schema"))?;

    report.step("After setting the default schema:");
    describe_registry(&mut report, &registry);
    let table = registry.get_table(models::TEST_TABLE)?;
    report.line(format!("table schema: {:?}", table.schema()));
    report.line(format!("table fullname: {:?}", table.fullname()));

    report.section("THE PROBLEM");
    report.line("- the default schema is now 'new_schema'");
    report.line("- the registry still lists 'test', not 'new_schema.test'");
    report.line("- the table's own schema is still None");
    report.line("- a migration engine diffing this registry never sees the schema");

    Ok(report)
}
