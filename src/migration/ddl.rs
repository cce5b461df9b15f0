//! SQL rendering for offline migration scripts.

use crate::core::{Constraint, SchemaName};
use crate::storage::{Registry, TableDefinition};

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."name"`, or `"name"` for an unqualified table.
pub fn qualified_name(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(name)),
        None => quote_ident(name),
    }
}

fn quote_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn create_schema_sql(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {};", quote_ident(schema))
}

/// CREATE TABLE for one definition, constraints inline.
pub fn create_table_sql(table: &TableDefinition) -> String {
    let structure = table.structure();
    let pk_columns = structure.primary_key_columns();
    let use_table_pk_constraint = pk_columns.len() > 1
        || structure
            .constraints
            .iter()
            .any(|c| matches!(c, Constraint::PrimaryKey { .. }));

    let mut parts: Vec<String> = structure
        .columns
        .iter()
        .map(|col| {
            let mut def = format!("    {} {}", quote_ident(&col.name), col.data_type);

            if col.primary_key && !use_table_pk_constraint {
                def.push_str(" PRIMARY KEY");
            } else if !col.nullable {
                def.push_str(" NOT NULL");
            }

            if col.unique && !col.primary_key {
                def.push_str(" UNIQUE");
            }

            if let Some(default) = &col.default {
                def.push_str(&format!(" DEFAULT {}", default.to_sql()));
            }

            def
        })
        .collect();

    if use_table_pk_constraint {
        let columns: Vec<String> = pk_columns.iter().map(|c| c.to_string()).collect();
        parts.push(format!("    PRIMARY KEY ({})", quote_list(&columns)));
    }

    for constraint in &structure.constraints {
        match constraint {
            Constraint::PrimaryKey { .. } => {}
            Constraint::Unique { name, columns } => {
                let prefix = name
                    .as_ref()
                    .map(|n| format!("CONSTRAINT {} ", quote_ident(n)))
                    .unwrap_or_default();
                parts.push(format!("    {}UNIQUE ({})", prefix, quote_list(columns)));
            }
            Constraint::ForeignKey {
                columns,
                references,
            } => {
                parts.push(format!(
                    "    FOREIGN KEY ({}) REFERENCES {}",
                    quote_list(columns),
                    reference_sql(references)
                ));
            }
            Constraint::Check { name, expr } => {
                let prefix = name
                    .as_ref()
                    .map(|n| format!("CONSTRAINT {} ", quote_ident(n)))
                    .unwrap_or_default();
                parts.push(format!("    {}CHECK ({})", prefix, expr));
            }
        }
    }

    format!(
        "CREATE TABLE {} (\n{}\n);",
        qualified_name(table.schema(), table.name()),
        parts.join(",\n")
    )
}

/// `[schema.]table.column` to `"schema"."table" ("column")`.
fn reference_sql(reference: &str) -> String {
    let mut parts: Vec<&str> = reference.split('.').collect();
    let Some(column) = parts.pop() else {
        return quote_ident(reference);
    };
    match parts.as_slice() {
        [table] => format!("{} ({})", quote_ident(table), quote_ident(column)),
        [schema, table] => format!(
            "{} ({})",
            qualified_name(Some(*schema), table),
            quote_ident(column)
        ),
        _ => quote_ident(reference),
    }
}

pub fn create_index_sql(table: &TableDefinition) -> Vec<String> {
    table
        .structure()
        .indexes
        .iter()
        .map(|idx| {
            let unique = if idx.unique { "UNIQUE " } else { "" };
            format!(
                "CREATE {}INDEX {} ON {} ({});",
                unique,
                quote_ident(&idx.resolved_name(table.name())),
                qualified_name(table.schema(), table.name()),
                quote_list(&idx.columns)
            )
        })
        .collect()
}

/// Version bookkeeping table, as created by the migration tool.
pub fn create_version_table_sql(schema: &SchemaName, name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {} VARCHAR(32) NOT NULL,\n    CONSTRAINT {} PRIMARY KEY ({})\n);",
        qualified_name(Some(schema.as_str()), name),
        quote_ident("version_num"),
        quote_ident(&format!("{}_pkc", name)),
        quote_ident("version_num")
    )
}

/// Full script: schemas first, then the version table, then every table
/// and its indexes in key order.
pub fn render_script(registry: &Registry, version_schema: &SchemaName, version_table: &str) -> String {
    let mut schemas: Vec<&str> = registry.tables().filter_map(|t| t.schema()).collect();
    schemas.push(version_schema.as_str());
    schemas.sort_unstable();
    schemas.dedup();

    let mut statements: Vec<String> = schemas.into_iter().map(create_schema_sql).collect();
    statements.push(create_version_table_sql(version_schema, version_table));
    for table in registry.tables() {
        statements.push(create_table_sql(table));
        statements.extend(create_index_sql(table));
    }

    let mut script = statements.join("\n\n");
    script.push('\n');
    script
}
