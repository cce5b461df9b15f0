use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use schemabind::demo::{self, Solution};
use schemabind::{MigrationConfig, MigrationEnvironment, models};
use tracing::info;

#[derive(Parser)]
#[command(name = "schemabind")]
#[command(about = "Bind shared table registries to a target schema")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show that changing the default schema leaves existing keys stale
    Problem,
    /// Walk through the fixes (all of them when no number is given)
    Solution {
        #[arg(value_name = "N", value_parser = clap::value_parser!(u8).range(1..=4))]
        numbers: Vec<u8>,
        /// List the available solutions and exit
        #[arg(long, short)]
        list: bool,
    },
    /// Bind the shared models to the target schema and print the result
    Plan {
        /// Target schema (defaults to $TARGET_SCHEMA, then tenant_a)
        #[arg(long)]
        schema: Option<String>,
        /// clone or rebind (defaults to $SCHEMA_BIND_STRATEGY, then clone)
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Sql)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Sql,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Problem => {
            print!("{}", demo::problem::run()?);
            Ok(())
        }
        Command::Solution { numbers, list } => {
            if list {
                list_solutions();
                return Ok(());
            }
            run_solutions(&numbers)
        }
        Command::Plan {
            schema,
            strategy,
            format,
        } => plan(schema, strategy, format),
    }
}

fn list_solutions() {
    println!("\nAvailable solutions:");
    println!("{}", "-".repeat(50));
    for solution in Solution::ALL {
        println!("  {}. {}", solution.number(), solution.description());
    }
}

fn run_solutions(numbers: &[u8]) -> Result<()> {
    let selected = if numbers.is_empty() {
        Solution::ALL.to_vec()
    } else {
        numbers
            .iter()
            .map(|n| Solution::from_number(*n))
            .collect::<schemabind::Result<Vec<_>>>()?
    };

    for solution in selected {
        let report = solution
            .run()
            .with_context(|| format!("solution {} failed", solution.number()))?;
        print!("{}", report);
    }
    Ok(())
}

fn plan(schema: Option<String>, strategy: Option<String>, format: Format) -> Result<()> {
    let config = MigrationConfig::from_lookup_with_overrides(
        |name| std::env::var(name).ok(),
        schema.as_deref(),
        strategy.as_deref(),
    )
    .context("invalid migration configuration")?;
    info!(schema = %config.target_schema, strategy = %config.strategy, "planning");

    let mut source = models::metadata()?;
    let context = MigrationEnvironment::new(config).configure(&mut source)?;

    match format {
        Format::Sql => print!("{}", context.render_offline_script()),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(context.target_metadata())?
        ),
    }
    Ok(())
}
