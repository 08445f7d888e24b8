use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use modeldrift_catalog::{CatalogAdapter, MySqlAdapter, PostgresAdapter, DEFAULT_SCHEMA};
use modeldrift_core::{Config, Dialect, ModelRegistry, Report, ValidationMode, ValidationOptions};
use modeldrift_engine::{map_type, SchemaValidator};

const DEFAULT_CONFIG_FILE: &str = "modeldrift.toml";

/// modeldrift - Verify that declared models match the live database schema
#[derive(Parser)]
#[command(name = "modeldrift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: modeldrift.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every table in the database against the models
    Check {
        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,

        /// Collect every discrepancy instead of stopping at the first
        #[arg(long)]
        full_report: bool,

        /// Additional tables to skip (repeatable, `*` allowed)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Show the native type expected for each model attribute
    Types {
        /// Dialect to render for (default: from config)
        #[arg(short, long)]
        dialect: Option<Dialect>,

        /// Only show this table
        table: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env is optional
    let _ = dotenvy::dotenv();
    init_tracing(cli.verbose);

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG_FILE))?
    } else {
        tracing::info!("No config file found, using defaults");
        Config::default()
    };

    tracing::info!(dialect = %config.dialect, models = %config.models_path().display(), "Configuration loaded");

    match cli.command {
        Commands::Check {
            output,
            markdown,
            full_report,
            exclude,
        } => check_command(&config, &output, markdown.as_deref(), full_report, exclude).await,
        Commands::Types { dialect, table } => {
            types_command(&config, dialect.unwrap_or(config.dialect), table.as_deref())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_models(config: &Config) -> Result<ModelRegistry> {
    let path = config.models_path();
    let registry = ModelRegistry::from_file(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load models from {}: {}", path.display(), e))?;
    tracing::info!(models = registry.len(), "Models loaded");
    Ok(registry)
}

/// Build the catalog adapter for the configured dialect
async fn connect(config: &Config, options: &ValidationOptions) -> Result<Box<dyn CatalogAdapter>> {
    let url = std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| config.database.url.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No database connection configured. Set DATABASE_URL or add a [database] section \
                 with url to {}.",
                DEFAULT_CONFIG_FILE
            )
        })?;

    let adapter: Box<dyn CatalogAdapter> = match options.dialect {
        Dialect::Postgres => {
            let schema = config.database.schema.clone().unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
            if config.database.tls {
                Box::new(PostgresAdapter::connect_with_tls(&url, schema).await?)
            } else {
                Box::new(PostgresAdapter::connect(&url, schema).await?)
            }
        }
        Dialect::MySql => Box::new(MySqlAdapter::connect(&url, options.max_concurrency).await?),
    };

    adapter
        .test_connection()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to {}: {}", adapter.name(), e))?;

    Ok(adapter)
}

/// Check command - reconcile the database against the models
async fn check_command(
    config: &Config,
    output: &Path,
    markdown: Option<&Path>,
    full_report: bool,
    exclude: Vec<String>,
) -> Result<()> {
    let mut options = config.validation_options();
    if full_report {
        options = options.with_mode(ValidationMode::FullReport);
    }
    for table in exclude {
        options = options.excluding(table);
    }

    let registry = load_models(config)?;

    eprintln!("{} {}...", "Connecting to".cyan(), options.dialect);
    let adapter = connect(config, &options).await?;

    let dialect = options.dialect;
    let fail_fast = options.mode == ValidationMode::FailFast;

    let mut run = SchemaValidator::new(adapter.as_ref(), &registry, options).collect().await?;
    if fail_fast {
        run.discrepancies.truncate(1);
    }

    let report = run.into_report(dialect);
    report.save_to_file(output)?;
    eprintln!("{} {}", "Report saved to:".green(), output.display());

    if let Some(md_path) = markdown {
        std::fs::write(md_path, generate_markdown_report(&report))?;
        eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
    }

    print_report_summary(&report, fail_fast);

    // Exit with error code if there is drift
    if report.has_discrepancies() {
        std::process::exit(1);
    }

    Ok(())
}

/// Types command - print the type mapper's rendering of every attribute
fn types_command(config: &Config, dialect: Dialect, table: Option<&str>) -> Result<()> {
    let registry = load_models(config)?;

    let models: Vec<_> = match table {
        Some(name) => vec![registry
            .resolve_model(name)
            .ok_or_else(|| anyhow::anyhow!("No model defined for table '{}'", name))?],
        None => registry.models().collect(),
    };

    let mut unmapped = 0;
    for model in models {
        println!("{}", model.table_name.bold());
        for attr in &model.attributes {
            match map_type(attr, dialect) {
                Ok(native) => println!("  {:<24} {}", attr.field(), native.green()),
                Err(e) => {
                    unmapped += 1;
                    println!("  {:<24} {} ({})", attr.field(), "UNMAPPED".yellow().bold(), e.descriptor);
                }
            }
        }
        println!();
    }

    if unmapped > 0 {
        println!(
            "{}",
            format!("{} attribute(s) have no {} type and will always mismatch", unmapped, dialect).yellow()
        );
    }

    Ok(())
}

/// Print report summary to stdout
fn print_report_summary(report: &Report, fail_fast: bool) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Reconciliation Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!("Dialect: {}", report.dialect);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Tables checked:  {}", report.summary.tables_checked);
    println!("  Tables excluded: {}", report.summary.tables_excluded);

    if report.summary.total > 0 {
        println!("  Discrepancies:   {}", report.summary.total.to_string().red().bold());
    } else {
        println!("  Discrepancies:   {}", report.summary.total.to_string().green());
    }

    for (kind, count) in &report.summary.by_kind {
        println!("    {:<28} {}", kind, count);
    }
    println!();

    if report.discrepancies.is_empty() {
        println!("{}", "✓ Models match the database!".green().bold());
    } else {
        println!("{}", "Discrepancies:".bold());
        for d in &report.discrepancies {
            println!("  [{}] {}", d.kind.as_str().red().bold(), d.message);

            if let Some(exp) = &d.expected {
                println!("    Expected: {}", exp);
            }
            if let Some(act) = &d.actual {
                println!("    Actual:   {}", act);
            }
            if let Some(detail) = &d.detail {
                println!("    Detail:   {}", detail);
            }
        }

        if fail_fast {
            println!();
            println!("{}", "Stopped at the first discrepancy. Use --full-report to see all.".yellow());
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

/// Generate markdown report
fn generate_markdown_report(report: &Report) -> String {
    let mut md = String::new();

    md.push_str("# Schema Reconciliation Report\n\n");
    md.push_str(&format!("**Version:** {}\n\n", report.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));
    md.push_str(&format!("**Dialect:** {}\n\n", report.dialect));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Tables checked: {}\n", report.summary.tables_checked));
    md.push_str(&format!("- Tables excluded: {}\n", report.summary.tables_excluded));
    md.push_str(&format!("- Discrepancies: {}\n", report.summary.total));
    for (kind, count) in &report.summary.by_kind {
        md.push_str(&format!("  - `{}`: {}\n", kind, count));
    }
    md.push('\n');

    if report.discrepancies.is_empty() {
        md.push_str("✅ **Models match the database!**\n");
        return md;
    }

    md.push_str("## Discrepancies\n\n");
    for d in &report.discrepancies {
        md.push_str(&format!("### ❌ {} - {}\n\n", d.kind, d.table));
        md.push_str(&format!("{}\n\n", d.message));

        if !d.fields.is_empty() {
            md.push_str(&format!("**Fields:** {}\n\n", d.fields.join(", ")));
        }
        if let Some(exp) = &d.expected {
            md.push_str(&format!("**Expected:** `{}`\n\n", exp));
        }
        if let Some(act) = &d.actual {
            md.push_str(&format!("**Actual:** `{}`\n\n", act));
        }
        if let Some(detail) = &d.detail {
            md.push_str(&format!("**Detail:** {}\n\n", detail));
        }
    }

    md
}
