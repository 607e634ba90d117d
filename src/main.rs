use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use sanctions_etl::writer::{digest_or_warn, sanitize_label};
use sanctions_etl::{
    check_connection, open_connection, pipeline, read_batch, table_count, AppConfig, BatchAudit,
    Loader, SourceKind, SourceStatus, Table,
};

/// Sanctions list ETL: parse authority feeds, stage them, load them into SQLite
#[derive(Parser, Debug)]
#[command(name = "sanctions-etl", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every source in the manifest: parse → stage → load
    Run {
        /// Source manifest (JSON); defaults to ETL_MANIFEST
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Directory for staged CSVs; defaults to ETL_OUTPUT_DIR
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Parse and stage one source without touching the database
    Parse {
        /// Source key: un, uk, ofac, sdn, swiss, aus, eur, can, interpol
        key: SourceKind,
        input: PathBuf,

        /// Label used for the staged file name and the source column
        #[arg(long)]
        label: Option<String>,

        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Load a staged CSV
    Load {
        key: SourceKind,
        staged_csv: PathBuf,

        /// Label recorded in the load event
        #[arg(long)]
        label: Option<String>,
    },

    /// Check that the database can be opened
    CheckDb,

    /// Row counts for every table
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Command::Run { manifest, output_dir } => run(config, manifest, output_dir),
        Command::Parse { key, input, label, output_dir } => {
            let label = label.unwrap_or_else(|| key.key().to_string());
            let output_dir = output_dir.unwrap_or(config.output_dir);
            let label = sanitize_label(&label);

            let batch = pipeline::extract(key, &input, &label)?;
            match pipeline::stage(&batch, &label, &output_dir)? {
                Some(path) => println!("✅ {} records staged to {}", batch.len(), path.display()),
                None => println!("⚠️  No records parsed from {}", input.display()),
            }
            Ok(())
        }
        Command::Load { key, staged_csv, label } => {
            let batch = read_batch(key, &staged_csv)
                .with_context(|| format!("Failed to read {}", staged_csv.display()))?;
            let audit = BatchAudit {
                kind: key,
                label: label.unwrap_or_else(|| key.key().to_string()),
                input_sha256: digest_or_warn(&staged_csv),
            };
            let report = Loader::new(&config.database).load_audited(&batch, &audit)?;
            println!(
                "✅ {} records: {} created, {} reused, {} children added, {} skipped",
                report.records_seen,
                report.entities_created,
                report.entities_reused,
                report.children_added,
                report.records_skipped
            );
            Ok(())
        }
        Command::CheckDb => {
            check_connection(&config.database)?;
            println!("✅ Connection successful for {}", config.database.path().display());
            Ok(())
        }
        Command::Stats => {
            let conn = open_connection(&config.database)?;
            println!("📊 {}", config.database.path().display());
            for table in Table::ALL {
                println!("   {:<22} {}", table.name(), table_count(&conn, table)?);
            }
            Ok(())
        }
    }
}

fn run(config: AppConfig, manifest: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<()> {
    let mut config = config;
    if let Some(manifest) = manifest {
        config = config.with_manifest(manifest);
    }
    if let Some(output_dir) = output_dir {
        config = config.with_output_dir(output_dir);
    }

    info!("🚀 Sanctions ETL v{}", sanctions_etl::VERSION);
    let report = pipeline::Pipeline::new(&config).run_manifest()?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for outcome in &report.outcomes {
        let line = match &outcome.status {
            SourceStatus::Loaded(r) => format!(
                "✅ loaded: {} created, {} reused, {} skipped",
                r.entities_created, r.entities_reused, r.records_skipped
            ),
            SourceStatus::Empty => "➖ no records".to_string(),
            SourceStatus::Skipped(reason) => format!("⚠️  skipped: {}", reason),
            SourceStatus::Failed(reason) => format!("❌ failed: {}", reason),
        };
        println!("{:<10} {:<20} {}", outcome.key, outcome.label, line);
    }

    if report.failed() > 0 {
        anyhow::bail!("{} of {} sources failed", report.failed(), report.outcomes.len());
    }
    Ok(())
}
