//! Command-line entry point for the example-content pipeline.
//!
//! # Responsibility
//! - Resolve pipeline configuration from file, environment and flags.
//! - Wire the SQLite document table and filesystem buckets into
//!   `ExampleService` and print a short report per command.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use dashboard_core::{
    default_log_level, init_logging, open_db, ContentRepository, ExampleService, FsObjectStore,
    PipelineConfig, SqliteImportLedger, SqliteItemRepository,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dashboard-examples")]
#[command(version, about = "Seed, import and export example dashboards", long_about = None)]
struct Cli {
    /// TOML file with pipeline settings
    #[arg(short, long, env = "DASHBOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding one subdirectory per bucket
    #[arg(long, env = "DASHBOARD_STORAGE_ROOT", global = true)]
    storage_root: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = "DASHBOARD_DATABASE", global = true)]
    database: Option<PathBuf>,

    #[arg(long, env = "DASHBOARD_EXAMPLES_BUCKET", global = true)]
    examples_bucket: Option<String>,

    #[arg(long, env = "DASHBOARD_DATASETS_BUCKET", global = true)]
    datasets_bucket: Option<String>,

    /// Example language directory (e.g. english)
    #[arg(short, long, env = "DASHBOARD_LANGUAGE", global = true)]
    language: Option<String>,

    /// Recorded as the creator of imported records
    #[arg(long, env = "DASHBOARD_ACTOR", global = true)]
    actor: Option<String>,

    #[arg(long, env = "DASHBOARD_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (default: stderr)
    #[arg(long, env = "DASHBOARD_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List example dashboards found in the examples bucket
    List,
    /// Import every example of the language
    Seed {
        /// Import again even if an earlier import still exists
        #[arg(long)]
        force: bool,
    },
    /// Import one example directory
    Import {
        /// Dashboard directory under the language prefix
        dashboard_dir: String,
    },
    /// Export a stored dashboard into the examples bucket
    Export {
        dashboard_id: String,
    },
    /// List dashboards stored in the database
    Dashboards,
}

fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = &cli.storage_root {
        config.storage_root = root.clone();
    }
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }
    if let Some(bucket) = &cli.examples_bucket {
        config.examples_bucket = bucket.clone();
    }
    if let Some(bucket) = &cli.datasets_bucket {
        config.datasets_bucket = bucket.clone();
    }
    if let Some(language) = &cli.language {
        config.language = language.clone();
    }
    if let Some(actor) = &cli.actor {
        config.actor = actor.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, cli.log_dir.as_deref()).map_err(|err| anyhow!(err))?;

    let config = resolve_config(&cli)?;
    info!(
        "event=cli_start module=cli status=ok storage_root={} database={}",
        config.storage_root.display(),
        config.database_path.display()
    );

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
    }
    let conn = open_db(&config.database_path)
        .with_context(|| format!("cannot open {}", config.database_path.display()))?;
    let repo = ContentRepository::new(SqliteItemRepository::try_new(&conn)?);
    let store = FsObjectStore::new(config.storage_root.clone());
    let ledger = SqliteImportLedger::new(&conn);
    let language = config.language.clone();
    let service = ExampleService::new(repo, store, ledger, config);

    match cli.command {
        Commands::List => {
            let catalog = service.list_examples(&language)?;
            for layout in &catalog.layouts {
                let status = if layout.is_complete() {
                    "ok"
                } else {
                    "incomplete"
                };
                println!(
                    "{}\twidgets={}\tdatasets={}\tdata={}\t{}",
                    layout.prefix(),
                    layout.widget_keys.len(),
                    layout.dataset_keys.len(),
                    layout.data_keys.len(),
                    status
                );
            }
            for key in &catalog.ignored_keys {
                println!("ignored\t{key}");
            }
        }
        Commands::Seed { force } => {
            let report = service.seed_examples(&language, force)?;
            for import in &report.imported {
                println!(
                    "imported\t{}\t{}\t{}",
                    import.source_prefix, import.dashboard_id, import.dashboard_name
                );
            }
            for prefix in &report.skipped {
                println!("skipped\t{prefix}");
            }
        }
        Commands::Import { dashboard_dir } => {
            let report = service.import_by_dir(&language, &dashboard_dir)?;
            println!(
                "imported\t{}\t{}\twidgets={}\tdatasets={}",
                report.source_prefix, report.dashboard_id, report.widget_count, report.dataset_count
            );
        }
        Commands::Export { dashboard_id } => {
            let report = service.export_dashboard(&dashboard_id, &language)?;
            println!("exported\t{}\tkeys={}", report.prefix, report.written_keys.len());
        }
        Commands::Dashboards => {
            for dashboard in service.repository().list_dashboards()? {
                println!(
                    "{}\t{}\t{}\t{}",
                    dashboard.id,
                    dashboard.state.as_str(),
                    dashboard.topic_area_name,
                    dashboard.name
                );
            }
        }
    }

    Ok(())
}
