//! imulog CLI
//!
//! Offline administration of a history store:
//! - Show stats
//! - Export readings as CSV
//! - Clear the history
//! - Generate a config file
//!
//! Opens the store directly, so run it while the server is stopped when
//! using the CSV backend.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use imulog::config::{generate_default_config, Config, LoggingConfig};
use imulog::query::QueryExecutor;
use imulog::storage::{Backend, StorageEngine};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "imulog-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Administer an imulog history store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the backend (csv, sqlite)
    #[arg(long, global = true)]
    pub backend: Option<Backend>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show record count and first/last timestamps
    Stats,

    /// Export readings as CSV (whole history unless a range is given)
    Export {
        /// Range start, e.g. 2024-05-01T10:00
        #[arg(short, long)]
        start: Option<String>,
        /// Range end (inclusive)
        #[arg(short, long)]
        end: Option<String>,
        /// Output file or directory (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete every stored reading
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_config(output.as_ref());
    }

    // stdout may carry CSV; keep logs quiet and on stderr
    let mut config = imulog::logging::with_bootstrap("warn", || Config::resolve(cli.config.as_deref()))?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }

    let logging = LoggingConfig {
        level: "warn".to_string(),
        ..config.logging.clone()
    };
    imulog::logging::init(&logging, std::io::stderr).context("failed to initialize logging")?;

    let storage_config = config.storage.to_storage_config();
    let location = storage_config.history_path();
    let storage = Arc::new(
        StorageEngine::new(storage_config)
            .await
            .with_context(|| format!("cannot open history at {:?}", location))?,
    );

    match cli.command {
        Commands::Stats => {
            let stats = storage.stats().await?;
            let show = |ts: Option<chrono::NaiveDateTime>| {
                ts.map(|t| imulog::storage::format_timestamp(&t))
                    .unwrap_or_else(|| "-".to_string())
            };

            println!("imulog v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Backend:       {}", storage.backend());
            println!("Location:      {}", location.display());
            println!("Total records: {}", stats.total_records);
            println!("First record:  {}", show(stats.first_record));
            println!("Last record:   {}", show(stats.last_record));
        }

        Commands::Export { start, end, output } => {
            let executor = QueryExecutor::new(Arc::clone(&storage));
            let file = if start.is_none() && end.is_none() {
                executor.export_all().await?
            } else {
                executor.export_range(start.as_deref(), end.as_deref()).await?
            };

            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(&file.filename)
                    } else {
                        path
                    };
                    std::fs::write(&path, &file.bytes)
                        .with_context(|| format!("cannot write {:?}", path))?;
                    eprintln!("Exported {} readings to {}", file.rows, path.display());
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&file.bytes)?;
                }
            }
        }

        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to clear {} without --yes", location.display());
            }
            let before = storage.count().await?;
            storage.clear().await?;
            println!("Cleared {} readings from {}", before, location.display());
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

fn write_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }

    Ok(())
}
