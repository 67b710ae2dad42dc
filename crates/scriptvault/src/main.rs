//! scriptvault - timestamped snapshot history for Apps Script projects.
//!
//! This is the main entry point for the scriptvault CLI.

mod commands;

use clap::{Args, Parser, Subcommand};
use commands::history::{run_request, HistoryTarget};
use commands::logging::init_logging;
use commands::serve::run_server;
use scriptvault_core::{Config, RequestParams};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(name = "scriptvault")]
#[command(author, version, about = "Snapshot history for Apps Script projects", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to (defaults to server.address from the config)
        #[arg(short, long)]
        address: Option<SocketAddr>,
    },
    /// Capture the project's current content
    Store {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List stored snapshots
    List {
        #[command(flatten)]
        target: TargetArgs,
        /// Only snapshots where some file matches this pattern (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,
        /// Print the snapshots as JSON
        #[arg(long, conflicts_with = "markup")]
        json: bool,
        /// Print the snapshots as an HTML page
        #[arg(long)]
        markup: bool,
    },
    /// Push a stored snapshot back to the project
    Revert {
        #[command(flatten)]
        target: TargetArgs,
        /// Timestamp of the snapshot to restore
        #[arg(short, long)]
        timestamp: String,
    },
    /// Delete stored snapshots with the given timestamp
    Delete {
        #[command(flatten)]
        target: TargetArgs,
        /// Timestamp of the snapshot to delete
        #[arg(short, long)]
        timestamp: String,
    },
    /// Show configuration
    Config,
    /// Print version information
    Version,
}

#[derive(Args)]
struct TargetArgs {
    /// Project (script) ID
    #[arg(short, long)]
    project: Option<String>,
    /// Container (folder) ID
    #[arg(short, long)]
    container: Option<String>,
}

impl From<TargetArgs> for HistoryTarget {
    fn from(args: TargetArgs) -> Self {
        HistoryTarget {
            project_id: args.project,
            container_id: args.container,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let (config, sources) = Config::load(Some(&cwd)).await?;

    init_logging(cli.verbose, config.log_level());
    tracing::debug!(sources = ?sources, "Configuration loaded");

    match cli.command {
        Commands::Serve { address } => run_server(&config, address).await,
        Commands::Store { target } => {
            run_request(&config, target.into(), op("store")).await
        }
        Commands::List {
            target,
            search,
            json,
            markup,
        } => {
            let params = RequestParams {
                search_pattern: search,
                as_json: json.then(|| "true".to_string()),
                as_markup: markup.then(|| "true".to_string()),
                ..op("list")
            };
            run_request(&config, target.into(), params).await
        }
        Commands::Revert { target, timestamp } => {
            let params = RequestParams {
                target_timestamp: Some(timestamp),
                ..op("revert")
            };
            run_request(&config, target.into(), params).await
        }
        Commands::Delete { target, timestamp } => {
            let params = RequestParams {
                delete_timestamp: Some(timestamp),
                ..op("delete")
            };
            run_request(&config, target.into(), params).await
        }
        Commands::Config => show_config(&config, &sources),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn op(name: &str) -> RequestParams {
    RequestParams {
        operation: Some(name.to_string()),
        ..Default::default()
    }
}

/// Print the effective configuration with secrets masked.
fn show_config(config: &Config, sources: &[std::path::PathBuf]) -> anyhow::Result<()> {
    println!("Configuration sources:");
    if sources.is_empty() {
        println!("  (none)");
    } else {
        for source in sources {
            println!("  {}", source.display());
        }
    }
    println!();

    println!("Current configuration:");
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    Ok(())
}

/// Print version information.
fn print_version() {
    println!("scriptvault {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Timestamped snapshot history for Apps Script projects.");
}
