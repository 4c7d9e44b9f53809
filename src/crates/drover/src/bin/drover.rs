//! drover CLI - resumable bulk export runner
//!
//! Main entry point for the drover command-line tool.

use clap::{Parser, Subcommand};
use drover::version_banner;
use drover::{
    CheckpointStore, DroverConfig, Exporter, FileStreamTransport, JsonFileCheckpointStore,
    RetryPolicy, ShutdownCoordinator, SinkWriter, SqliteSource,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "drover")]
#[command(about = "Resumable bulk export from paginated sources to partitioned streams", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the export job, resuming from the checkpoint when one exists
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "drover.toml")]
        config: PathBuf,
    },

    /// Print the persisted checkpoint
    Status {
        /// Configuration file path
        #[arg(short, long, default_value = "drover.toml")]
        config: PathBuf,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { config }) => run_export(&config).await,
        Some(Commands::Status { config }) => show_status(&config).await,
        Some(Commands::Version) => {
            println!("{}", version_banner());
            Ok(())
        }
        None => {
            println!("{}", version_banner());
            println!("\nUse --help to see available commands");
            Ok(())
        }
    }
}

async fn run_export(config_path: &Path) -> anyhow::Result<()> {
    let config = DroverConfig::load(config_path)?;
    drover::logging::init(&config.logging);

    // Create shutdown coordinator and install signal handlers
    let shutdown = ShutdownCoordinator::new();
    let _signal_handler = shutdown.install_signal_handlers();

    let source = SqliteSource::connect(&config.source).await?;
    let transport = FileStreamTransport::new(
        Path::new(&config.sink.directory),
        &config.sink.topic,
        &config.sink.client_id,
        config.sink.partitions,
    )
    .await?;
    let store = JsonFileCheckpointStore::new(&config.export.checkpoint_file);
    let writer = SinkWriter::new(transport, RetryPolicy::from(&config.retry), shutdown.clone());

    let mut exporter = Exporter::new(source, writer, store, config.export, shutdown);

    match exporter.run().await {
        Ok(outcome) => {
            info!(outcome = %outcome, "Export run finished");
            Ok(())
        }
        Err(e) => {
            // The checkpoint already records this failure; exit cleanly so
            // a supervisor restart resumes instead of treating it as a crash.
            error!(error = %e, "Export run failed");
            Ok(())
        }
    }
}

async fn show_status(config_path: &Path) -> anyhow::Result<()> {
    let config = DroverConfig::load(config_path)?;
    let store = JsonFileCheckpointStore::new(&config.export.checkpoint_file);

    match store.try_load().await? {
        Some(state) => {
            println!("Checkpoint: {}", config.export.checkpoint_file);
            println!();
            println!("{:<18} {}", "Offset:", state.last_processed_offset);
            println!("{:<18} {}", "Batches:", state.batches_processed);
            println!(
                "{:<18} {} / {}",
                "Records:", state.records_processed, config.export.total_records
            );
            if config.export.total_records > 0 {
                println!(
                    "{:<18} {}%",
                    "Progress:",
                    state.records_processed * 100 / config.export.total_records
                );
            }
            println!("{:<18} {}", "Last activity:", state.last_processed_timestamp);
            println!(
                "{:<18} {}",
                "Completed:",
                if state.completed { "yes" } else { "no" }
            );
            if let Some(ref message) = state.error_message {
                println!("{:<18} {}", "Last error:", message);
            }
        }
        None => {
            println!("No checkpoint found at {}", config.export.checkpoint_file);
        }
    }

    Ok(())
}
