use std::process;

use clap::Parser;
use commands::Commands;
use error::CliError;
use tracing::{Level, info};

mod commands;
mod config;
mod error;

#[derive(Parser)]
#[command(name = "conduit", version = "0.1.0", about = "Bulk table copy pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let exit_code = match run_cli().await {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("{err}");
            1
        }
    };

    process::exit(exit_code);
}

async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            consumers,
            chunk_size,
        } => {
            let stage_config = config::load_stage_config(&config, consumers, chunk_size)?;
            let summary = conduit_engine::run_stage(stage_config).await?;
            info!(
                rows_extracted = summary.rows_extracted,
                rows_loaded = summary.rows_loaded,
                elapsed = ?summary.elapsed,
                "run complete"
            );
            Ok(())
        }
    }
}
