//! charla entry point.
//!
//! Binary name: `charla`
//!
//! Parses CLI arguments, initializes tracing and application state, then
//! runs the bot loop.

mod poll;
mod scheduler;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use state::AppState;

#[derive(Parser)]
#[command(name = "charla", version, about = "Resúmenes con IA para grupos de chat")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record group messages and publish periodic digests
    Run {
        /// Data directory (default: $CHARLA_DATA_DIR or ~/.charla)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,charla=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { data_dir } => {
            let state = AppState::init(data_dir).await?;
            poll::run(state).await?;
        }
    }

    Ok(())
}
