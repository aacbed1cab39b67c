//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod place;
pub mod resolve;
pub mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Manual pickup and drop-off placement with reverse geocoding
#[derive(Parser)]
#[command(name = "ride-pin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve coordinates to an address
    Resolve(resolve::ResolveArgs),

    /// Search places by name
    Search(search::SearchArgs),

    /// Interactive placement session driven from stdin
    Place(place::PlaceArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Resolve(args) => resolve::run(args).await,
        Commands::Search(args) => search::run(args).await,
        Commands::Place(args) => place::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Log to stderr so stdout stays clean for command output
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
