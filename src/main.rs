//! ride-pin CLI entry point
//!
//! Address lookup, place search and a line-driven placement session

use ride_pin::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
