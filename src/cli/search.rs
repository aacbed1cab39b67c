//! Search command handler
//!
//! Forward geocoding of a free-text query into pickable suggestions.

use crate::config::defaults::DEFAULT_SUGGESTION_LIMIT;
use crate::config::Config;
use crate::error::Result;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::ForwardGeocoder;
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Place name or address
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of suggestions
    #[arg(long, short = 'n', default_value_t = DEFAULT_SUGGESTION_LIMIT)]
    pub limit: usize,

    /// Print suggestions as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let backend = NominatimBackend::new(&config.geocoding)?;
    let query = args.query.join(" ");

    let suggestions = backend.search(&query, args.limit).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        eprintln!("No places found for '{}'", query);
        return Ok(());
    }

    for (i, suggestion) in suggestions.iter().enumerate() {
        println!(
            "{:>2}. {} ({:.6}, {:.6})",
            i + 1,
            suggestion.name,
            suggestion.lat,
            suggestion.lon
        );
    }

    Ok(())
}
