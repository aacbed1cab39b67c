//! Resolve command handler
//!
//! One-off reverse geocoding of a coordinate.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::GeocodingClient;
use clap::Args;

/// Resolve command arguments
#[derive(Args)]
pub struct ResolveArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Override the configured Nominatim zoom level
    #[arg(long, short = 'z')]
    pub zoom: Option<u8>,
}

/// Run the resolve command
///
/// Always prints an address; when the service has no name for the point
/// the coordinate itself is printed.
pub async fn run(args: ResolveArgs) -> Result<()> {
    let mut config = Config::load()?;
    if args.zoom.is_some() {
        config.geocoding.zoom = args.zoom;
    }

    let coords = Coordinates::try_new(args.lat, args.lng)?;
    let client = GeocodingClient::new(NominatimBackend::new(&config.geocoding)?);

    println!("{}", client.resolve(coords).await);
    Ok(())
}
