//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "placement.debounce_ms")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,

    /// List settable keys
    #[arg(long)]
    pub keys: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.keys {
        for key in Config::available_keys() {
            println!("{}", key);
        }
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            if key.starts_with("map.") {
                config.default_center()?;
            }
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[geocoding]");
    println!("reverse_url = \"{}\"", config.geocoding.reverse_url);
    println!("search_url = \"{}\"", config.geocoding.search_url);
    println!("user_agent = \"{}\"", config.geocoding.user_agent);
    match config.geocoding.zoom {
        Some(zoom) => println!("zoom = {}", zoom),
        None => println!("zoom = \"\" # service default"),
    }
    println!("requests_per_second = {}", config.geocoding.requests_per_second);
    println!("key_precision = {}", config.geocoding.key_precision);
    println!();

    println!("[placement]");
    println!("debounce_ms = {}", config.placement.debounce_ms);
    println!("close_up_zoom = {}", config.placement.close_up_zoom);
    println!("marker_zoom_delay_ms = {}", config.placement.marker_zoom_delay_ms);
    println!("stale_policy = \"{}\"", config.placement.stale_policy);
    println!();

    println!("[map]");
    println!("default_lat = {}", config.map.default_lat);
    println!("default_lng = {}", config.map.default_lng);
    println!("default_zoom = {}", config.map.default_zoom);
    println!();

    println!("[location]");
    println!("use_ip_location = {}", config.location.use_ip_location);
}
