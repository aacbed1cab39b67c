//! Place command handler
//!
//! A line-driven placement session. Each stdin line is one command; map
//! movement is simulated with `move`, and every request the coordinator
//! makes of the map is echoed to stdout.

use crate::config::defaults::DEFAULT_SUGGESTION_LIMIT;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::ip_location::IpLocator;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{ForwardGeocoder, Suggestion};
use crate::map::{MapView, MapViewState};
use crate::notify::{Notification, NotificationSink, NotificationStyle};
use crate::pin::PinTarget;
use crate::placement::PlacementCoordinator;
use crate::trip::RideRequest;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Place command arguments
#[derive(Args)]
pub struct PlaceArgs {
    /// Initial map latitude
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Initial map longitude
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Skip IP location when starting
    #[arg(long)]
    pub no_locate: bool,
}

/// One session command
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Activate(PinTarget),
    Move(Coordinates),
    Confirm,
    Cancel,
    Search(String),
    Pick(usize, PinTarget),
    Locate,
    Status,
    Trip,
    Request,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; blank lines and `#` comments yield `None`
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (word.to_lowercase().as_str(), args.as_slice()) {
            ("from" | "to", []) => Self::Activate(parse_target(word)?),
            ("move", [lat, lng]) => {
                Self::Move(Coordinates::new(parse_number(lat)?, parse_number(lng)?))
            }
            ("confirm", []) => Self::Confirm,
            ("cancel", []) => Self::Cancel,
            ("search", _) if !rest.is_empty() => Self::Search(rest.to_string()),
            ("pick", [index, target]) => {
                let index = index
                    .parse::<usize>()
                    .ok()
                    .filter(|i| *i > 0)
                    .ok_or_else(|| Error::Command(format!("Invalid suggestion number: {}", index)))?;
                Self::Pick(index, parse_target(target)?)
            }
            ("locate", []) => Self::Locate,
            ("status", []) => Self::Status,
            ("trip", []) => Self::Trip,
            ("request", []) => Self::Request,
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => return Err(Error::Command(format!("Unrecognized command: {}", line))),
        };

        Ok(Some(command))
    }
}

fn parse_target(s: &str) -> Result<PinTarget> {
    s.parse().map_err(Error::Command)
}

fn parse_number(s: &str) -> Result<f64> {
    s.trim_end_matches(',')
        .parse()
        .map_err(|_| Error::Command(format!("Invalid number: {}", s)))
}

/// Map stand-in that prints what the coordinator asks of it
#[derive(Debug, Clone, Copy, Default)]
struct TerminalMap;

impl MapView for TerminalMap {
    fn set_center(&self, center: Coordinates) {
        println!("map: center {:.6}, {:.6}", center.lat, center.lng);
    }

    fn set_zoom(&self, zoom: u8) {
        println!("map: zoom {}", zoom);
    }

    fn zoom_to_marker(&self, target: PinTarget) {
        println!("map: zoom to {} marker", target.label());
    }
}

/// Prints notifications as they arrive
#[derive(Debug, Clone, Copy, Default)]
struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn notify(&self, notification: Notification) {
        let tag = match notification.style {
            NotificationStyle::Info => "info",
            NotificationStyle::Success => "done",
            NotificationStyle::Warning => "warn",
        };
        println!("[{}] {}: {}", tag, notification.title, notification.description);
    }
}

type Session = PlacementCoordinator<NominatimBackend, TerminalMap, TerminalSink>;

/// Run the place command
pub async fn run(args: PlaceArgs) -> Result<()> {
    let config = Config::load()?;

    let center = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Coordinates::try_new(lat, lng)?,
        _ => config.default_center()?,
    };

    let backend = NominatimBackend::new(&config.geocoding)?;
    let coordinator = PlacementCoordinator::new(
        backend,
        TerminalMap,
        TerminalSink,
        MapViewState::new(center, config.map.default_zoom),
        config.placement_settings()?,
    );

    if config.location.use_ip_location && !args.no_locate && args.lat.is_none() {
        coordinator.center_on_device(&IpLocator::new()).await;
    }

    println!("Type 'help' for commands.");

    let mut suggestions: Vec<Suggestion> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        debug!("Session command: {:?}", command);
        if command == Command::Quit {
            break;
        }

        if let Err(e) = execute(&coordinator, command, &mut suggestions).await {
            eprintln!("{}", e);
        }
    }

    coordinator.shutdown();
    Ok(())
}

async fn execute(
    coordinator: &Session,
    command: Command,
    suggestions: &mut Vec<Suggestion>,
) -> Result<()> {
    match command {
        Command::Activate(target) => coordinator.activate(target),

        Command::Move(center) => {
            center.validate()?;
            coordinator.on_map_center_changed(center);
        }

        Command::Confirm => match coordinator.confirm().await {
            Some(point) => println!(
                "confirmed: {} ({:.6}, {:.6})",
                point.address, point.coordinate.lat, point.coordinate.lng
            ),
            None => println!("nothing to confirm"),
        },

        Command::Cancel => match coordinator.cancel() {
            Some(target) => println!("cancelled {} placement", target.label()),
            None => println!("not placing"),
        },

        Command::Search(query) => {
            *suggestions = coordinator
                .geocoder()
                .search(&query, DEFAULT_SUGGESTION_LIMIT)
                .await?;
            if suggestions.is_empty() {
                println!("no places found");
            }
            for (i, suggestion) in suggestions.iter().enumerate() {
                println!("{:>2}. {}", i + 1, suggestion.name);
            }
        }

        Command::Pick(index, target) => {
            let suggestion = suggestions.get(index - 1).ok_or_else(|| {
                Error::Command(format!("No suggestion {}; run 'search' first", index))
            })?;
            let point = coordinator.select_suggestion(suggestion, target)?;
            println!("{}: {}", target.label(), point.address);
        }

        Command::Locate => {
            coordinator.center_on_device(&IpLocator::new()).await;
        }

        Command::Status => {
            println!("mode: {:?}", coordinator.mode());
            for target in [PinTarget::From, PinTarget::To] {
                let slot = coordinator.slot(target);
                match slot.coordinate {
                    Some(c) => println!(
                        "{}: ({:.6}, {:.6}) {}",
                        target.label(),
                        c.lat,
                        c.lng,
                        slot.display_address()
                    ),
                    None => println!("{}: not set", target.label()),
                }
            }
        }

        Command::Trip => {
            println!("{}", serde_json::to_string_pretty(&coordinator.trip())?);
        }

        Command::Request => {
            let request = RideRequest::from_trip(&coordinator.trip())?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }

        Command::Help => print_help(),

        Command::Quit => {}
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  from | to            start placing the pickup or drop-off pin");
    println!("  move <lat> <lng>     move the map center");
    println!("  confirm              commit the pin being placed");
    println!("  cancel               stop placing without committing");
    println!("  search <query>       look up places by name");
    println!("  pick <n> <from|to>   use suggestion n for a trip point");
    println!("  locate               center on the IP location");
    println!("  status               show mode and provisional pins");
    println!("  trip                 show committed trip points");
    println!("  request              build a ride request from the trip");
    println!("  quit");
}
