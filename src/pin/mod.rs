//! Pin mode state
//!
//! Tracks which point (if any) the user is positioning and the provisional
//! state of both placeable slots. Exactly one mode is active at a time;
//! activating a target implicitly deactivates the other.

use crate::coord::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address shown for a slot whose lookup has not completed
pub const PLACEHOLDER_ADDRESS: &str = "Resolving address…";

/// A placeable point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinTarget {
    /// Pickup (origin)
    From,
    /// Drop-off (destination)
    To,
}

impl PinTarget {
    /// Rider-facing name of the point
    pub fn label(self) -> &'static str {
        match self {
            Self::From => "pickup",
            Self::To => "drop-off",
        }
    }
}

impl fmt::Display for PinTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From => write!(f, "from"),
            Self::To => write!(f, "to"),
        }
    }
}

impl std::str::FromStr for PinTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "from" | "origin" | "pickup" => Ok(Self::From),
            "to" | "destination" | "dropoff" | "drop-off" => Ok(Self::To),
            _ => Err(format!("Unknown pin target: {}", s)),
        }
    }
}

/// Which target is being positioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinMode {
    #[default]
    None,
    From,
    To,
}

impl PinMode {
    /// Target being positioned, if any
    pub fn target(self) -> Option<PinTarget> {
        match self {
            Self::None => None,
            Self::From => Some(PinTarget::From),
            Self::To => Some(PinTarget::To),
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::None
    }
}

impl From<PinTarget> for PinMode {
    fn from(target: PinTarget) -> Self {
        match target {
            PinTarget::From => Self::From,
            PinTarget::To => Self::To,
        }
    }
}

/// Live placement state of one slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementTarget {
    /// Provisional position; `None` until the slot is first activated
    pub coordinate: Option<Coordinates>,

    /// Resolved address, `None` while a lookup is outstanding
    pub address: Option<String>,

    /// Cache key of the position `address` was resolved for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_key: Option<String>,

    /// Cache key of the most recently requested lookup, set at dispatch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_resolved_key: Option<String>,
}

impl PlacementTarget {
    /// Address to display: the resolved one or a placeholder
    pub fn display_address(&self) -> &str {
        self.address.as_deref().unwrap_or(PLACEHOLDER_ADDRESS)
    }

    /// Address resolved for exactly the position identified by `key`
    pub fn address_for(&self, key: &str) -> Option<&str> {
        match (&self.address, &self.address_key) {
            (Some(address), Some(address_key)) if address_key == key => Some(address),
            _ => None,
        }
    }

    /// Move the slot; any address for the old position is kept until replaced
    pub fn move_to(&mut self, coordinate: Coordinates) {
        self.coordinate = Some(coordinate);
    }

    /// Store a resolved address for the position identified by `key`
    pub fn resolve(&mut self, key: impl Into<String>, address: impl Into<String>) {
        self.address_key = Some(key.into());
        self.address = Some(address.into());
    }
}

/// How an activation seeded its slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seed {
    /// The slot already had a point; the map should focus it
    Existing(Coordinates),
    /// The slot was empty and adopted the map center
    MapCenter(Coordinates),
}

impl Seed {
    pub fn coordinate(self) -> Coordinates {
        match self {
            Self::Existing(c) | Self::MapCenter(c) => c,
        }
    }
}

/// Result of `PinState::activate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activation {
    pub target: PinTarget,
    pub seed: Seed,
    /// Mode that was active before, if different
    pub replaced: Option<PinTarget>,
    /// The target was already active (re-centering only)
    pub already_active: bool,
}

/// Active mode plus both slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinState {
    mode: PinMode,
    origin: PlacementTarget,
    destination: PlacementTarget,
}

impl PinState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PinMode {
        self.mode
    }

    pub fn slot(&self, target: PinTarget) -> &PlacementTarget {
        match target {
            PinTarget::From => &self.origin,
            PinTarget::To => &self.destination,
        }
    }

    pub fn slot_mut(&mut self, target: PinTarget) -> &mut PlacementTarget {
        match target {
            PinTarget::From => &mut self.origin,
            PinTarget::To => &mut self.destination,
        }
    }

    /// Slot being positioned, if any
    pub fn active_slot_mut(&mut self) -> Option<(PinTarget, &mut PlacementTarget)> {
        let target = self.mode.target()?;
        Some((target, self.slot_mut(target)))
    }

    /// Switch to `target`
    ///
    /// An empty slot adopts `map_center` as its provisional point with no
    /// address yet; a slot with a point keeps it.
    pub fn activate(&mut self, target: PinTarget, map_center: Coordinates) -> Activation {
        let previous = self.mode.target();
        self.mode = target.into();

        let slot = self.slot_mut(target);
        let seed = match slot.coordinate {
            Some(existing) => Seed::Existing(existing),
            None => {
                slot.move_to(map_center);
                slot.address = None;
                slot.address_key = None;
                Seed::MapCenter(map_center)
            }
        };

        Activation {
            target,
            seed,
            replaced: previous.filter(|p| *p != target),
            already_active: previous == Some(target),
        }
    }

    /// Return to `None`, unconditionally. Returns the target that was active.
    pub fn deactivate(&mut self) -> Option<PinTarget> {
        let previous = self.mode.target();
        self.mode = PinMode::None;
        previous
    }
}
