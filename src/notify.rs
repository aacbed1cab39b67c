//! User-facing notifications
//!
//! The host owns presentation; the coordinator hands it structured
//! messages and never waits for an answer.

use crate::pin::PinTarget;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Visual style hint for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStyle {
    Info,
    Success,
    Warning,
}

/// A message for the host to present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub style: NotificationStyle,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        style: NotificationStyle,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            style,
        }
    }

    /// Shown when manual placement starts for `target`
    pub fn placement_started(target: PinTarget) -> Self {
        match target {
            PinTarget::From => Self::new(
                "Set pickup location",
                "Move the map until the pin sits on your pickup point, then confirm.",
                NotificationStyle::Info,
            ),
            PinTarget::To => Self::new(
                "Set drop-off location",
                "Move the map until the pin sits on your destination, then confirm.",
                NotificationStyle::Info,
            ),
        }
    }

    /// Shown when `target` is committed at `address`
    pub fn placement_confirmed(target: PinTarget, address: &str) -> Self {
        let title = match target {
            PinTarget::From => "Pickup location set",
            PinTarget::To => "Drop-off location set",
        };
        Self::new(title, address, NotificationStyle::Success)
    }

    /// Shown once when device location cannot be used
    pub fn location_unavailable(reason: &str) -> Self {
        Self::new(
            "Location unavailable",
            format!("{}. You can still place pins on the map by hand.", reason),
            NotificationStyle::Warning,
        )
    }
}

/// Receiver of notifications, owned by the host
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<F> NotificationSink for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Sink that writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.style {
            NotificationStyle::Warning => {
                warn!("{}: {}", notification.title, notification.description)
            }
            NotificationStyle::Info | NotificationStyle::Success => {
                info!("{}: {}", notification.title, notification.description)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_started_copy_differs_per_target() {
        let from = Notification::placement_started(PinTarget::From);
        let to = Notification::placement_started(PinTarget::To);

        assert_ne!(from.title, to.title);
        assert_ne!(from.description, to.description);
        assert_eq!(from.style, NotificationStyle::Info);
    }

    #[test]
    fn test_confirmed_carries_address() {
        let n = Notification::placement_confirmed(PinTarget::To, "Bab Touma");
        assert_eq!(n.description, "Bab Touma");
        assert_eq!(n.style, NotificationStyle::Success);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let sink = move |n: Notification| record.lock().unwrap().push(n);

        sink.notify(Notification::location_unavailable("Permission denied"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].style, NotificationStyle::Warning);
        assert!(seen[0].description.starts_with("Permission denied."));
    }

    #[test]
    fn test_serialization() {
        let n = Notification::placement_started(PinTarget::From);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["style"], "info");
    }
}
