//! Alarm event system for ingestion and popup notifications.
//!
//! Events are broadcast so multiple consumers (WebSocket feeds, logs,
//! tests) can observe the controller without coupling to it.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use riskwatch_types::{AdvisorySource, HazardLevel, Reading};

/// Events emitted by the alarm controller.
///
/// All events are serializable for logging and IPC.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum AlarmEvent {
    /// A reading was ingested and classified.
    Ingested {
        reading: Reading,
        level: HazardLevel,
    },
    /// The hazard level changed.
    LevelChanged { level: HazardLevel, reason: String },
    /// An advisory became available for display.
    AdvisoryReady { text: String, source: AdvisorySource },
    /// The user dismissed the popup.
    Dismissed,
}

/// Sender for alarm events.
pub type EventSender = broadcast::Sender<AlarmEvent>;

/// Receiver for alarm events.
pub type EventReceiver = broadcast::Receiver<AlarmEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    broadcast::channel(capacity)
}
