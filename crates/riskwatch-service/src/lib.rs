//! Riskwatch service library.
//!
//! Wires the alarm engine to its transports: a background collector polls
//! the sensor feed on a fixed cadence and pushes readings through the
//! controller, while an HTTP API exposes the alarm snapshot, the latest
//! reading, the hourly-aggregate feed, and the popup dismissal operation.

pub mod aggregates;
pub mod api;
pub mod collector;
pub mod config;
pub mod sensor;
pub mod state;

pub use aggregates::{AggregateClient, OverallStats};
pub use collector::Collector;
pub use config::Config;
pub use sensor::{HttpSensor, MockSensor, SensorError, SensorSource};
pub use state::AppState;
