//! Alarm classification and trend-prediction engine for riskwatch.
//!
//! This crate turns a stream of raw environmental readings into a hazard
//! classification and drives the alerting workflow:
//!
//! - **Rolling window**: bounded FIFO of recent readings for trend deltas
//! - **Classifier**: pure mapping from (window, reading) to a hazard verdict
//! - **Advisory**: rate-limited, deadline-bounded gateway to an external
//!   advisory service, with a local fallback so the caller always receives
//!   displayable text
//! - **Controller**: the stateful orchestrator owning the alarm state and
//!   the popup lifecycle
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use riskwatch_core::{AlarmController, MockAdvisor, Reading};
//!
//! #[tokio::main]
//! async fn main() {
//!     let advisor = Arc::new(MockAdvisor::new("Increase ventilation."));
//!     let controller = AlarmController::new(advisor);
//!
//!     let reading = Reading::builder()
//!         .temperature(24.0)
//!         .humidity(45.0)
//!         .co2(420)
//!         .aceton(1.2)
//!         .build();
//!     let level = controller.ingest(reading).await;
//!     println!("hazard level: {}", level);
//!
//!     let alarm = controller.snapshot().await;
//!     assert!(!alarm.suppressed);
//! }
//! ```

pub mod advisory;
pub mod classifier;
pub mod controller;
pub mod error;
pub mod events;
pub mod mock;
pub mod traits;
pub mod window;

pub use advisory::{AdvisoryClient, FallbackAdvisor, DEFAULT_ADVISORY_TIMEOUT};
pub use classifier::{HazardClassifier, TriggerConfig, Verdict};
pub use controller::{AlarmController, ControllerOptions};
pub use error::{Error, Result};
pub use events::{AlarmEvent, EventReceiver, EventSender};
pub use mock::MockAdvisor;
pub use traits::AdvisoryProvider;
pub use window::{RollingWindow, DEFAULT_WINDOW_CAPACITY};

// Re-export the shared data model.
pub use riskwatch_types::{
    AdvisoryOutcome, AdvisorySource, AlarmState, HazardLevel, HourlyAverage, Reading,
};
