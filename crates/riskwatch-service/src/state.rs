//! Application state shared across handlers.
//!
//! The alarm controller is the single writer of the alarm snapshot; HTTP
//! handlers and the collector read through it. The collector's own
//! control surface (running flag, stop signal, poll statistics) lives in
//! [`CollectorState`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use time::OffsetDateTime;
use tokio::sync::{RwLock, watch};

use riskwatch_core::AlarmController;
use riskwatch_types::Reading;

use crate::aggregates::AggregateClient;
use crate::config::Config;
use crate::sensor::SensorSource;

/// Shared application state.
pub struct AppState {
    /// The alarm engine.
    pub controller: AlarmController,
    /// The sensor feed the collector polls.
    pub sensor: Arc<dyn SensorSource>,
    /// Client for the hourly-aggregate backend.
    pub aggregates: AggregateClient,
    /// Configuration (RwLock for runtime reads by handlers).
    pub config: RwLock<Config>,
    /// Most recent successfully sampled reading.
    pub latest: RwLock<Option<Reading>>,
    /// Collector control state.
    pub collector: CollectorState,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        config: Config,
        controller: AlarmController,
        sensor: Arc<dyn SensorSource>,
        aggregates: AggregateClient,
    ) -> Arc<Self> {
        let poll_interval_ms = config.sensor.poll_interval_ms;
        Arc::new(Self {
            controller,
            sensor,
            aggregates,
            config: RwLock::new(config),
            latest: RwLock::new(None),
            collector: CollectorState::new(poll_interval_ms),
        })
    }
}

/// State for tracking and controlling the collector.
pub struct CollectorState {
    /// Whether the collector loop is currently running.
    running: AtomicBool,
    /// When the collector was started (Unix timestamp).
    started_at: AtomicU64,
    /// Channel to signal the collector task to stop.
    stop_tx: watch::Sender<bool>,
    /// Receiver for the stop signal (cloned by the collector task).
    stop_rx: watch::Receiver<bool>,
    /// Poll statistics.
    pub stats: RwLock<PollStats>,
}

impl CollectorState {
    /// Create a new collector state.
    pub fn new(poll_interval_ms: u64) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicU64::new(0),
            stop_tx,
            stop_rx,
            stats: RwLock::new(PollStats::new(poll_interval_ms)),
        }
    }

    /// Check if the collector is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the collector as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if running {
            let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
            self.started_at.store(now, Ordering::SeqCst);
        }
    }

    /// Get the collector start time.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let ts = self.started_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts as i64).ok()
        }
    }

    /// Get a receiver for the stop signal.
    pub fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    /// Signal the collector task to stop.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}

/// Poll-loop statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PollStats {
    /// Poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Time of the last successful sample.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_sample_at: Option<OffsetDateTime>,
    /// Time of the last failed sample.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_error_at: Option<OffsetDateTime>,
    /// Last error message.
    pub last_error: Option<String>,
    /// Total successful samples.
    pub success_count: u64,
    /// Total failed samples.
    pub failure_count: u64,
}

impl PollStats {
    fn new(poll_interval_ms: u64) -> Self {
        Self {
            poll_interval_ms,
            last_sample_at: None,
            last_error_at: None,
            last_error: None,
            success_count: 0,
            failure_count: 0,
        }
    }

    /// Record a successful sample.
    pub fn record_success(&mut self, at: OffsetDateTime) {
        self.last_sample_at = Some(at);
        self.success_count += 1;
    }

    /// Record a failed sample.
    pub fn record_failure(&mut self, at: OffsetDateTime, error: String) {
        self.last_error_at = Some(at);
        self.last_error = Some(error);
        self.failure_count += 1;
    }
}
