//! Background sensor collector.
//!
//! One task owns the poll loop: a fixed-interval ticker pulls a reading
//! from the sensor feed and pushes it through the alarm controller's
//! single ingestion entry point, in arrival order. A failed sample skips
//! that cycle without touching the alarm state.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Background collector that polls the sensor feed at the configured
/// interval.
pub struct Collector {
    state: Arc<AppState>,
}

impl Collector {
    /// Create a new collector.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start the poll loop. Returns immediately; collection happens in
    /// the background until the stop signal fires.
    pub fn start(&self) {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            poll_loop(state).await;
        });
    }
}

async fn poll_loop(state: Arc<AppState>) {
    let poll_interval_ms = state.config.read().await.sensor.poll_interval_ms;

    info!("Starting collector (interval: {} ms)", poll_interval_ms);
    state.collector.set_running(true);

    let mut ticker = interval(Duration::from_millis(poll_interval_ms));
    let mut stop_rx = state.collector.subscribe_stop();
    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    break;
                }
                continue;
            }
        }

        match state.sensor.sample().await {
            Ok(reading) => {
                consecutive_failures = 0;
                let level = state.controller.ingest(reading).await;
                *state.latest.write().await = Some(reading);

                let mut stats = state.collector.stats.write().await;
                stats.record_success(OffsetDateTime::now_utc());
                drop(stats);

                debug!(
                    "Sampled reading: temp={} co2={} aceton={} -> {}",
                    reading.temperature, reading.co2, reading.aceton, level
                );
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= 3 {
                    warn!(
                        "Sensor sample failed: {} (attempt {})",
                        e, consecutive_failures
                    );
                } else if consecutive_failures == 4 {
                    error!(
                        "Sensor sample failed {} times, will continue trying silently",
                        consecutive_failures
                    );
                }

                let mut stats = state.collector.stats.write().await;
                stats.record_failure(OffsetDateTime::now_utc(), e.to_string());
                // Skip this cycle; the sensor may come back online.
            }
        }
    }

    state.collector.set_running(false);
    info!("Collector stopped");
}
