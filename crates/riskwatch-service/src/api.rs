//! REST API endpoints for the riskwatch service.
//!
//! The presentation boundary: a read-only alarm snapshot, an explicit
//! dismissal operation, the latest reading, and the proxied
//! hourly-aggregate feed. The rolling window itself is never exposed.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use time::OffsetDateTime;

use riskwatch_types::{AlarmState, HourlyAverage, Reading};

use crate::aggregates::OverallStats;
use crate::state::{AppState, PollStats};

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(get_status))
        .route("/api/alarm", get(get_alarm))
        .route("/api/alarm/dismiss", post(dismiss_alarm))
        .route("/api/current", get(get_current))
        .route("/api/history/hourly", get(get_hourly))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Service status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub collector: CollectorStatus,
    pub poll: PollStats,
}

/// Collector status block.
#[derive(Debug, Serialize)]
pub struct CollectorStatus {
    pub running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    pub uptime_seconds: Option<u64>,
}

/// Service status endpoint.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let started_at = state.collector.started_at();
    let uptime_seconds = started_at.map(|t| {
        let elapsed = OffsetDateTime::now_utc() - t;
        elapsed.whole_seconds().max(0) as u64
    });

    let poll = state.collector.stats.read().await.clone();

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        collector: CollectorStatus {
            running: state.collector.is_running(),
            started_at,
            uptime_seconds,
        },
        poll,
    })
}

/// Read-only alarm snapshot.
async fn get_alarm(State(state): State<Arc<AppState>>) -> Json<AlarmState> {
    Json(state.controller.snapshot().await)
}

/// Dismissal response.
#[derive(Debug, Serialize)]
pub struct DismissResponse {
    pub success: bool,
    pub alarm: AlarmState,
}

/// Dismiss the popup.
async fn dismiss_alarm(State(state): State<Arc<AppState>>) -> Json<DismissResponse> {
    state.controller.dismiss().await;
    Json(DismissResponse {
        success: true,
        alarm: state.controller.snapshot().await,
    })
}

/// Latest successfully sampled reading.
async fn get_current(State(state): State<Arc<AppState>>) -> Response {
    match *state.latest.read().await {
        Some(reading) => Json::<Reading>(reading).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no reading sampled yet" })),
        )
            .into_response(),
    }
}

/// Hourly-aggregate response.
#[derive(Debug, Serialize)]
pub struct HourlyResponse {
    pub hours: Vec<HourlyAverage>,
    pub overall: OverallStats,
}

/// Proxied hourly-aggregate feed with overall statistics.
async fn get_hourly(State(state): State<Arc<AppState>>) -> Response {
    match state.aggregates.fetch_hourly().await {
        Ok(hours) => {
            let overall = OverallStats::from_hourly(&hours);
            Json(HourlyResponse { hours, overall }).into_response()
        }
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
