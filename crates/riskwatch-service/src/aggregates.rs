//! Hourly-aggregate feed client.
//!
//! The aggregate backend groups readings by hour of day (00-23) across
//! all days and serves 24 averaged rows with zero-filled gaps. The alarm
//! engine never touches this feed; it exists for trend review in the
//! presentation layer.

use serde::Serialize;

use riskwatch_types::HourlyAverage;

/// Aggregate feed errors.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The aggregate backend is not reachable.
    #[error("Aggregate feed not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("Aggregate feed returned HTTP {status}")]
    Status { status: u16 },

    /// The payload did not match the expected JSON shape.
    #[error("Invalid aggregate payload: {0}")]
    Payload(String),

    /// Invalid base URL.
    #[error("Invalid aggregate feed URL: {0}")]
    InvalidUrl(String),
}

/// HTTP client for the hourly-aggregate backend.
#[derive(Debug, Clone)]
pub struct AggregateClient {
    client: reqwest::Client,
    base_url: String,
}

impl AggregateClient {
    /// Create a client for the given backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::InvalidUrl`] if the URL has no http(s)
    /// scheme.
    pub fn new(base_url: &str) -> Result<Self, AggregateError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AggregateError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {base_url}"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the 24-row hourly average sequence.
    pub async fn fetch_hourly(&self) -> Result<Vec<HourlyAverage>, AggregateError> {
        let url = format!("{}/api/history/hourly", self.base_url);
        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| AggregateError::NotReachable {
                    url: url.clone(),
                    source: e,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregateError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AggregateError::Payload(e.to_string()))
    }
}

/// Overall gas statistics derived from the hourly feed.
///
/// Only hours that actually saw data (`avg_co2 > 0`) contribute; the CO2
/// mean is rounded to a whole ppm, the acetone mean to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallStats {
    /// Mean CO2 across active hours (ppm).
    pub avg_co2: i64,
    /// Mean acetone across active hours (ppm).
    pub avg_aceton: f64,
}

impl OverallStats {
    /// Derive overall statistics from the hourly rows.
    pub fn from_hourly(rows: &[HourlyAverage]) -> Self {
        let active: Vec<&HourlyAverage> = rows.iter().filter(|h| h.avg_co2 > 0.0).collect();
        let count = active.len().max(1) as f64;

        let total_co2: f64 = active.iter().map(|h| f64::from(h.avg_co2)).sum();
        let total_aceton: f64 = active.iter().map(|h| f64::from(h.avg_aceton)).sum();

        Self {
            avg_co2: (total_co2 / count).round() as i64,
            avg_aceton: (total_aceton / count * 100.0).round() / 100.0,
        }
    }
}
