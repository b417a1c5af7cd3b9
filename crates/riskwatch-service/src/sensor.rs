//! Sensor feed clients.
//!
//! The collector only requires "deliver a [`Reading`] or signal
//! unavailability"; a failed sample makes the collector skip that poll
//! cycle, nothing more. Implausible values are trusted (the sensor
//! collaborator owns calibration), with a warning logged for negative
//! concentrations.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use riskwatch_types::Reading;

/// Sensor feed errors.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// The sensor endpoint is not reachable.
    #[error("Sensor not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The sensor answered with a non-success status.
    #[error("Sensor returned HTTP {status}")]
    Status { status: u16 },

    /// The payload did not match the expected JSON shape.
    #[error("Invalid sensor payload: {0}")]
    Payload(String),

    /// Invalid sensor URL.
    #[error("Invalid sensor URL: {0}")]
    InvalidUrl(String),
}

/// Source of periodic sensor readings.
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Fetch one reading, or signal unavailability.
    async fn sample(&self) -> Result<Reading, SensorError>;
}

/// JSON payload the sensor firmware serves.
#[derive(Debug, Deserialize)]
struct SensorPayload {
    temperature: f32,
    humidity: f32,
    co2: u16,
    aceton: f32,
}

impl SensorPayload {
    fn into_reading(self, captured_at: time::OffsetDateTime) -> Reading {
        if self.aceton < 0.0 || self.humidity < 0.0 {
            warn!(
                "Sensor reported implausible values (humidity {}, aceton {})",
                self.humidity, self.aceton
            );
        }
        Reading {
            temperature: self.temperature,
            humidity: self.humidity,
            co2: self.co2,
            aceton: self.aceton,
            captured_at,
        }
    }
}

/// HTTP client for the hardware sensor endpoint.
#[derive(Debug, Clone)]
pub struct HttpSensor {
    client: reqwest::Client,
    url: String,
}

impl HttpSensor {
    /// Create a client for the given endpoint with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::InvalidUrl`] if the URL has no http(s)
    /// scheme, or a transport error if the client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SensorError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SensorError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {url}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SensorError::NotReachable {
                url: url.to_string(),
                source: e,
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl SensorSource for HttpSensor {
    async fn sample(&self) -> Result<Reading, SensorError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SensorError::NotReachable {
                url: self.url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SensorError::Status {
                status: status.as_u16(),
            });
        }

        let payload: SensorPayload = response
            .json()
            .await
            .map_err(|e| SensorError::Payload(e.to_string()))?;

        Ok(payload.into_reading(time::OffsetDateTime::now_utc()))
    }
}

/// Mock sensor feed for running without hardware.
///
/// Generates readings in the same ranges the firmware's bench harness
/// uses: temperature 20–30 °C, humidity 40–60 %, CO2 400–900 ppm,
/// acetone 0–5 ppm.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSensor;

#[async_trait]
impl SensorSource for MockSensor {
    async fn sample(&self) -> Result<Reading, SensorError> {
        use rand::Rng;

        let (temperature, humidity, co2, aceton) = {
            let mut rng = rand::rng();
            (
                round_to(rng.random_range(20.0..30.0), 1),
                round_to(rng.random_range(40.0..60.0), 1),
                rng.random_range(400..=900u16),
                round_to(rng.random_range(0.0..5.0), 2),
            )
        };

        Ok(Reading {
            temperature,
            humidity,
            co2,
            aceton,
            captured_at: time::OffsetDateTime::now_utc(),
        })
    }
}

fn round_to(value: f32, decimals: u32) -> f32 {
    let factor = 10f32.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_parses_firmware_json() {
        let json = r#"{"temperature": 24.6, "humidity": 48.2, "co2": 612, "aceton": 1.42}"#;
        let payload: SensorPayload = serde_json::from_str(json).unwrap();
        let reading = payload.into_reading(time::OffsetDateTime::UNIX_EPOCH);
        assert_eq!(reading.temperature, 24.6);
        assert_eq!(reading.humidity, 48.2);
        assert_eq!(reading.co2, 612);
        assert_eq!(reading.aceton, 1.42);
    }

    #[test]
    fn payload_rejects_missing_fields() {
        let json = r#"{"temperature": 24.6, "humidity": 48.2}"#;
        assert!(serde_json::from_str::<SensorPayload>(json).is_err());
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = HttpSensor::new("192.168.10.1/data", Duration::from_secs(2));
        assert!(matches!(result, Err(SensorError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn unreachable_sensor_signals_unavailability() {
        let sensor = HttpSensor::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = sensor.sample().await;
        assert!(matches!(result, Err(SensorError::NotReachable { .. })));
    }

    #[tokio::test]
    async fn mock_sensor_stays_in_range() {
        let sensor = MockSensor;
        for _ in 0..50 {
            let reading = sensor.sample().await.unwrap();
            assert!((20.0..=30.0).contains(&reading.temperature));
            assert!((40.0..=60.0).contains(&reading.humidity));
            assert!((400..=900).contains(&reading.co2));
            assert!((0.0..=5.0).contains(&reading.aceton));
        }
    }

    #[test]
    fn rounding_matches_display_precision() {
        assert_eq!(round_to(24.64, 1), 24.6);
        assert_eq!(round_to(1.426, 2), 1.43);
    }
}
