//! Core types for riskwatch sensor data and alarm state.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hazard classification of the current environment.
///
/// # Ordering
///
/// Levels are ordered by severity: `Normal < Trending < Critical`.
/// This allows threshold comparisons like `if level >= HazardLevel::Trending { warn!(...) }`.
///
/// ```
/// use riskwatch_types::HazardLevel;
///
/// assert!(HazardLevel::Critical > HazardLevel::Trending);
/// assert!(HazardLevel::Trending > HazardLevel::Normal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum HazardLevel {
    /// No hazard detected.
    #[default]
    Normal = 0,
    /// A rate-of-change trajectory worth an advisory, no immediate danger.
    Trending = 1,
    /// An instantaneous threshold breach.
    Critical = 2,
}

impl HazardLevel {
    /// Whether this level represents an instantaneous threshold breach.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, HazardLevel::Critical)
    }
}

impl fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HazardLevel::Normal => write!(f, "Normal"),
            HazardLevel::Trending => write!(f, "Trending"),
            HazardLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// One timestamped sample of the four monitored environmental quantities.
///
/// Immutable once created. Produced by the sensor transport once per poll
/// cycle; the wire field name for acetone is `aceton`, matching the sensor
/// firmware's JSON payload.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity percentage (0-100).
    pub humidity: f32,
    /// CO2 concentration in ppm.
    pub co2: u16,
    /// Acetone concentration in ppm.
    pub aceton: f32,
    /// When the sample was captured.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub captured_at: time::OffsetDateTime,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            co2: 0,
            aceton: 0.0,
            captured_at: time::OffsetDateTime::UNIX_EPOCH,
        }
    }
}

impl Reading {
    /// Create a builder for constructing a `Reading`.
    pub fn builder() -> ReadingBuilder {
        ReadingBuilder::default()
    }
}

/// Builder for constructing [`Reading`] values.
#[derive(Debug, Default)]
#[must_use]
pub struct ReadingBuilder {
    reading: Reading,
}

impl ReadingBuilder {
    /// Set temperature (°C).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.reading.temperature = temperature;
        self
    }

    /// Set relative humidity (%).
    pub fn humidity(mut self, humidity: f32) -> Self {
        self.reading.humidity = humidity;
        self
    }

    /// Set CO2 concentration (ppm).
    pub fn co2(mut self, co2: u16) -> Self {
        self.reading.co2 = co2;
        self
    }

    /// Set acetone concentration (ppm).
    pub fn aceton(mut self, aceton: f32) -> Self {
        self.reading.aceton = aceton;
        self
    }

    /// Set the capture timestamp.
    pub fn captured_at(mut self, timestamp: time::OffsetDateTime) -> Self {
        self.reading.captured_at = timestamp;
        self
    }

    /// Build the `Reading`.
    #[must_use]
    pub fn build(self) -> Reading {
        self.reading
    }
}

/// Where an advisory text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AdvisorySource {
    /// Returned by the external advisory service.
    Live,
    /// Synthesized locally after a timeout, transport, or parse failure.
    Fallback,
}

impl fmt::Display for AdvisorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisorySource::Live => write!(f, "live"),
            AdvisorySource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Result of an advisory request.
///
/// The text is always displayable; failures never cross this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdvisoryOutcome {
    /// Human-readable recommendation text. Never empty.
    pub text: String,
    /// Whether the text came from the service or the local fallback.
    pub source: AdvisorySource,
}

/// The presentation-facing alarm snapshot.
///
/// Mutated only by the alarm controller; consumers read cloned snapshots
/// and must tolerate the state changing between reads.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlarmState {
    /// Current hazard classification. Tracks the classifier every cycle,
    /// independent of popup visibility.
    pub level: HazardLevel,
    /// Trigger reason text; empty while Normal.
    pub reason: String,
    /// Advisory text currently displayed, if any.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub advisory: Option<String>,
    /// Whether an advisory request is in flight. At most one per controller.
    pub advisory_pending: bool,
    /// True only while a warning popup is displayed; prevents duplicate
    /// requests for the same ongoing event.
    pub suppressed: bool,
}

/// One row of the hourly-aggregate feed.
///
/// The feed yields 24 rows ("0:00" through "23:00"), averaging all readings
/// for that hour of day across all days, with zero-filled gaps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HourlyAverage {
    /// Display label for the hour, e.g. "13:00".
    pub hour: String,
    /// Mean temperature for this hour of day (°C).
    pub avg_temp: f32,
    /// Mean relative humidity for this hour of day (%).
    pub avg_humidity: f32,
    /// Mean CO2 for this hour of day (ppm).
    pub avg_co2: f32,
    /// Mean acetone for this hour of day (ppm).
    pub avg_aceton: f32,
}
