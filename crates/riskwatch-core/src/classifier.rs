//! Hazard classification rules.
//!
//! The classifier is a pure function over the rolling window and the
//! current reading. Instantaneous threshold breaches win over trend
//! detection; trend detection needs at least two prior readings.
//!
//! # Example
//!
//! ```
//! use riskwatch_core::{HazardClassifier, HazardLevel, Reading};
//!
//! let classifier = HazardClassifier::default();
//! let reading = Reading::builder().temperature(31.0).co2(400).build();
//! let verdict = classifier.classify(&[], &reading);
//! assert_eq!(verdict.level, HazardLevel::Critical);
//! ```

use serde::{Deserialize, Serialize};

use riskwatch_types::{HazardLevel, Reading};

/// Reason phrase for an acetone concentration breach.
pub const CHEMICAL_LEAK_REASON: &str = "Critical Chemical Leak.";
/// Reason phrase for a temperature breach.
pub const THERMAL_REASON: &str = "Thermal Criticality.";
/// Reason phrase for a temperature rate-of-change trigger.
pub const TEMP_SPIKE_REASON: &str = "Temp Spike.";
/// Reason phrase for an acetone rate-of-change trigger.
pub const ACETONE_SURGE_REASON: &str = "Acetone Surge.";
/// Reason phrase for a CO2 rate-of-change trigger.
pub const CO2_RISING_REASON: &str = "CO2 Rising.";

/// How far back in the window the trend comparison reaches.
///
/// The look-back lands on `max(0, len - LOOKBACK_SPAN)`: a short slope
/// check that tolerates single-sample noise rather than a full-history
/// regression.
const LOOKBACK_SPAN: usize = 3;

/// Trigger thresholds for hazard classification.
///
/// Critical thresholds are strict inequalities: a reading at exactly the
/// threshold does not trigger. Delta thresholds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Acetone concentration above which the state is Critical (ppm).
    pub aceton_critical_ppm: f32,
    /// Temperature above which the state is Critical (°C).
    pub temperature_critical_c: f32,
    /// Temperature rise that contributes a Trending trigger (°C).
    pub temperature_delta_c: f32,
    /// Acetone rise that contributes a Trending trigger (ppm).
    pub aceton_delta_ppm: f32,
    /// CO2 rise that contributes a Trending trigger (ppm).
    pub co2_delta_ppm: i32,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            aceton_critical_ppm: 100.0,
            temperature_critical_c: 30.0,
            temperature_delta_c: 1.0,
            aceton_delta_ppm: 5.0,
            co2_delta_ppm: 50,
        }
    }
}

/// Outcome of classifying one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// The hazard level.
    pub level: HazardLevel,
    /// Concatenated trigger phrases; empty while Normal.
    pub reason: String,
    /// Whether this verdict warrants an advisory request. Always false
    /// for Critical (urgent messages bypass the advisory round trip) and
    /// Normal.
    pub needs_advisory: bool,
}

impl Verdict {
    fn normal() -> Self {
        Self {
            level: HazardLevel::Normal,
            reason: String::new(),
            needs_advisory: false,
        }
    }
}

/// Pure hazard classifier.
#[derive(Debug, Clone, Default)]
pub struct HazardClassifier {
    config: TriggerConfig,
}

impl HazardClassifier {
    /// Create a classifier with the given trigger thresholds.
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    /// The trigger thresholds in use.
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Classify `current` against the window of prior readings.
    ///
    /// `window` holds prior readings in arrival order, most-recent last,
    /// and must not include `current`. Idempotent: identical inputs yield
    /// identical verdicts.
    pub fn classify(&self, window: &[Reading], current: &Reading) -> Verdict {
        // Instantaneous breaches win; no history required.
        let mut breaches: Vec<&str> = Vec::new();
        if current.aceton > self.config.aceton_critical_ppm {
            breaches.push(CHEMICAL_LEAK_REASON);
        }
        if current.temperature > self.config.temperature_critical_c {
            breaches.push(THERMAL_REASON);
        }
        if !breaches.is_empty() {
            return Verdict {
                level: HazardLevel::Critical,
                reason: breaches.join(" "),
                needs_advisory: false,
            };
        }

        // Trend detection needs at least two prior readings.
        if window.len() < 2 {
            return Verdict::normal();
        }
        let old = &window[window.len().saturating_sub(LOOKBACK_SPAN)];

        let mut phrases: Vec<&str> = Vec::new();
        if current.temperature - old.temperature >= self.config.temperature_delta_c {
            phrases.push(TEMP_SPIKE_REASON);
        }
        if current.aceton - old.aceton >= self.config.aceton_delta_ppm {
            phrases.push(ACETONE_SURGE_REASON);
        }
        if i32::from(current.co2) - i32::from(old.co2) >= self.config.co2_delta_ppm {
            phrases.push(CO2_RISING_REASON);
        }

        if phrases.is_empty() {
            Verdict::normal()
        } else {
            Verdict {
                level: HazardLevel::Trending,
                reason: phrases.join(" "),
                needs_advisory: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temp: f32, co2: u16, aceton: f32) -> Reading {
        Reading::builder()
            .temperature(temp)
            .humidity(40.0)
            .co2(co2)
            .aceton(aceton)
            .build()
    }

    #[test]
    fn quiet_reading_is_normal() {
        let classifier = HazardClassifier::default();
        let verdict = classifier.classify(&[], &reading(25.0, 400, 2.0));
        assert_eq!(verdict.level, HazardLevel::Normal);
        assert!(verdict.reason.is_empty());
        assert!(!verdict.needs_advisory);
    }

    #[test]
    fn temperature_breach_is_critical_without_history() {
        let classifier = HazardClassifier::default();
        let verdict = classifier.classify(&[], &reading(31.0, 400, 2.0));
        assert_eq!(verdict.level, HazardLevel::Critical);
        assert!(verdict.reason.contains(THERMAL_REASON));
        assert!(!verdict.needs_advisory);
    }

    #[test]
    fn aceton_breach_is_critical() {
        let classifier = HazardClassifier::default();
        let verdict = classifier.classify(&[], &reading(25.0, 400, 120.0));
        assert_eq!(verdict.level, HazardLevel::Critical);
        assert_eq!(verdict.reason, CHEMICAL_LEAK_REASON);
    }

    #[test]
    fn double_breach_concatenates_reasons() {
        let classifier = HazardClassifier::default();
        let verdict = classifier.classify(&[], &reading(32.0, 400, 150.0));
        assert_eq!(verdict.level, HazardLevel::Critical);
        assert!(verdict.reason.contains(CHEMICAL_LEAK_REASON));
        assert!(verdict.reason.contains(THERMAL_REASON));
    }

    #[test]
    fn critical_boundary_is_strict() {
        let classifier = HazardClassifier::default();
        // Exactly at the threshold: no trigger.
        assert_eq!(
            classifier.classify(&[], &reading(30.0, 400, 100.0)).level,
            HazardLevel::Normal
        );
        // Just past it: trigger.
        assert_eq!(
            classifier.classify(&[], &reading(30.01, 400, 2.0)).level,
            HazardLevel::Critical
        );
        assert_eq!(
            classifier.classify(&[], &reading(25.0, 400, 100.01)).level,
            HazardLevel::Critical
        );
    }

    #[test]
    fn short_window_never_trends() {
        let classifier = HazardClassifier::default();
        let window = [reading(20.0, 300, 0.0)];
        // Deltas would qualify, but a single prior reading is not a trend.
        let verdict = classifier.classify(&window, &reading(25.0, 600, 20.0));
        assert_eq!(verdict.level, HazardLevel::Normal);
    }

    #[test]
    fn co2_rise_trends_against_lookback() {
        let classifier = HazardClassifier::default();
        let window = [reading(25.0, 400, 2.0), reading(25.0, 400, 2.0)];
        let verdict = classifier.classify(&window, &reading(25.0, 460, 2.0));
        assert_eq!(verdict.level, HazardLevel::Trending);
        assert_eq!(verdict.reason, CO2_RISING_REASON);
        assert!(verdict.needs_advisory);
    }

    #[test]
    fn lookback_skips_recent_noise() {
        let classifier = HazardClassifier::default();
        // Five priors: the comparison reaches index 2, not the newest entry.
        let window = [
            reading(25.0, 400, 2.0),
            reading(25.0, 400, 2.0),
            reading(25.0, 400, 2.0),
            reading(25.0, 455, 2.0),
            reading(25.0, 458, 2.0),
        ];
        let verdict = classifier.classify(&window, &reading(25.0, 460, 2.0));
        assert_eq!(verdict.level, HazardLevel::Trending);
        assert_eq!(verdict.reason, CO2_RISING_REASON);
    }

    #[test]
    fn multiple_trends_concatenate() {
        let classifier = HazardClassifier::default();
        let window = [reading(24.0, 400, 2.0), reading(24.0, 400, 2.0)];
        let verdict = classifier.classify(&window, &reading(25.5, 460, 8.0));
        assert_eq!(verdict.level, HazardLevel::Trending);
        assert_eq!(
            verdict.reason,
            format!("{TEMP_SPIKE_REASON} {ACETONE_SURGE_REASON} {CO2_RISING_REASON}")
        );
    }

    #[test]
    fn delta_boundary_is_inclusive() {
        let classifier = HazardClassifier::default();
        let window = [reading(24.0, 400, 2.0), reading(24.0, 400, 2.0)];
        // Exactly at the delta threshold triggers.
        let verdict = classifier.classify(&window, &reading(25.0, 400, 2.0));
        assert_eq!(verdict.level, HazardLevel::Trending);
        assert_eq!(verdict.reason, TEMP_SPIKE_REASON);
        // Just below it does not.
        let verdict = classifier.classify(&window, &reading(24.9, 400, 2.0));
        assert_eq!(verdict.level, HazardLevel::Normal);
    }

    #[test]
    fn falling_values_never_trend() {
        let classifier = HazardClassifier::default();
        let window = [reading(28.0, 800, 20.0), reading(28.0, 800, 20.0)];
        let verdict = classifier.classify(&window, &reading(24.0, 500, 4.0));
        assert_eq!(verdict.level, HazardLevel::Normal);
    }

    #[test]
    fn classify_is_idempotent() {
        let classifier = HazardClassifier::default();
        let window = [reading(25.0, 400, 2.0), reading(25.0, 410, 2.0)];
        let current = reading(25.0, 470, 2.0);
        let first = classifier.classify(&window, &current);
        let second = classifier.classify(&window, &current);
        assert_eq!(first, second);
    }

    #[test]
    fn custom_thresholds() {
        let classifier = HazardClassifier::new(TriggerConfig {
            temperature_critical_c: 50.0,
            ..TriggerConfig::default()
        });
        assert_eq!(
            classifier.classify(&[], &reading(31.0, 400, 2.0)).level,
            HazardLevel::Normal
        );
        assert_eq!(
            classifier.classify(&[], &reading(50.5, 400, 2.0)).level,
            HazardLevel::Critical
        );
    }

    #[test]
    fn trigger_config_fills_missing_fields_with_defaults() {
        let config: TriggerConfig = serde_json::from_str(r#"{"co2_delta_ppm": 75}"#).unwrap();
        assert_eq!(config.co2_delta_ppm, 75);
        assert_eq!(config.aceton_critical_ppm, 100.0);
        assert_eq!(config.temperature_critical_c, 30.0);
    }
}
