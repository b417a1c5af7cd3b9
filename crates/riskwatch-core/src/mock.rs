//! Mock advisory provider for testing.
//!
//! Lets controller tests script the advisory outcome, inject artificial
//! latency to widen the in-flight window, and count how many requests
//! actually reached the provider.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use riskwatch_types::{AdvisoryOutcome, AdvisorySource, Reading};

use crate::advisory::fallback;
use crate::traits::AdvisoryProvider;

/// A scripted advisory provider.
///
/// # Example
///
/// ```
/// use riskwatch_core::{AdvisoryProvider, MockAdvisor, Reading};
///
/// #[tokio::main]
/// async fn main() {
///     let advisor = MockAdvisor::new("Open the exhaust dampers.");
///     let reading = Reading::builder().co2(900).build();
///     let outcome = advisor.advise(&reading, "CO2 Rising.").await;
///     assert_eq!(outcome.text, "Open the exhaust dampers.");
///     assert_eq!(advisor.calls(), 1);
/// }
/// ```
pub struct MockAdvisor {
    text: RwLock<String>,
    latency_ms: AtomicU64,
    fallback_mode: AtomicBool,
    calls: AtomicU32,
}

impl MockAdvisor {
    /// Create a mock that answers with the given text.
    pub fn new(text: &str) -> Self {
        Self {
            text: RwLock::new(text.to_string()),
            latency_ms: AtomicU64::new(0),
            fallback_mode: AtomicBool::new(false),
            calls: AtomicU32::new(0),
        }
    }

    /// Add artificial latency before each answer.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
        self
    }

    /// Answer with the local fallback instead of the scripted text,
    /// simulating a timed-out or failed service.
    #[must_use]
    pub fn with_fallback_mode(self) -> Self {
        self.fallback_mode.store(true, Ordering::Relaxed);
        self
    }

    /// Replace the scripted answer text.
    pub async fn set_text(&self, text: &str) {
        *self.text.write().await = text.to_string();
    }

    /// Number of advise calls received so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AdvisoryProvider for MockAdvisor {
    async fn advise(&self, _reading: &Reading, context: &str) -> AdvisoryOutcome {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.fallback_mode.load(Ordering::Relaxed) {
            fallback(context)
        } else {
            AdvisoryOutcome {
                text: self.text.read().await.clone(),
                source: AdvisorySource::Live,
            }
        }
    }
}
