//! Trait seams for the alarm engine.

use async_trait::async_trait;

use riskwatch_types::{AdvisoryOutcome, Reading};

/// Source of human-readable advisories for a detected trend.
///
/// Implementations never error past this boundary: every failure mode is
/// converted to a fallback outcome so the caller always receives
/// displayable text. The controller enforces the single-flight guarantee;
/// implementations must be stateless and reentrant.
///
/// Implemented by [`AdvisoryClient`](crate::AdvisoryClient) (live HTTP),
/// [`FallbackAdvisor`](crate::FallbackAdvisor) (offline deployments), and
/// [`MockAdvisor`](crate::MockAdvisor) (tests).
#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    /// Request an advisory for the triggering reading and context text.
    async fn advise(&self, reading: &Reading, context: &str) -> AdvisoryOutcome;
}
