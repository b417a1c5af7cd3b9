//! Error types for riskwatch-core.
//!
//! The advisory gateway converts every failure listed here into a local
//! fallback outcome before it reaches the controller; these variants exist
//! so the conversion site can log what actually went wrong.

use std::time::Duration;

/// Errors that can occur inside the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The advisory call exceeded its deadline.
    #[error("Advisory request timed out after {deadline:?}")]
    AdvisoryTimeout {
        /// The configured deadline.
        deadline: Duration,
    },

    /// Transport-level failure talking to the advisory service.
    #[error("Advisory request failed: {0}")]
    AdvisoryTransport(#[from] reqwest::Error),

    /// The advisory service answered with a non-success status.
    #[error("Advisory service returned HTTP {status}")]
    AdvisoryStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The advisory response body did not match the expected shape.
    #[error("Malformed advisory response: {0}")]
    MalformedResponse(String),

    /// The advisory response carried no usable candidate text.
    #[error("Advisory response contained no candidates")]
    NoCandidates,

    /// Invalid configuration, e.g. a malformed endpoint URL.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for riskwatch-core operations.
pub type Result<T> = std::result::Result<T, Error>;
