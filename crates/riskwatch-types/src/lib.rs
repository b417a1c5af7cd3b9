//! Platform-agnostic types for the riskwatch environmental-hazard monitor.
//!
//! This crate defines the data model shared by the alarm engine and the
//! monitoring service:
//!
//! - [`Reading`]: one timestamped sample of the monitored quantities
//! - [`HazardLevel`]: discrete risk classification (Normal/Trending/Critical)
//! - [`AlarmState`]: the presentation-facing alarm snapshot
//! - [`AdvisoryOutcome`]: the result of an advisory request (live or fallback)
//! - [`HourlyAverage`]: one row of the hourly-aggregate feed
//!
//! All types are `serde`-serializable behind the default-on `serde` feature.

pub mod types;

pub use types::{
    AdvisoryOutcome, AdvisorySource, AlarmState, HazardLevel, HourlyAverage, Reading,
    ReadingBuilder,
};
