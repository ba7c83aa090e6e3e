//! Metric query layer
//!
//! # Module Structure
//!
//! - `traits` - The range query contract used by metric evaluators
//! - `envelope` - Response envelope shared by Prometheus and Loki
//! - `client` - HTTP range query clients
//! - `caching` - Incremental per-check cache decorator
//! - `reporting` - Decorator forwarding fetched samples to the central API
//!
//! The agent stacks them as `caching -> reporting -> client`, so only the
//! newly fetched tail of each window is reported.

pub mod caching;
pub mod client;
pub mod envelope;
pub mod reporting;
pub mod traits;

#[cfg(test)]
mod tests;

pub use caching::CachingMetricQuery;
pub use client::RangeQueryClient;
pub use envelope::{RangeResponse, decode_series};
pub use reporting::ReportingMetricQuery;
pub use traits::MetricQuery;
