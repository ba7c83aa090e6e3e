//! Metric query contract

use crate::core::types::{CheckIdentity, SampleSeries};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Range query over a metric backend.
///
/// `Ok(None)` means the data is unavailable: the backend could not be
/// reached or answered with something other than exactly one non-empty
/// series. Errors are reserved for cancellation and for sample values that
/// cannot be parsed.
#[async_trait]
pub trait MetricQuery: Send + Sync {
    async fn query_range(
        &self,
        identity: &CheckIdentity,
        expression: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: CancellationToken,
    ) -> Result<Option<SampleSeries>>;
}
