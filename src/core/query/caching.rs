//! Incremental range query cache
//!
//! Consecutive evaluations of a check ask for overlapping windows. The
//! cache keeps the last series per check and only fetches the tail that is
//! newer than what it already holds.

use super::traits::MetricQuery;
use crate::core::types::{CheckIdentity, SampleSeries};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Decorator that caches one series per check identity
pub struct CachingMetricQuery {
    inner: Arc<dyn MetricQuery>,
    cache: Mutex<HashMap<CheckIdentity, SampleSeries>>,
}

impl CachingMetricQuery {
    pub fn new(inner: Arc<dyn MetricQuery>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of checks with cached samples
    pub fn cached_checks(&self) -> usize {
        self.cache.lock().len()
    }

    /// Copy of the cached series for `identity`
    pub fn cached(&self, identity: &CheckIdentity) -> Option<SampleSeries> {
        self.cache.lock().get(identity).cloned()
    }

    /// Forget everything cached for checks owned by `tenant`
    pub fn evict_tenant(&self, tenant: &str) -> usize {
        let mut cache = self.cache.lock();
        let before = cache.len();
        cache.retain(|identity, _| identity.tenant != tenant);
        before - cache.len()
    }
}

#[async_trait]
impl MetricQuery for CachingMetricQuery {
    async fn query_range(
        &self,
        identity: &CheckIdentity,
        expression: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: CancellationToken,
    ) -> Result<Option<SampleSeries>> {
        let cached_until = self
            .cache
            .lock()
            .get(identity)
            .and_then(SampleSeries::last_timestamp);
        let fetch_start = cached_until.map_or(start, |last| last.max(start));

        let Some(batch) = self
            .inner
            .query_range(identity, expression, fetch_start, end, cancel)
            .await?
        else {
            return Ok(None);
        };

        let fetched = batch.len();
        let mut cache = self.cache.lock();
        let series = cache.entry(identity.clone()).or_default();
        series.trim_before(start);
        series.splice_tail(batch);

        debug!(
            check = %identity,
            fetched,
            cached = series.len(),
            incremental = fetch_start > start,
            "Range query cache updated"
        );
        Ok(Some(series.clone()))
    }
}
