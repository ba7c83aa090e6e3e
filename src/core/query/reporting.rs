//! Forwards fetched samples to a [`CheckDataSink`]

use super::traits::MetricQuery;
use crate::core::reporting::CheckDataSink;
use crate::core::types::{CheckIdentity, SampleSeries};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Decorator that reports every fetched series. Reporting outcomes never
/// change what the inner query returned.
pub struct ReportingMetricQuery {
    inner: Arc<dyn MetricQuery>,
    sink: Arc<dyn CheckDataSink>,
}

impl ReportingMetricQuery {
    pub fn new(inner: Arc<dyn MetricQuery>, sink: Arc<dyn CheckDataSink>) -> Self {
        Self { inner, sink }
    }
}

#[async_trait]
impl MetricQuery for ReportingMetricQuery {
    async fn query_range(
        &self,
        identity: &CheckIdentity,
        expression: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: CancellationToken,
    ) -> Result<Option<SampleSeries>> {
        let result = self
            .inner
            .query_range(identity, expression, start, end, cancel.clone())
            .await;

        if let Ok(Some(series)) = &result {
            let data = HashMap::from([(identity.name.clone(), series.clone())]);
            match self
                .sink
                .record_check_data(
                    &identity.environment,
                    &identity.tenant,
                    &identity.service,
                    data,
                    cancel,
                )
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {
                    debug!(check = %identity, "Check data reporting cancelled");
                }
                Err(e) => {
                    warn!(check = %identity, "Failed to report check data: {}", e);
                }
            }
        }

        result
    }
}
