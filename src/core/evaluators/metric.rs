//! Metric threshold evaluator
//!
//! Conditions are checked in declared order and the first one satisfied by
//! every sample in the window wins. Requiring all samples keeps a single
//! noisy point from flipping the verdict.

use super::definitions::{MetricCheckDefinition, MetricCondition};
use super::traits::Evaluator;
use crate::core::query::MetricQuery;
use crate::core::types::{CheckIdentity, HealthStatus, SampleSeries};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Evaluates [`MetricCheckDefinition`]s against one query layer
#[derive(Clone)]
pub struct MetricEvaluator {
    query: Arc<dyn MetricQuery>,
}

impl MetricEvaluator {
    pub fn new(query: Arc<dyn MetricQuery>) -> Self {
        Self { query }
    }

    pub async fn evaluate_metric(
        &self,
        identity: &CheckIdentity,
        definition: &MetricCheckDefinition,
        cancel: CancellationToken,
    ) -> Result<HealthStatus> {
        let Some(window) = i64::try_from(definition.duration)
            .ok()
            .and_then(TimeDelta::try_seconds)
        else {
            warn!(check = %identity, duration = definition.duration, "Metric window out of range");
            return Ok(HealthStatus::Unknown);
        };

        let end = Utc::now();
        let start = end - window;

        let series = match self
            .query
            .query_range(identity, &definition.expression, start, end, cancel)
            .await
        {
            Ok(Some(series)) => series,
            Ok(None) => {
                info!(check = %identity, "Metric data unavailable");
                return Ok(HealthStatus::Unknown);
            }
            Err(e) if e.is_cancelled() || e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(check = %identity, "Metric query failed: {}", e);
                return Ok(HealthStatus::Unknown);
            }
        };

        if series.is_empty() {
            warn!(
                check = %identity,
                expression = %definition.expression,
                "Metric query returned no samples"
            );
            return Ok(HealthStatus::Unknown);
        }

        let status = evaluate_samples(&definition.conditions, &series);
        debug!(check = %identity, samples = series.len(), %status, "Metric check evaluated");
        Ok(status)
    }
}

/// First condition that every sample satisfies, or `Online`
pub fn evaluate_samples(conditions: &[MetricCondition], series: &SampleSeries) -> HealthStatus {
    conditions
        .iter()
        .find(|condition| {
            series
                .values()
                .all(|value| condition.operator.compare(value, condition.threshold))
        })
        .map(|condition| condition.status)
        .unwrap_or(HealthStatus::Online)
}

#[async_trait]
impl Evaluator for MetricEvaluator {
    type Definition = MetricCheckDefinition;
    type Output = HealthStatus;

    async fn evaluate(
        &self,
        identity: &CheckIdentity,
        definition: &MetricCheckDefinition,
        cancel: CancellationToken,
    ) -> Result<HealthStatus> {
        self.evaluate_metric(identity, definition, cancel).await
    }
}
