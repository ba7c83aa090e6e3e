//! Health evaluator covering every health check variant

use super::definitions::{HealthCheckDefinition, MetricSource};
use super::http::HttpEvaluator;
use super::metric::MetricEvaluator;
use super::traits::Evaluator;
use crate::core::types::{CheckIdentity, HealthStatus};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Routes each [`HealthCheckDefinition`] variant to its evaluator
#[derive(Clone)]
pub struct HealthEvaluator {
    http: HttpEvaluator,
    metrics: HashMap<MetricSource, MetricEvaluator>,
}

impl HealthEvaluator {
    pub fn new(http: HttpEvaluator) -> Self {
        Self {
            http,
            metrics: HashMap::new(),
        }
    }

    /// Register the evaluator used for metric checks against `source`
    pub fn with_metric_source(mut self, source: MetricSource, evaluator: MetricEvaluator) -> Self {
        self.metrics.insert(source, evaluator);
        self
    }

    pub fn has_metric_source(&self, source: MetricSource) -> bool {
        self.metrics.contains_key(&source)
    }
}

#[async_trait]
impl Evaluator for HealthEvaluator {
    type Definition = HealthCheckDefinition;
    type Output = HealthStatus;

    async fn evaluate(
        &self,
        identity: &CheckIdentity,
        definition: &HealthCheckDefinition,
        cancel: CancellationToken,
    ) -> Result<HealthStatus> {
        match definition {
            HealthCheckDefinition::Http(http) => {
                self.http.evaluate_http(identity, http, cancel).await
            }
            HealthCheckDefinition::Metric(metric) => match self.metrics.get(&metric.source) {
                Some(evaluator) => evaluator.evaluate_metric(identity, metric, cancel).await,
                None => {
                    warn!(
                        check = %identity,
                        source = %metric.source,
                        "No metric backend configured"
                    );
                    Ok(HealthStatus::Unknown)
                }
            },
        }
    }
}
