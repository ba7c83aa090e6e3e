//! Range query clients for Prometheus and Loki

use super::envelope::decode_series;
use super::traits::MetricQuery;
use crate::core::evaluators::MetricSource;
use crate::core::types::{CheckIdentity, SampleSeries};
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const PROMETHEUS_RANGE_PATH: &str = "/api/v1/query_range";
const LOKI_RANGE_PATH: &str = "/loki/api/v1/query_range";

/// HTTP client for one metric backend's range query API
#[derive(Debug, Clone)]
pub struct RangeQueryClient {
    source: MetricSource,
    endpoint: String,
    step: Duration,
    timeout: Duration,
    client: Arc<Client>,
}

impl RangeQueryClient {
    /// Create a client for `source` rooted at `base_url`
    pub fn new(
        source: MetricSource,
        base_url: &str,
        step: Duration,
        timeout: Duration,
        client: Arc<Client>,
    ) -> Self {
        let path = match source {
            MetricSource::Prometheus => PROMETHEUS_RANGE_PATH,
            MetricSource::Loki => LOKI_RANGE_PATH,
        };
        Self {
            source,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), path),
            step,
            timeout,
            client,
        }
    }

    pub fn prometheus(
        base_url: &str,
        step: Duration,
        timeout: Duration,
        client: Arc<Client>,
    ) -> Self {
        Self::new(MetricSource::Prometheus, base_url, step, timeout, client)
    }

    pub fn loki(base_url: &str, step: Duration, timeout: Duration, client: Arc<Client>) -> Self {
        Self::new(MetricSource::Loki, base_url, step, timeout, client)
    }

    pub fn source(&self) -> MetricSource {
        self.source
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(
        &self,
        identity: &CheckIdentity,
        expression: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> std::result::Result<Vec<u8>, reqwest::Error> {
        let start = start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let end = end.to_rfc3339_opts(SecondsFormat::Millis, true);
        let step = format!("{}s", self.step.as_secs().max(1));
        let response = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .query(&[
                ("query", expression),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("step", step.as_str()),
            ])
            .send()
            .await?;

        debug!(
            check = %identity,
            source = %self.source,
            code = response.status().as_u16(),
            "Range query answered"
        );
        // Error bodies still carry the envelope, so the status is judged there
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl MetricQuery for RangeQueryClient {
    async fn query_range(
        &self,
        identity: &CheckIdentity,
        expression: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: CancellationToken,
    ) -> Result<Option<SampleSeries>> {
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            body = self.fetch(identity, expression, start, end) => body,
        };

        match body {
            Ok(body) => decode_series(&body, identity),
            Err(e) => {
                info!(check = %identity, source = %self.source, "Range query failed: {}", e);
                Ok(None)
            }
        }
    }
}
