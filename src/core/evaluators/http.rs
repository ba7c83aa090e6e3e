//! HTTP condition evaluator
//!
//! Sends one GET and grades the response. Status-code conditions are
//! applied in declared order and the last one that matches sets the
//! verdict; this is intentionally not the most severe match. Response-time
//! conditions can then only make the verdict worse.

use super::definitions::{HttpCheckDefinition, HttpCondition};
use super::traits::Evaluator;
use crate::core::types::{CheckIdentity, HealthStatus};
use crate::utils::error::{AgentError, Result};
use crate::utils::net::{ClientOptions, HttpClientCache};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Evaluates [`HttpCheckDefinition`]s
#[derive(Debug, Clone)]
pub struct HttpEvaluator {
    clients: Arc<HttpClientCache>,
    timeout: Duration,
}

impl HttpEvaluator {
    /// `timeout` bounds each probe; the agent derives it from the polling
    /// interval
    pub fn new(clients: Arc<HttpClientCache>, timeout: Duration) -> Self {
        Self { clients, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn evaluate_http(
        &self,
        identity: &CheckIdentity,
        definition: &HttpCheckDefinition,
        cancel: CancellationToken,
    ) -> Result<HealthStatus> {
        let url = match Url::parse(&definition.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(check = %identity, url = %definition.url, "Invalid check URL: {}", e);
                return Ok(HealthStatus::Unknown);
            }
        };

        let options = ClientOptions::new(
            definition.follows_redirects(),
            definition.skip_cert_validation,
        );
        let client = match self.clients.client(options) {
            Ok(client) => client,
            Err(e) => {
                warn!(check = %identity, "Failed to build HTTP client: {}", e);
                return Ok(HealthStatus::Unknown);
            }
        };

        let mut request = client.get(url).timeout(self.timeout);
        if let Some(authorization) = &definition.authorization_header {
            request = request.header(AUTHORIZATION, authorization);
        }

        let started = Instant::now();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            response = request.send() => response,
        };
        let latency = started.elapsed();

        match response {
            Ok(response) => {
                let code = response.status().as_u16();
                let status = evaluate_response(definition, code, latency);
                debug!(
                    check = %identity,
                    code,
                    latency_ms = latency.as_millis() as u64,
                    %status,
                    "HTTP check evaluated"
                );
                Ok(status)
            }
            Err(e) if e.is_timeout() => {
                info!(
                    check = %identity,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "HTTP check timed out"
                );
                Ok(HealthStatus::Offline)
            }
            Err(e) if e.is_builder() => {
                warn!(check = %identity, "HTTP check is misconfigured: {}", e);
                Ok(HealthStatus::Unknown)
            }
            Err(e) => {
                info!(check = %identity, "HTTP check failed: {}", e);
                Ok(HealthStatus::Offline)
            }
        }
    }
}

/// Grade an observed response against the definition's conditions
pub fn evaluate_response(
    definition: &HttpCheckDefinition,
    code: u16,
    latency: Duration,
) -> HealthStatus {
    let default_condition = HttpCondition::default_status_code();
    let declared: Vec<&HttpCondition> = definition
        .conditions
        .iter()
        .filter(|condition| matches!(condition, HttpCondition::StatusCode { .. }))
        .collect();
    let status_conditions = if declared.is_empty() {
        vec![&default_condition]
    } else {
        declared
    };

    let mut verdict = None;
    for condition in status_conditions {
        if let HttpCondition::StatusCode { codes, status } = condition {
            if codes.contains(&code) {
                verdict = Some(*status);
            }
        }
    }

    let Some(mut verdict) = verdict else {
        return HealthStatus::Offline;
    };

    let latency_ms = latency.as_millis();
    for condition in &definition.conditions {
        if let HttpCondition::ResponseTime {
            threshold_ms,
            status,
        } = condition
        {
            if latency_ms > u128::from(*threshold_ms) && status.is_worse_than(verdict) {
                verdict = *status;
            }
        }
    }

    verdict
}

#[async_trait]
impl Evaluator for HttpEvaluator {
    type Definition = HttpCheckDefinition;
    type Output = HealthStatus;

    async fn evaluate(
        &self,
        identity: &CheckIdentity,
        definition: &HttpCheckDefinition,
        cancel: CancellationToken,
    ) -> Result<HealthStatus> {
        self.evaluate_http(identity, definition, cancel).await
    }
}
