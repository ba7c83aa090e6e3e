//! Central API client
//!
//! Posts check data as JSON. Delivery is best effort: a failed post is
//! reported to the caller and never retried here.

use super::sink::{CheckDataReport, CheckDataSink};
use crate::core::types::SampleSeries;
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const CHECK_DATA_PATH: &str = "/v1/check-data";

/// [`CheckDataSink`] backed by the central API
#[derive(Debug, Clone)]
pub struct ApiClient {
    endpoint: String,
    timeout: Duration,
    bearer_token: Option<String>,
    client: Arc<Client>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, client: Arc<Client>) -> Self {
        Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CHECK_DATA_PATH),
            timeout,
            bearer_token: None,
            client,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, report: &CheckDataReport) -> Result<()> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(report);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::reporting(format!("failed to post check data: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::reporting(format!(
                "API rejected check data with {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CheckDataSink for ApiClient {
    async fn record_check_data(
        &self,
        environment: &str,
        tenant: &str,
        service: &str,
        data: HashMap<String, SampleSeries>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let report = CheckDataReport {
            environment: environment.to_string(),
            tenant: tenant.to_string(),
            service: service.to_string(),
            checks: data,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            outcome = self.post(&report) => {
                if outcome.is_ok() {
                    debug!(tenant, service, checks = report.checks.len(), "Check data reported");
                }
                outcome
            }
        }
    }
}
