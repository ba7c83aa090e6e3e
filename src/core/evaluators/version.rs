//! Version probes
//!
//! Resolves the version a target is running, either from an HTTP endpoint
//! or through an external workload lookup. Any failure yields `None` so a
//! broken target never disturbs the dispatcher.

use super::definitions::{HttpVersionDefinition, VersionCheckDefinition, WorkloadVersionDefinition};
use super::traits::Evaluator;
use crate::core::types::CheckIdentity;
use crate::utils::error::{AgentError, Result};
use crate::utils::net::{ClientOptions, HttpClientCache};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Resolves the version of a running workload, e.g. from container image
/// tags in the cluster API
#[async_trait]
pub trait WorkloadVersionLookup: Send + Sync {
    async fn running_version(
        &self,
        workload: &WorkloadVersionDefinition,
        cancel: CancellationToken,
    ) -> Result<Option<String>>;
}

/// Evaluates [`VersionCheckDefinition`]s
#[derive(Clone)]
pub struct VersionEvaluator {
    clients: Arc<HttpClientCache>,
    timeout: Duration,
    workloads: Option<Arc<dyn WorkloadVersionLookup>>,
}

impl VersionEvaluator {
    pub fn new(clients: Arc<HttpClientCache>, timeout: Duration) -> Self {
        Self {
            clients,
            timeout,
            workloads: None,
        }
    }

    pub fn with_workload_lookup(mut self, lookup: Arc<dyn WorkloadVersionLookup>) -> Self {
        self.workloads = Some(lookup);
        self
    }

    async fn http_version(
        &self,
        identity: &CheckIdentity,
        definition: &HttpVersionDefinition,
        cancel: CancellationToken,
    ) -> Result<Option<String>> {
        let client = match self
            .clients
            .client(ClientOptions::new(true, definition.skip_cert_validation))
        {
            Ok(client) => client,
            Err(e) => {
                warn!(check = %identity, "Failed to build HTTP client: {}", e);
                return Ok(None);
            }
        };

        let mut request = client.get(&definition.url).timeout(self.timeout);
        if let Some(authorization) = &definition.authorization_header {
            request = request.header(AUTHORIZATION, authorization);
        }

        let fetched = async {
            let response = request.send().await?.error_for_status()?;
            if let Some(header) = &definition.header {
                let value = response
                    .headers()
                    .get(header.as_str())
                    .and_then(|value| value.to_str().ok())
                    .map(|value| value.trim().to_string());
                return Ok::<_, reqwest::Error>(value);
            }
            let body = response.text().await?;
            Ok(extract_version(&body, definition.json_pointer.as_deref()))
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            outcome = fetched => outcome,
        };

        match outcome {
            Ok(version) => {
                debug!(check = %identity, ?version, "Version resolved");
                Ok(version)
            }
            Err(e) => {
                info!(check = %identity, "Version probe failed: {}", e);
                Ok(None)
            }
        }
    }

    async fn workload_version(
        &self,
        identity: &CheckIdentity,
        definition: &WorkloadVersionDefinition,
        cancel: CancellationToken,
    ) -> Result<Option<String>> {
        let Some(lookup) = &self.workloads else {
            warn!(check = %identity, "No workload lookup configured for version check");
            return Ok(None);
        };

        match lookup.running_version(definition, cancel).await {
            Ok(version) => Ok(version),
            Err(AgentError::Cancelled) => Err(AgentError::Cancelled),
            Err(e) => {
                info!(
                    check = %identity,
                    namespace = %definition.namespace,
                    workload = %definition.name,
                    "Workload version lookup failed: {}",
                    e
                );
                Ok(None)
            }
        }
    }
}

/// Pull a version out of a response body. With a JSON pointer the pointed-to
/// string or number is used; otherwise the trimmed body.
pub fn extract_version(body: &str, json_pointer: Option<&str>) -> Option<String> {
    match json_pointer {
        Some(pointer) => {
            let document: serde_json::Value = serde_json::from_str(body).ok()?;
            match document.pointer(pointer)? {
                serde_json::Value::String(version) => Some(version.trim().to_string()),
                serde_json::Value::Number(version) => Some(version.to_string()),
                _ => None,
            }
        }
        None => {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
    .filter(|version| !version.is_empty())
}

#[async_trait]
impl Evaluator for VersionEvaluator {
    type Definition = VersionCheckDefinition;
    type Output = Option<String>;

    async fn evaluate(
        &self,
        identity: &CheckIdentity,
        definition: &VersionCheckDefinition,
        cancel: CancellationToken,
    ) -> Result<Option<String>> {
        match definition {
            VersionCheckDefinition::Http(http) => self.http_version(identity, http, cancel).await,
            VersionCheckDefinition::Workload(workload) => {
                self.workload_version(identity, workload, cancel).await
            }
        }
    }
}
