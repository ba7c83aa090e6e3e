//! Metric backend configuration

use super::*;
use crate::core::evaluators::MetricSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configured metric backends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default)]
    pub prometheus: Option<BackendConfig>,
    #[serde(default)]
    pub loki: Option<BackendConfig>,
}

impl BackendsConfig {
    pub fn get(&self, source: MetricSource) -> Option<&BackendConfig> {
        match source {
            MetricSource::Prometheus => self.prometheus.as_ref(),
            MetricSource::Loki => self.loki.as_ref(),
        }
    }

    /// Configured backends with their source
    pub fn configured(&self) -> impl Iterator<Item = (MetricSource, &BackendConfig)> {
        [
            (MetricSource::Prometheus, self.prometheus.as_ref()),
            (MetricSource::Loki, self.loki.as_ref()),
        ]
        .into_iter()
        .filter_map(|(source, backend)| backend.map(|backend| (source, backend)))
    }
}

/// A range query endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://prometheus:9090`
    pub url: String,
    /// Range query resolution in seconds
    #[serde(default = "default_step")]
    pub step: u64,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout: u64,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            step: default_step(),
            timeout: default_backend_timeout(),
        }
    }

    pub fn step(&self) -> Duration {
        Duration::from_secs(self.step)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
