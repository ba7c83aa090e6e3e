//! Agent runtime configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduling and concurrency settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Environment this agent monitors, e.g. `production`
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Seconds between evaluations of each check
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,
    /// Concurrent health check evaluations
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Concurrent version check evaluations, per check kind
    #[serde(default = "default_version_max_concurrency")]
    pub version_max_concurrency: usize,
    /// Seconds between configuration reloads; 0 disables reloading
    #[serde(default = "default_reload_interval")]
    pub reload_interval: u64,
    /// Per-probe timeout in seconds; defaults to the polling interval
    #[serde(default)]
    pub probe_timeout: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            polling_interval: default_polling_interval(),
            max_concurrency: default_max_concurrency(),
            version_max_concurrency: default_version_max_concurrency(),
            reload_interval: default_reload_interval(),
            probe_timeout: None,
        }
    }
}

impl AgentConfig {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    /// `None` when reloading is disabled
    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval > 0).then(|| Duration::from_secs(self.reload_interval))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout.unwrap_or(self.polling_interval))
    }
}
