//! Central API reporting configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where fetched check data is reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Central API base URL
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_reporting_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            timeout: default_reporting_timeout(),
            bearer_token: None,
        }
    }
}

impl ReportingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
