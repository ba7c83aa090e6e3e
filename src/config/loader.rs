//! Environment overrides
//!
//! Deployment-specific values can be set through `VIGIL_*` environment
//! variables on top of the configuration file.

use super::Config;
use super::models::*;
use crate::utils::error::{AgentError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

pub const ENV_ENVIRONMENT: &str = "VIGIL_ENVIRONMENT";
pub const ENV_MAX_CONCURRENCY: &str = "VIGIL_MAX_CONCURRENCY";
pub const ENV_VERSION_MAX_CONCURRENCY: &str = "VIGIL_VERSION_MAX_CONCURRENCY";
pub const ENV_POLLING_INTERVAL: &str = "VIGIL_POLLING_INTERVAL";
pub const ENV_PROMETHEUS_URL: &str = "VIGIL_PROMETHEUS_URL";
pub const ENV_LOKI_URL: &str = "VIGIL_LOKI_URL";
pub const ENV_API_URL: &str = "VIGIL_API_URL";

impl Config {
    /// Apply `VIGIL_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(environment) = lookup(ENV_ENVIRONMENT) {
            debug!("Overriding environment from {}", ENV_ENVIRONMENT);
            self.agent.environment = environment;
        }
        if let Some(value) = lookup(ENV_MAX_CONCURRENCY) {
            self.agent.max_concurrency = parse_override(ENV_MAX_CONCURRENCY, &value)?;
        }
        if let Some(value) = lookup(ENV_VERSION_MAX_CONCURRENCY) {
            self.agent.version_max_concurrency =
                parse_override(ENV_VERSION_MAX_CONCURRENCY, &value)?;
        }
        if let Some(value) = lookup(ENV_POLLING_INTERVAL) {
            self.agent.polling_interval = parse_override(ENV_POLLING_INTERVAL, &value)?;
        }

        if let Some(url) = lookup(ENV_PROMETHEUS_URL) {
            override_backend(&mut self.backends.prometheus, url);
        }
        if let Some(url) = lookup(ENV_LOKI_URL) {
            override_backend(&mut self.backends.loki, url);
        }

        if let Some(url) = lookup(ENV_API_URL) {
            self.reporting.url = Some(url);
            self.reporting.enabled = true;
        }

        Ok(())
    }
}

fn override_backend(backend: &mut Option<BackendConfig>, url: String) {
    match backend {
        Some(backend) => backend.url = url,
        None => *backend = Some(BackendConfig::new(url)),
    }
}

fn parse_override<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AgentError::Config(format!("Invalid {}: {}", key, e)))
}
