//! Configuration management for the agent
//!
//! This module handles loading, validation, and management of all agent configuration.

pub mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Scheduling and concurrency
    #[serde(default)]
    pub agent: AgentConfig,
    /// Metric backends
    #[serde(default)]
    pub backends: BackendsConfig,
    /// Check data reporting
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Monitored tenants
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

impl Config {
    /// Load configuration from file, apply environment overrides and validate
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AgentError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::parse_yaml(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;

        debug!(
            tenants = config.tenants.len(),
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Parse configuration from YAML without overrides or validation
    pub fn parse_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AgentError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Tenant by name
    pub fn tenant(&self, name: &str) -> Option<&TenantConfig> {
        self.tenants.iter().find(|tenant| tenant.name == name)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.agent
            .validate()
            .map_err(|e| AgentError::Config(format!("Agent config error: {}", e)))?;

        self.backends
            .validate()
            .map_err(|e| AgentError::Config(format!("Backend config error: {}", e)))?;

        self.reporting
            .validate()
            .map_err(|e| AgentError::Config(format!("Reporting config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| AgentError::Config(format!("Logging config error: {}", e)))?;

        validation::validate_tenants(&self.tenants)
            .map_err(|e| AgentError::Config(format!("Tenant config error: {}", e)))?;

        validation::validate_metric_sources(&self.tenants, &self.backends)
            .map_err(|e| AgentError::Config(format!("Tenant config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AgentError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
