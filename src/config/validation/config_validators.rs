//! Configuration section validators

use super::Validate;
use crate::config::models::*;
use crate::core::dispatch::MAX_CAPACITY;
use crate::core::evaluators::HealthCheckDefinition;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Require an absolute `http` or `https` URL
pub fn validate_url(field: &str, value: &str) -> Result<(), String> {
    let url = Url::parse(value)
        .map_err(|e| format!("{} '{}' is not a valid URL: {}", field, value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "{} '{}' must use http or https, not {}",
            field, value, scheme
        )),
    }
}

impl Validate for AgentConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating agent configuration");

        if self.environment.trim().is_empty() {
            return Err("Environment cannot be empty".to_string());
        }

        if self.polling_interval == 0 {
            return Err("Polling interval must be greater than 0".to_string());
        }

        if self.max_concurrency == 0 {
            return Err("Max concurrency must be greater than 0".to_string());
        }

        if self.max_concurrency > MAX_CAPACITY {
            return Err(format!("Max concurrency cannot exceed {}", MAX_CAPACITY));
        }

        if self.version_max_concurrency == 0 {
            return Err("Version max concurrency must be greater than 0".to_string());
        }

        if self.version_max_concurrency > MAX_CAPACITY {
            return Err(format!("Version max concurrency cannot exceed {}", MAX_CAPACITY));
        }

        if self.probe_timeout == Some(0) {
            return Err("Probe timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for BackendConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("Backend URL", &self.url)?;

        if self.step == 0 {
            return Err("Backend step must be greater than 0".to_string());
        }

        if self.timeout == 0 {
            return Err("Backend timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for BackendsConfig {
    fn validate(&self) -> Result<(), String> {
        for (source, backend) in self.configured() {
            backend
                .validate()
                .map_err(|e| format!("{} backend: {}", source, e))?;
        }
        Ok(())
    }
}

impl Validate for ReportingConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        let Some(url) = &self.url else {
            return Err("Reporting is enabled but no API URL is configured".to_string());
        };
        validate_url("API URL", url)?;

        if self.timeout == 0 {
            return Err("Reporting timeout must be greater than 0".to_string());
        }

        if matches!(&self.bearer_token, Some(token) if token.trim().is_empty()) {
            return Err("Bearer token cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Service name cannot be empty".to_string());
        }

        let mut health_names = HashSet::new();
        for check in &self.health_checks {
            if check.name.trim().is_empty() {
                return Err(format!("Health check in service {} has no name", self.name));
            }
            if !health_names.insert(check.name.as_str()) {
                return Err(format!(
                    "Duplicate health check name in service {}: {}",
                    self.name, check.name
                ));
            }
            if let HealthCheckDefinition::Metric(metric) = &check.definition {
                if metric.expression.trim().is_empty() {
                    return Err(format!("Metric check {} has an empty expression", check.name));
                }
                if metric.duration == 0 {
                    return Err(format!(
                        "Metric check {} must have a non-zero duration",
                        check.name
                    ));
                }
            }
        }

        let mut version_names = HashSet::new();
        for check in &self.version_checks {
            if check.name.trim().is_empty() {
                return Err(format!("Version check in service {} has no name", self.name));
            }
            if !version_names.insert(check.name.as_str()) {
                return Err(format!(
                    "Duplicate version check name in service {}: {}",
                    self.name, check.name
                ));
            }
        }

        Ok(())
    }
}

impl Validate for TenantConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Tenant name cannot be empty".to_string());
        }

        let mut service_names = HashSet::new();
        for service in &self.services {
            if !service_names.insert(service.name.as_str()) {
                return Err(format!(
                    "Duplicate service name in tenant {}: {}",
                    self.name, service.name
                ));
            }
            service
                .validate()
                .map_err(|e| format!("Tenant {}: {}", self.name, e))?;
        }

        Ok(())
    }
}

/// Metric checks may only reference configured backends
pub(crate) fn validate_metric_sources(
    tenants: &[TenantConfig],
    backends: &BackendsConfig,
) -> Result<(), String> {
    for tenant in tenants {
        for service in &tenant.services {
            for check in &service.health_checks {
                if let HealthCheckDefinition::Metric(metric) = &check.definition {
                    if backends.get(metric.source).is_none() {
                        return Err(format!(
                            "Metric check {}/{}/{} queries an unconfigured backend: {}",
                            tenant.name, service.name, check.name, metric.source
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Tenant names must be unique
pub(crate) fn validate_tenants(tenants: &[TenantConfig]) -> Result<(), String> {
    let mut names = HashSet::new();
    for tenant in tenants {
        if !names.insert(tenant.name.as_str()) {
            return Err(format!("Duplicate tenant name: {}", tenant.name));
        }
        tenant.validate()?;
    }
    Ok(())
}
