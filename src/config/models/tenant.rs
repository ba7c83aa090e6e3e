//! Tenant, service and check configuration

use crate::core::evaluators::{HealthCheckDefinition, VersionCheckDefinition};
use crate::core::types::CheckIdentity;
use serde::{Deserialize, Serialize};

/// A tenant and the services monitored on its behalf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub name: String,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default)]
    pub health_checks: Vec<HealthCheckConfig>,
    #[serde(default)]
    pub version_checks: Vec<VersionCheckConfig>,
}

/// Named health check; the definition is selected by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    pub name: String,
    #[serde(flatten)]
    pub definition: HealthCheckDefinition,
}

/// Named version check; the definition is selected by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionCheckConfig {
    pub name: String,
    #[serde(flatten)]
    pub definition: VersionCheckDefinition,
}

impl TenantConfig {
    /// Every health check of this tenant with its identity
    pub fn health_checks<'a>(
        &'a self,
        environment: &'a str,
    ) -> impl Iterator<Item = (CheckIdentity, &'a HealthCheckDefinition)> + 'a {
        self.services.iter().flat_map(move |service| {
            service.health_checks.iter().map(move |check| {
                (
                    CheckIdentity::new(environment, &self.name, &service.name, &check.name),
                    &check.definition,
                )
            })
        })
    }

    /// Every version check of this tenant with its identity
    pub fn version_checks<'a>(
        &'a self,
        environment: &'a str,
    ) -> impl Iterator<Item = (CheckIdentity, &'a VersionCheckDefinition)> + 'a {
        self.services.iter().flat_map(move |service| {
            service.version_checks.iter().map(move |check| {
                (
                    CheckIdentity::new(environment, &self.name, &service.name, &check.name),
                    &check.definition,
                )
            })
        })
    }
}
