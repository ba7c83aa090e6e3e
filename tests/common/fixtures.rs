//! Configuration fixtures

use std::time::Duration;
use vigil::config::{
    AgentConfig, BackendConfig, Config, HealthCheckConfig, ReportingConfig, ServiceConfig,
    TenantConfig, VersionCheckConfig,
};
use vigil::core::evaluators::{
    ComparisonOperator, HealthCheckDefinition, HttpCheckDefinition, HttpVersionDefinition,
    MetricCheckDefinition, MetricCondition, MetricSource, VersionCheckDefinition,
};
use vigil::HealthStatus;

/// Builds agent configurations for tests
pub struct ConfigFactory;

impl ConfigFactory {
    /// Config with a one second polling interval and no tenants
    pub fn agent() -> Config {
        Config {
            agent: AgentConfig {
                environment: "test".to_string(),
                polling_interval: 1,
                max_concurrency: 4,
                version_max_concurrency: 2,
                reload_interval: 0,
                probe_timeout: Some(2),
            },
            ..Config::default()
        }
    }

    /// Add a Prometheus backend at `url`
    pub fn with_prometheus(mut config: Config, url: &str) -> Config {
        config.backends.prometheus = Some(BackendConfig::new(url));
        config
    }

    /// Enable reporting to `url`
    pub fn with_reporting(mut config: Config, url: &str) -> Config {
        config.reporting = ReportingConfig {
            enabled: true,
            url: Some(url.to_string()),
            timeout: 5,
            bearer_token: Some("test-token".to_string()),
        };
        config
    }

    /// Tenant with a single `web` service and no checks
    pub fn tenant(name: &str) -> TenantConfig {
        TenantConfig {
            name: name.to_string(),
            services: vec![ServiceConfig {
                name: "web".to_string(),
                health_checks: Vec::new(),
                version_checks: Vec::new(),
            }],
        }
    }

    pub fn http_check(name: &str, url: &str) -> HealthCheckConfig {
        HealthCheckConfig {
            name: name.to_string(),
            definition: HealthCheckDefinition::Http(HttpCheckDefinition::new(url)),
        }
    }

    /// Metric check that goes offline when every sample exceeds `threshold`
    pub fn metric_check(name: &str, expression: &str, threshold: f64) -> HealthCheckConfig {
        HealthCheckConfig {
            name: name.to_string(),
            definition: HealthCheckDefinition::Metric(MetricCheckDefinition {
                source: MetricSource::Prometheus,
                expression: expression.to_string(),
                duration: 300,
                conditions: vec![MetricCondition::new(
                    ComparisonOperator::GreaterThan,
                    threshold,
                    HealthStatus::Offline,
                )],
            }),
        }
    }

    pub fn version_check(name: &str, url: &str, json_pointer: &str) -> VersionCheckConfig {
        VersionCheckConfig {
            name: name.to_string(),
            definition: VersionCheckDefinition::Http(HttpVersionDefinition {
                url: url.to_string(),
                json_pointer: Some(json_pointer.to_string()),
                header: None,
                skip_cert_validation: false,
                authorization_header: None,
            }),
        }
    }
}

/// Poll `condition` every 50ms for up to five seconds
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}
