//! Configuration loading integration tests
//!
//! Loads the shipped example configuration and checks that invalid
//! configurations are rejected with a useful message.

#[cfg(test)]
mod tests {
    use crate::common::ConfigFactory;
    use crate::{assert_err, assert_ok};
    use std::io::Write;
    use tempfile::NamedTempFile;
    use vigil::config::{BackendsConfig, Config};
    use vigil::core::evaluators::{
        ComparisonOperator, HealthCheckDefinition, HttpCondition, MetricSource,
        VersionCheckDefinition,
    };
    use vigil::{AgentError, HealthStatus};

    const EXAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/agent.yaml.example");

    /// The shipped example parses and validates
    #[tokio::test]
    async fn test_example_config_loads() {
        let config = assert_ok!(Config::from_file(EXAMPLE).await);

        assert_eq!(config.agent.max_concurrency, 16);
        assert_eq!(config.agent.version_max_concurrency, 4);
        assert!(config.backends.get(MetricSource::Loki).is_some());
        assert!(config.reporting.enabled);

        let tenant = config.tenant("acme").unwrap();
        let checks: Vec<_> = tenant.health_checks("production").collect();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].0.path(), "production/acme/storefront/homepage");

        match checks[0].1 {
            HealthCheckDefinition::Http(http) => {
                assert_eq!(http.conditions.len(), 3);
                assert_eq!(
                    http.conditions[1],
                    HttpCondition::status_code([502, 503, 504], HealthStatus::Offline)
                );
            }
            other => panic!("Expected http check, got {:?}", other),
        }
        match checks[1].1 {
            HealthCheckDefinition::Metric(metric) => {
                assert_eq!(metric.duration, 300);
                assert_eq!(metric.conditions[0].operator, ComparisonOperator::GreaterThan);
                assert_eq!(metric.conditions[1].status, HealthStatus::AtRisk);
            }
            other => panic!("Expected metric check, got {:?}", other),
        }

        let versions: Vec<_> = tenant.version_checks("production").collect();
        assert_eq!(versions.len(), 2);
        assert!(matches!(versions[1].1, VersionCheckDefinition::Workload(_)));
    }

    /// Saved configuration reloads to the same value
    #[tokio::test]
    async fn test_saved_config_reloads() {
        let mut config = ConfigFactory::with_prometheus(ConfigFactory::agent(), "http://prom:9090");
        let mut tenant = ConfigFactory::tenant("acme");
        tenant.services[0]
            .health_checks
            .push(ConfigFactory::metric_check("errors", "sum(errors)", 3.0));
        tenant.services[0]
            .version_checks
            .push(ConfigFactory::version_check("release", "http://web/version", "/version"));
        config.tenants.push(tenant);

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(config.to_yaml().unwrap().as_bytes()).unwrap();

        let loaded = assert_ok!(Config::from_file(file.path()).await);
        assert_eq!(loaded, config);
    }

    /// Metric checks must point at a configured backend
    #[test]
    fn test_metric_check_without_backend_rejected() {
        let mut config = ConfigFactory::agent();
        config.backends = BackendsConfig::default();
        let mut tenant = ConfigFactory::tenant("acme");
        tenant.services[0]
            .health_checks
            .push(ConfigFactory::metric_check("errors", "sum(errors)", 3.0));
        config.tenants.push(tenant);

        let error = assert_err!(config.validate());
        assert!(matches!(error, AgentError::Config(_)));
        assert!(error.to_string().contains("unconfigured backend"));
    }

    /// Duplicate tenants are rejected
    #[test]
    fn test_duplicate_tenant_rejected() {
        let mut config = ConfigFactory::agent();
        config.tenants.push(ConfigFactory::tenant("acme"));
        config.tenants.push(ConfigFactory::tenant("acme"));

        let error = assert_err!(config.validate());
        assert!(error.to_string().contains("acme"));
    }

    /// Unknown operators fail when the file is read
    #[tokio::test]
    async fn test_unknown_operator_fails_loading() {
        let yaml = r#"
backends:
  prometheus:
    url: http://prom:9090
tenants:
  - name: acme
    services:
      - name: web
        health_checks:
          - name: errors
            type: metric
            expression: sum(errors)
            duration: 60
            conditions:
              - operator: "=~"
                threshold: 1
                status: offline
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        assert!(Config::from_file(file.path()).await.is_err());
    }

    /// A missing file is a configuration error
    #[tokio::test]
    async fn test_missing_file() {
        let error = assert_err!(Config::from_file("/nonexistent/vigil.yaml").await);
        assert!(matches!(error, AgentError::Config(_)));
    }
}
