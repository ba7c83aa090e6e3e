//! Agent integration tests
//!
//! Runs a complete agent against mock targets and backends and observes the
//! verdicts it publishes.

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use crate::common::{ConfigFactory, MockPrometheus, MockReportingApi, eventually};
    use serde_json::json;
    use vigil::{Agent, CheckIdentity, HealthStatus};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/version"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "build": { "version": "2.1.0" } })),
            )
            .mount(&server)
            .await;
        server
    }

    fn identity(tenant: &str, name: &str) -> CheckIdentity {
        CheckIdentity::new("test", tenant, "web", name)
    }

    /// Every check kind publishes a verdict
    #[tokio::test]
    async fn test_agent_publishes_all_check_kinds() {
        let target = service().await;
        let prometheus = MockPrometheus::serving(&[12.0, 15.0]).await;
        let api = MockReportingApi::accepting().await;

        let mut config = ConfigFactory::with_reporting(
            ConfigFactory::with_prometheus(ConfigFactory::agent(), &prometheus.uri()),
            &api.uri(),
        );
        let mut tenant = ConfigFactory::tenant("acme");
        let checks = &mut tenant.services[0];
        checks
            .health_checks
            .push(ConfigFactory::http_check("homepage", &format!("{}/health", target.uri())));
        checks
            .health_checks
            .push(ConfigFactory::metric_check("errors", "sum(errors)", 10.0));
        checks.version_checks.push(ConfigFactory::version_check(
            "release",
            &format!("{}/version", target.uri()),
            "/build/version",
        ));
        config.tenants.push(tenant);

        let agent = assert_ok!(Agent::builder(config).build());
        let runner = agent.clone();
        let running = tokio::spawn(async move { runner.run().await });

        let board = agent.status_board();
        assert!(
            eventually(|| board.health(&identity("acme", "homepage")) == Some(HealthStatus::Online))
                .await
        );
        assert!(
            eventually(|| board.health(&identity("acme", "errors")) == Some(HealthStatus::Offline))
                .await
        );
        assert!(
            eventually(|| board.version(&identity("acme", "release")).as_deref() == Some("2.1.0"))
                .await
        );
        assert_eq!(board.tenant_health("acme"), Some(HealthStatus::Offline));
        assert!(!api.reports().await.is_empty());

        agent.shutdown();
        assert_ok!(running.await.unwrap());
    }

    /// Removing a tenant stops its checks and clears its verdicts
    #[tokio::test]
    async fn test_removed_tenant_stops_polling() {
        let target = service().await;
        let mut config = ConfigFactory::agent();
        for name in ["acme", "globex"] {
            let mut tenant = ConfigFactory::tenant(name);
            tenant.services[0]
                .health_checks
                .push(ConfigFactory::http_check("homepage", &format!("{}/health", target.uri())));
            config.tenants.push(tenant);
        }

        let agent = assert_ok!(Agent::builder(config).build());
        let runner = agent.clone();
        let running = tokio::spawn(async move { runner.run().await });

        let board = agent.status_board();
        assert!(eventually(|| board.len() == 2).await);

        agent.remove_tenant("acme");
        assert_eq!(board.health(&identity("acme", "homepage")), None);

        // Two more polling rounds for the remaining tenant
        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
        assert_eq!(board.health(&identity("acme", "homepage")), None);
        assert_eq!(
            board.health(&identity("globex", "homepage")),
            Some(HealthStatus::Online)
        );

        agent.shutdown();
        assert_ok!(running.await.unwrap());
    }
}
