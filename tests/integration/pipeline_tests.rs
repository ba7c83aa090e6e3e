//! Metric pipeline integration tests
//!
//! Wires a range query client, the reporting decorator and the cache the
//! way the agent does, against mock Prometheus and reporting servers.

#[cfg(test)]
mod tests {
    use crate::common::{ConfigFactory, MockPrometheus, MockReportingApi};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use vigil::core::evaluators::{HealthCheckDefinition, MetricEvaluator};
    use vigil::core::query::{
        CachingMetricQuery, MetricQuery, RangeQueryClient, ReportingMetricQuery,
    };
    use vigil::core::reporting::ApiClient;
    use vigil::utils::{ClientOptions, HttpClientCache};
    use vigil::{CheckIdentity, HealthStatus};

    struct Pipeline {
        cache: Arc<CachingMetricQuery>,
        evaluator: MetricEvaluator,
    }

    fn pipeline(prometheus: &str, api: &str) -> Pipeline {
        let client = HttpClientCache::default()
            .client(ClientOptions::new(true, false))
            .unwrap();
        let sink = Arc::new(
            ApiClient::new(api, Duration::from_secs(5), client.clone()).with_bearer_token("token"),
        );
        let query: Arc<dyn MetricQuery> = Arc::new(RangeQueryClient::prometheus(
            prometheus,
            Duration::from_secs(15),
            Duration::from_secs(5),
            client,
        ));
        let reporting: Arc<dyn MetricQuery> = Arc::new(ReportingMetricQuery::new(query, sink));
        let cache = Arc::new(CachingMetricQuery::new(reporting));
        Pipeline {
            evaluator: MetricEvaluator::new(cache.clone()),
            cache,
        }
    }

    fn identity() -> CheckIdentity {
        CheckIdentity::new("test", "acme", "web", "errors")
    }

    fn definition(threshold: f64) -> vigil::core::evaluators::MetricCheckDefinition {
        match ConfigFactory::metric_check("errors", "sum(errors)", threshold).definition {
            HealthCheckDefinition::Metric(metric) => metric,
            other => panic!("Expected metric check, got {:?}", other),
        }
    }

    /// Samples above the threshold take the check offline and are reported
    #[tokio::test]
    async fn test_metric_check_evaluates_and_reports() {
        let prometheus = MockPrometheus::serving(&[7.0, 8.0, 9.5]).await;
        let api = MockReportingApi::accepting().await;
        let pipeline = pipeline(&prometheus.uri(), &api.uri());

        let status = pipeline
            .evaluator
            .evaluate_metric(&identity(), &definition(5.0), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(status, HealthStatus::Offline);

        let reports = api.reports().await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["tenant"], "acme");
        assert_eq!(reports[0]["service"], "web");
        assert_eq!(reports[0]["checks"]["errors"].as_array().unwrap().len(), 3);

        let cached = pipeline.cache.cached(&identity()).unwrap();
        assert_eq!(cached.values().collect::<Vec<_>>(), vec![7.0, 8.0, 9.5]);
    }

    /// A sample under the threshold keeps the check online
    #[tokio::test]
    async fn test_metric_check_online_when_any_sample_passes() {
        let prometheus = MockPrometheus::serving(&[7.0, 2.0, 9.5]).await;
        let api = MockReportingApi::accepting().await;
        let pipeline = pipeline(&prometheus.uri(), &api.uri());

        let status = pipeline
            .evaluator
            .evaluate_metric(&identity(), &definition(5.0), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(status, HealthStatus::Online);
    }

    /// Repeated evaluations reuse the cached window
    #[tokio::test]
    async fn test_cache_survives_repeated_evaluations() {
        let prometheus = MockPrometheus::serving(&[7.0, 8.0]).await;
        let api = MockReportingApi::accepting().await;
        let pipeline = pipeline(&prometheus.uri(), &api.uri());

        for _ in 0..3 {
            let status = pipeline
                .evaluator
                .evaluate_metric(&identity(), &definition(5.0), CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(status, HealthStatus::Offline);
        }

        assert_eq!(prometheus.query_count().await, 3);
        assert_eq!(pipeline.cache.cached_checks(), 1);
        assert_eq!(pipeline.cache.cached(&identity()).unwrap().len(), 2);
        assert_eq!(pipeline.cache.evict_tenant("acme"), 1);
        assert_eq!(pipeline.cache.cached_checks(), 0);
    }

    /// An unreachable backend yields an unknown verdict and nothing is reported
    #[tokio::test]
    async fn test_unreachable_backend_is_unknown() {
        let api = MockReportingApi::accepting().await;
        let pipeline = pipeline("http://127.0.0.1:1", &api.uri());

        let status = pipeline
            .evaluator
            .evaluate_metric(&identity(), &definition(5.0), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(status, HealthStatus::Unknown);
        assert!(api.reports().await.is_empty());
    }
}
