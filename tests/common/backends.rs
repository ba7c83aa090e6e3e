//! Mock metric backend and reporting API

use chrono::Utc;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Prometheus stand-in answering every range query with one series
pub struct MockPrometheus {
    pub server: MockServer,
}

impl MockPrometheus {
    /// Serve `values`, spaced 15 seconds apart and ending a few seconds ago
    pub async fn serving(values: &[f64]) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/query_range"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::matrix(values)))
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Range query envelope with a single matrix series
    pub fn matrix(values: &[f64]) -> Value {
        let newest = Utc::now().timestamp() - 5;
        let count = values.len() as i64;
        let samples: Vec<Value> = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let timestamp = newest - (count - 1 - i as i64) * 15;
                json!([timestamp, value.to_string()])
            })
            .collect();

        json!({
            "status": "success",
            "data": {
                "resultType": "matrix",
                "result": [{ "metric": { "job": "web" }, "values": samples }]
            }
        })
    }

    pub async fn query_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

/// Reporting API stand-in accepting every check data report
pub struct MockReportingApi {
    pub server: MockServer,
}

impl MockReportingApi {
    pub async fn accepting() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/check-data"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Decoded bodies of every report received so far
    pub async fn reports(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }
}
