//! Check definitions
//!
//! Definitions are a closed set of tagged variants decoded once when the
//! configuration is loaded. Evaluators match on the variant instead of
//! inspecting types at dispatch time.

use super::conditions::ComparisonOperator;
use crate::core::dispatch::Kinded;
use crate::core::types::HealthStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A health check, decoded from the `type` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthCheckDefinition {
    Http(HttpCheckDefinition),
    Metric(MetricCheckDefinition),
}

impl HealthCheckDefinition {
    pub fn kind_name(&self) -> &'static str {
        match self {
            HealthCheckDefinition::Http(_) => "http",
            HealthCheckDefinition::Metric(_) => "metric",
        }
    }
}

/// HTTP probe definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpCheckDefinition {
    pub url: String,
    /// Follow redirects; defaults to the HTTP client's behaviour (follow)
    #[serde(default)]
    pub follow_redirects: Option<bool>,
    #[serde(default)]
    pub skip_cert_validation: bool,
    /// Sent verbatim as the `Authorization` header
    #[serde(default)]
    pub authorization_header: Option<String>,
    #[serde(default)]
    pub conditions: Vec<HttpCondition>,
}

impl HttpCheckDefinition {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            follow_redirects: None,
            skip_cert_validation: false,
            authorization_header: None,
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: HttpCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn follows_redirects(&self) -> bool {
        self.follow_redirects.unwrap_or(true)
    }
}

/// Condition over an HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HttpCondition {
    /// Met when the response code is one of `codes`
    StatusCode {
        codes: Vec<u16>,
        status: HealthStatus,
    },
    /// Met when the response took longer than `threshold_ms`
    ResponseTime {
        threshold_ms: u64,
        status: HealthStatus,
    },
}

impl HttpCondition {
    pub fn status_code(codes: impl Into<Vec<u16>>, status: HealthStatus) -> Self {
        HttpCondition::StatusCode {
            codes: codes.into(),
            status,
        }
    }

    pub fn response_time(threshold: Duration, status: HealthStatus) -> Self {
        HttpCondition::ResponseTime {
            threshold_ms: threshold.as_millis() as u64,
            status,
        }
    }

    /// Used when a definition declares no status-code condition
    pub fn default_status_code() -> Self {
        Self::status_code([200, 204], HealthStatus::Online)
    }
}

/// Metric backend a metric check queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    #[default]
    Prometheus,
    Loki,
}

impl fmt::Display for MetricSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricSource::Prometheus => f.write_str("prometheus"),
            MetricSource::Loki => f.write_str("loki"),
        }
    }
}

/// Metric threshold definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCheckDefinition {
    #[serde(default)]
    pub source: MetricSource,
    pub expression: String,
    /// Window length in seconds
    pub duration: u64,
    #[serde(default)]
    pub conditions: Vec<MetricCondition>,
}

impl MetricCheckDefinition {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.duration)
    }
}

/// Satisfied when every sample in the window compares true against `threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCondition {
    pub operator: ComparisonOperator,
    pub threshold: f64,
    pub status: HealthStatus,
}

impl MetricCondition {
    pub fn new(operator: ComparisonOperator, threshold: f64, status: HealthStatus) -> Self {
        Self {
            operator,
            threshold,
            status,
        }
    }
}

/// A version probe, decoded from the `type` tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VersionCheckDefinition {
    Http(HttpVersionDefinition),
    Workload(WorkloadVersionDefinition),
}

/// Reads the version reported by an HTTP endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpVersionDefinition {
    pub url: String,
    /// JSON pointer into the response body, e.g. `/build/version`
    #[serde(default)]
    pub json_pointer: Option<String>,
    /// Response header carrying the version
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub skip_cert_validation: bool,
    #[serde(default)]
    pub authorization_header: Option<String>,
}

/// Reads the version of a running workload through the cluster API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadVersionDefinition {
    pub namespace: String,
    /// Resource kind, e.g. `deployment` or `statefulset`
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub container: Option<String>,
}

/// Version check kinds; each gets its own dispatch capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionCheckKind {
    Http,
    Workload,
}

impl VersionCheckKind {
    pub const ALL: [VersionCheckKind; 2] = [VersionCheckKind::Http, VersionCheckKind::Workload];
}

impl fmt::Display for VersionCheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionCheckKind::Http => f.write_str("http"),
            VersionCheckKind::Workload => f.write_str("workload"),
        }
    }
}

impl Kinded for VersionCheckDefinition {
    type Kind = VersionCheckKind;

    fn kind(&self) -> VersionCheckKind {
        match self {
            VersionCheckDefinition::Http(_) => VersionCheckKind::Http,
            VersionCheckDefinition::Workload(_) => VersionCheckKind::Workload,
        }
    }
}
