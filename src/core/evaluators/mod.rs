//! Check evaluators
//!
//! # Module Structure
//!
//! - `traits` - The evaluator contract consumed by the dispatcher
//! - `definitions` - Tagged check definitions decoded from configuration
//! - `conditions` - Threshold comparison operators
//! - `http` - HTTP status and latency conditions
//! - `metric` - Metric threshold conditions
//! - `version` - Version probes
//! - `health` - Combined evaluator for all health check variants

pub mod conditions;
pub mod definitions;
pub mod health;
pub mod http;
pub mod metric;
pub mod traits;
pub mod version;

#[cfg(test)]
mod tests;

pub use conditions::ComparisonOperator;
pub use definitions::{
    HealthCheckDefinition, HttpCheckDefinition, HttpCondition, HttpVersionDefinition,
    MetricCheckDefinition, MetricCondition, MetricSource, VersionCheckDefinition,
    VersionCheckKind, WorkloadVersionDefinition,
};
pub use health::HealthEvaluator;
pub use http::HttpEvaluator;
pub use metric::MetricEvaluator;
pub use traits::Evaluator;
pub use version::{VersionEvaluator, WorkloadVersionLookup};
