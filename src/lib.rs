//! # Vigil
//!
//! A health-monitoring agent that periodically evaluates HTTP, metric and
//! version checks for many tenants under a global concurrency limit.
//!
//! ## Features
//!
//! - **Fair scheduling**: Tenants are served round-robin, so one tenant with
//!   many checks cannot starve the others
//! - **Bounded concurrency**: Capacity limits can be changed at runtime
//!   without interrupting evaluations in flight
//! - **Metric backends**: Prometheus and Loki range queries with
//!   incremental caching
//! - **Check data reporting**: Freshly fetched samples are forwarded to an
//!   API endpoint
//! - **Hot reload**: Tenants and limits are re-read from the configuration
//!   file on an interval
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vigil::{Agent, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/agent.yaml").await?;
//!     let agent = Agent::builder(config)
//!         .config_path("config/agent.yaml")
//!         .build()?;
//!     agent.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod agent;
pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use agent::{Agent, AgentBuilder, StatusBoard};
pub use config::Config;
pub use crate::core::dispatch::{CheckHandle, Dispatcher, KindedDispatcher};
pub use crate::core::evaluators::{
    HealthCheckDefinition, HealthEvaluator, VersionCheckDefinition, VersionEvaluator,
};
pub use crate::core::queue::FairQueue;
pub use crate::core::types::{CheckIdentity, HealthStatus, Sample, SampleSeries};
pub use utils::error::{AgentError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
