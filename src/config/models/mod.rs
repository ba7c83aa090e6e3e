//! Configuration data models
//!
//! This module defines all configuration structures used by the agent.

#![allow(missing_docs)]

pub mod agent;
pub mod backend;
pub mod logging;
pub mod reporting;
pub mod tenant;

// Re-export all configuration types
pub use agent::*;
pub use backend::*;
pub use logging::*;
pub use reporting::*;
pub use tenant::*;

/// Default environment name
pub fn default_environment() -> String {
    "default".to_string()
}

/// Default polling interval in seconds
pub fn default_polling_interval() -> u64 {
    60
}

/// Default health check concurrency
pub fn default_max_concurrency() -> usize {
    16
}

/// Default version check concurrency, per check kind
pub fn default_version_max_concurrency() -> usize {
    4
}

/// Default configuration reload interval in seconds
pub fn default_reload_interval() -> u64 {
    300
}

/// Default range query step in seconds
pub fn default_step() -> u64 {
    15
}

/// Default backend request timeout in seconds
pub fn default_backend_timeout() -> u64 {
    30
}

/// Default API request timeout in seconds
pub fn default_reporting_timeout() -> u64 {
    10
}

pub fn default_log_level() -> String {
    "info".to_string()
}
