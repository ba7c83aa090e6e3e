//! Configuration validation
//!
//! Each configuration section checks itself through [`Validate`]; checks that
//! span sections, such as metric checks referencing a backend, live in
//! `config_validators` and are run by [`Config::validate`](crate::config::Config::validate).

mod config_validators;

pub use config_validators::validate_url;
pub(crate) use config_validators::{validate_metric_sources, validate_tenants};

/// A configuration section that can reject itself.
///
/// The error is a human-readable message; callers wrap it in
/// [`AgentError::Config`](crate::utils::error::AgentError::Config) with the
/// section name.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
