//! Utility modules for the agent
//!
//! ## Module Organization
//!
//! - **error**: Error type and crate-wide result alias
//! - **logging**: Tracing subscriber setup
//! - **net**: Pooled HTTP clients

pub mod error;
pub mod logging;
pub mod net;

pub use error::{AgentError, Result};
pub use net::{ClientOptions, HttpClientCache, HttpClientPoolConfig};
