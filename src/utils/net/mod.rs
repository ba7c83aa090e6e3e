//! Network utilities
//!
//! This module provides HTTP client construction and pooling.

pub mod http;

pub use http::{ClientOptions, HttpClientCache, HttpClientPoolConfig, build_client};
