//! Common test utilities for vigil
//!
//! This module provides shared test infrastructure for all tests:
//! - Configuration fixtures
//! - Mock metric backends and reporting API
//! - Custom assertions and helpers

pub mod backends;
pub mod fixtures;

pub use backends::{MockPrometheus, MockReportingApi};
pub use fixtures::{ConfigFactory, eventually};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
