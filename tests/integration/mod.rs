//! Integration tests for vigil
//!
//! These tests verify the interaction between multiple components
//! against mock HTTP backends.

pub mod agent_tests;
pub mod config_tests;
pub mod dispatch_tests;
pub mod pipeline_tests;
