//! Error handling utilities
//!
//! This module defines the agent-wide error type and result alias.

pub mod error;


pub use error::*;
