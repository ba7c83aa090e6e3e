//! Core functionality for the agent
//!
//! This module contains the check evaluation engine and the data it works
//! on:
//!
//! - `types` - Check identities, health statuses and metric samples
//! - `queue` - Tenant-fair request queue
//! - `dispatch` - Concurrency-limited dispatch of check requests
//! - `evaluators` - HTTP, metric and version evaluators
//! - `query` - Metric range queries with caching and reporting
//! - `reporting` - Delivery of check data to the central API

pub mod dispatch;
pub mod evaluators;
pub mod query;
pub mod queue;
pub mod reporting;
pub mod types;
