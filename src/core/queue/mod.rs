//! Per-tenant fair queueing
//!
//! The dispatcher stores pending check requests here and pulls them in
//! round-robin order across tenants.

mod fair_queue;


pub use fair_queue::{FairQueue, Owned};
