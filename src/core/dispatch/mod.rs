//! Check dispatch engine
//!
//! # Module Structure
//!
//! - `capacity` - Resizable pool of evaluation slots
//! - `request` - Check requests and the result handoff between tasks
//! - `dispatcher` - Tenant-fair dispatch loop for a single evaluator
//! - `kinded` - Independent dispatchers per check kind

pub mod capacity;
pub mod dispatcher;
pub mod kinded;
pub mod request;


pub use capacity::{CapacityPool, CapacitySlot, MAX_CAPACITY};
pub use dispatcher::Dispatcher;
pub use kinded::{Kinded, KindedDispatcher};
pub use request::{CheckHandle, CheckRequest, ResultSink, result_channel};
