//! Agent runtime
//!
//! # Module Structure
//!
//! - `runtime` - Wiring, tenant schedules and configuration reloads
//! - `scheduler` - Periodic submission of a single check
//! - `status_board` - Latest verdicts per check

pub mod runtime;
pub mod scheduler;
pub mod status_board;


pub use runtime::{Agent, AgentBuilder};
pub use scheduler::run_schedule;
pub use status_board::{CheckState, StatusBoard};
