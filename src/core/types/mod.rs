//! Core data types shared by the queue, dispatcher, evaluators and query layer

pub mod identity;
pub mod samples;
pub mod status;


pub use identity::CheckIdentity;
pub use samples::{Sample, SampleSeries};
pub use status::HealthStatus;
