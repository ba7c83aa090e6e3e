//! Check data reporting
//!
//! Raw samples fetched for metric checks are forwarded to the central API
//! so dashboards can show what the verdict was based on.

pub mod api_client;
pub mod sink;


pub use api_client::ApiClient;
pub use sink::{CheckDataReport, CheckDataSink};
