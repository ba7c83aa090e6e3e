//! Check data sink contract

use crate::core::types::SampleSeries;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Receives raw metric samples gathered while evaluating checks
#[async_trait]
pub trait CheckDataSink: Send + Sync {
    /// Record samples for the checks of one service, keyed by check name
    async fn record_check_data(
        &self,
        environment: &str,
        tenant: &str,
        service: &str,
        data: HashMap<String, SampleSeries>,
        cancel: CancellationToken,
    ) -> Result<()>;
}

/// Body posted to the central API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDataReport {
    pub environment: String,
    pub tenant: String,
    pub service: String,
    pub checks: HashMap<String, SampleSeries>,
}
