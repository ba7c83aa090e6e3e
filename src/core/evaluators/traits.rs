//! Evaluator contract consumed by the dispatcher

use crate::core::types::CheckIdentity;
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Turns a check definition into an outcome.
///
/// Implementations resolve every target or configuration problem to an
/// output value. The only errors they return are
/// [`AgentError::Cancelled`](crate::utils::error::AgentError::Cancelled) when
/// `cancel` fires and [`AgentError::Parsing`](crate::utils::error::AgentError::Parsing)
/// when backend data is structurally corrupt.
#[async_trait]
pub trait Evaluator: Send + Sync + 'static {
    type Definition: Send + Sync + 'static;
    type Output: Send + 'static;

    async fn evaluate(
        &self,
        identity: &CheckIdentity,
        definition: &Self::Definition,
        cancel: CancellationToken,
    ) -> Result<Self::Output>;
}
