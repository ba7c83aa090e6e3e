//! One dispatcher per check kind
//!
//! Several definition kinds can share an evaluator yet must not share
//! capacity: each kind gets its own queue, pool and loop so a backlog of one
//! kind cannot starve the others.

use super::dispatcher::Dispatcher;
use super::request::CheckHandle;
use crate::core::evaluators::Evaluator;
use crate::core::types::CheckIdentity;
use crate::utils::error::AgentError;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Definitions that route to a per-kind dispatcher
pub trait Kinded {
    type Kind: Eq + Hash + Clone + Debug + Display + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

type KindOf<E> = <<E as Evaluator>::Definition as Kinded>::Kind;

/// Dispatcher keyed by tenant within each definition kind
pub struct KindedDispatcher<E>
where
    E: Evaluator,
    E::Definition: Kinded,
{
    dispatchers: HashMap<KindOf<E>, Dispatcher<E>>,
}

impl<E> KindedDispatcher<E>
where
    E: Evaluator,
    E::Definition: Kinded,
{
    /// Create one dispatcher per listed kind, each with its own limit
    pub fn new(
        name: &str,
        evaluator: Arc<E>,
        kinds: impl IntoIterator<Item = (KindOf<E>, usize)>,
    ) -> Self {
        let dispatchers = kinds
            .into_iter()
            .map(|(kind, limit)| {
                let dispatcher =
                    Dispatcher::new(format!("{}:{}", name, kind), evaluator.clone(), limit);
                (kind, dispatcher)
            })
            .collect();
        Self { dispatchers }
    }

    /// Route a request to the dispatcher for its definition's kind
    pub fn submit(
        &self,
        tenant: impl Into<String>,
        identity: CheckIdentity,
        definition: E::Definition,
    ) -> CheckHandle<E::Output> {
        let kind = definition.kind();
        match self.dispatchers.get(&kind) {
            Some(dispatcher) => dispatcher.submit(tenant, identity, definition),
            None => CheckHandle::failed(AgentError::config(format!(
                "no dispatcher configured for check kind '{}'",
                kind
            ))),
        }
    }

    /// Evict `tenant` from every kind's queue
    pub fn cancel_tenant(&self, tenant: &str) -> usize {
        self.dispatchers
            .values()
            .map(|dispatcher| dispatcher.cancel_tenant(tenant))
            .sum()
    }

    /// Change one kind's limit; false if the kind is unknown
    pub fn reconfigure(&self, kind: &KindOf<E>, limit: usize) -> bool {
        match self.dispatchers.get(kind) {
            Some(dispatcher) => {
                dispatcher.reconfigure(limit);
                true
            }
            None => false,
        }
    }

    /// Apply the same limit to every kind
    pub fn reconfigure_all(&self, limit: usize) {
        for dispatcher in self.dispatchers.values() {
            dispatcher.reconfigure(limit);
        }
    }

    pub fn dispatcher(&self, kind: &KindOf<E>) -> Option<&Dispatcher<E>> {
        self.dispatchers.get(kind)
    }

    pub fn queued(&self) -> usize {
        self.dispatchers.values().map(Dispatcher::queued).sum()
    }

    /// Drive every kind's loop until `cancel` fires
    pub async fn run(&self, cancel: CancellationToken) {
        futures::future::join_all(
            self.dispatchers
                .values()
                .map(|dispatcher| dispatcher.run(cancel.clone())),
        )
        .await;
    }
}
