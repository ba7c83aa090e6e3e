//! Check requests and their single-assignment result handoff

use crate::core::queue::Owned;
use crate::core::types::CheckIdentity;
use crate::utils::error::{AgentError, Result};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::time::Instant;
use uuid::Uuid;

/// Create a connected sink and handle pair
pub fn result_channel<T>() -> (ResultSink<T>, CheckHandle<T>) {
    let (sender, receiver) = oneshot::channel();
    (ResultSink { sender }, CheckHandle { receiver })
}

/// Write side of a check result. Consumed by whichever terminal state is
/// written; dropping it unwritten resolves the handle as cancelled.
#[derive(Debug)]
pub struct ResultSink<T> {
    sender: oneshot::Sender<Result<T>>,
}

impl<T> ResultSink<T> {
    pub fn succeed(self, value: T) {
        // The caller may have stopped waiting; nothing to do then
        let _ = self.sender.send(Ok(value));
    }

    pub fn cancel(self) {
        let _ = self.sender.send(Err(AgentError::Cancelled));
    }

    pub fn fail(self, error: AgentError) {
        let _ = self.sender.send(Err(error));
    }

    /// Whether the awaiting caller has dropped its handle
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Read side of a check result; resolves to the verdict,
/// [`AgentError::Cancelled`], or the evaluation failure
#[derive(Debug)]
pub struct CheckHandle<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> CheckHandle<T> {
    /// A handle that is already resolved with `error`
    pub fn failed(error: AgentError) -> Self {
        let (sink, handle) = result_channel();
        sink.fail(error);
        handle
    }

    /// Non-blocking inspection. `None` while the request is still queued or
    /// running.
    pub fn try_result(&mut self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(AgentError::Cancelled)),
        }
    }
}

impl<T> Future for CheckHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(AgentError::Cancelled)))
    }
}

/// One unit of work waiting in a dispatcher
#[derive(Debug)]
pub struct CheckRequest<D, T> {
    /// Correlation id for logs
    pub id: Uuid,
    /// Fairness key
    pub tenant: String,
    pub identity: CheckIdentity,
    pub definition: D,
    pub sink: ResultSink<T>,
    pub enqueued_at: Instant,
}

impl<D, T> CheckRequest<D, T> {
    pub fn new(
        tenant: String,
        identity: CheckIdentity,
        definition: D,
    ) -> (Self, CheckHandle<T>) {
        let (sink, handle) = result_channel();
        let request = Self {
            id: Uuid::new_v4(),
            tenant,
            identity,
            definition,
            sink,
            enqueued_at: Instant::now(),
        };
        (request, handle)
    }
}

impl<D, T> Owned for CheckRequest<D, T> {
    type Key = String;

    fn owner_key(&self) -> &String {
        &self.tenant
    }
}
