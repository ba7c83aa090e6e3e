//! Tenant-fair, concurrency-limited dispatcher
//!
//! Callers submit requests without blocking. A single loop per dispatcher
//! pulls them from the [`FairQueue`] whenever a capacity slot is free and
//! runs each evaluation on its own task. The loop never awaits an evaluation
//! and never sees its outcome; results travel through the request's
//! [`ResultSink`](super::request::ResultSink).
//!
//! The pending-work semaphore counts queued requests. Whenever a request
//! leaves the queue without being dispatched (tenant eviction, shutdown) the
//! matching signal is consumed as well so the two counts stay in step.

use super::capacity::CapacityPool;
use super::request::{CheckHandle, CheckRequest};
use crate::core::evaluators::Evaluator;
use crate::core::queue::FairQueue;
use crate::core::types::CheckIdentity;
use crate::utils::error::AgentError;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type Request<E> = CheckRequest<<E as Evaluator>::Definition, <E as Evaluator>::Output>;

struct Shared<E: Evaluator> {
    name: String,
    evaluator: Arc<E>,
    queue: FairQueue<Request<E>>,
    capacity: CapacityPool,
    pending: Arc<Semaphore>,
}

/// Dispatch engine for one evaluator
pub struct Dispatcher<E: Evaluator> {
    shared: Arc<Shared<E>>,
}

impl<E: Evaluator> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<E: Evaluator> Dispatcher<E> {
    /// Create a dispatcher running at most `max_concurrency` evaluations at once
    pub fn new(name: impl Into<String>, evaluator: Arc<E>, max_concurrency: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                evaluator,
                queue: FairQueue::new(),
                capacity: CapacityPool::new(max_concurrency),
                pending: Arc::new(Semaphore::new(0)),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Queue a check for `tenant` and return a handle to its result
    pub fn submit(
        &self,
        tenant: impl Into<String>,
        identity: CheckIdentity,
        definition: E::Definition,
    ) -> CheckHandle<E::Output> {
        let (request, handle) = CheckRequest::new(tenant.into(), identity, definition);
        debug!(
            dispatcher = %self.shared.name,
            request_id = %request.id,
            check = %request.identity,
            "Check queued"
        );
        self.shared.queue.enqueue(request);
        self.shared.pending.add_permits(1);
        handle
    }

    /// Drop every request still queued for `tenant`, resolving each as
    /// cancelled. Evaluations already running are left alone.
    pub fn cancel_tenant(&self, tenant: &str) -> usize {
        let removed = self.shared.queue.remove_key(&tenant.to_string());
        let count = removed.len();
        if count == 0 {
            return 0;
        }

        self.consume_signals(count);
        for request in removed {
            request.sink.cancel();
        }

        info!(
            dispatcher = %self.shared.name,
            tenant,
            cancelled = count,
            "Cancelled queued checks for tenant"
        );
        count
    }

    /// Change the concurrency limit. Never blocks; a decrease only throttles
    /// future dispatch.
    pub fn reconfigure(&self, limit: usize) {
        let current = self.shared.capacity.limit();
        if current == limit {
            return;
        }
        info!(
            dispatcher = %self.shared.name,
            from = current,
            to = limit,
            "Reconfiguring concurrency limit"
        );
        self.shared.capacity.reconfigure(limit);
    }

    /// Follow a configuration cell, reconfiguring on every published limit
    pub fn watch_limit(&self, mut limits: watch::Receiver<usize>) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            while limits.changed().await.is_ok() {
                let limit = *limits.borrow_and_update();
                dispatcher.reconfigure(limit);
            }
        })
    }

    /// Requests waiting to be dispatched
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    /// Evaluations currently running
    pub fn in_flight(&self) -> usize {
        self.shared.capacity.in_flight()
    }

    pub fn limit(&self) -> usize {
        self.shared.capacity.limit()
    }

    /// Drive the dispatch loop until `cancel` fires. Requests still queued at
    /// that point resolve as cancelled; running evaluations observe the
    /// cancellation through their own child token.
    pub async fn run(&self, cancel: CancellationToken) {
        let shared = &self.shared;
        info!(
            dispatcher = %shared.name,
            limit = shared.capacity.limit(),
            "Dispatch loop started"
        );

        loop {
            let slot = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                slot = shared.capacity.acquire() => match slot {
                    Ok(slot) => slot,
                    Err(e) => {
                        error!(dispatcher = %shared.name, "Dispatch loop stopping: {}", e);
                        break;
                    }
                },
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                signal = shared.pending.acquire() => match signal {
                    Ok(signal) => signal.forget(),
                    Err(e) => {
                        error!(dispatcher = %shared.name, "Dispatch loop stopping: {}", e);
                        break;
                    }
                },
            }

            match shared.queue.try_dequeue() {
                Some(request) => {
                    let slot = slot.start();
                    let evaluator = shared.evaluator.clone();
                    let name = shared.name.clone();
                    let token = cancel.child_token();
                    tokio::spawn(async move {
                        // Held until the evaluation resolves, whatever the outcome
                        let _slot = slot;
                        evaluate_request::<E>(name, evaluator, request, token).await;
                    });
                }
                None => {
                    // The signal belonged to a request removed out of band
                    drop(slot);
                    shared.pending.add_permits(1);
                    tokio::task::yield_now().await;
                }
            }
        }

        let abandoned = shared.queue.drain();
        if !abandoned.is_empty() {
            self.consume_signals(abandoned.len());
            for request in abandoned {
                request.sink.cancel();
            }
        }
        info!(dispatcher = %shared.name, "Dispatch loop stopped");
    }

    /// Take back `count` pending-work signals. Signals the loop has already
    /// claimed are reclaimed in the background once the loop hands them back.
    fn consume_signals(&self, count: usize) {
        let mut deficit = 0u32;
        for _ in 0..count {
            match self.shared.pending.try_acquire() {
                Ok(signal) => signal.forget(),
                Err(_) => deficit += 1,
            }
        }

        if deficit > 0 {
            let pending = self.shared.pending.clone();
            tokio::spawn(async move {
                if let Ok(signals) = pending.acquire_many(deficit).await {
                    signals.forget();
                }
            });
        }
    }
}

async fn evaluate_request<E: Evaluator>(
    name: String,
    evaluator: Arc<E>,
    request: Request<E>,
    cancel: CancellationToken,
) {
    let CheckRequest {
        id,
        identity,
        definition,
        sink,
        enqueued_at,
        ..
    } = request;

    if sink.is_abandoned() {
        debug!(
            dispatcher = %name,
            request_id = %id,
            check = %identity,
            "Caller gone, skipping check"
        );
        return;
    }

    debug!(
        dispatcher = %name,
        request_id = %id,
        check = %identity,
        queued_ms = enqueued_at.elapsed().as_millis() as u64,
        "Evaluating check"
    );

    let outcome = AssertUnwindSafe(evaluator.evaluate(&identity, &definition, cancel))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(output)) => sink.succeed(output),
        Ok(Err(AgentError::Cancelled)) => {
            debug!(dispatcher = %name, check = %identity, "Check cancelled");
            sink.cancel();
        }
        Ok(Err(e)) => {
            warn!(dispatcher = %name, check = %identity, "Check evaluation failed: {}", e);
            sink.fail(e);
        }
        Err(_) => {
            error!(dispatcher = %name, check = %identity, "Check evaluator panicked");
            sink.fail(AgentError::internal(format!(
                "evaluator panicked while checking {}",
                identity
            )));
        }
    }
}
