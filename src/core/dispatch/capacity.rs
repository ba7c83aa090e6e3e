//! Resizable pool of evaluation slots
//!
//! Backed by a Tokio semaphore. Growing the pool hands out new permits
//! immediately; shrinking it retires permits from a detached task so the
//! caller never waits for in-flight evaluations to finish.

use crate::utils::error::{AgentError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

/// Largest limit the pool accepts
pub const MAX_CAPACITY: usize = Semaphore::MAX_PERMITS;

/// Permission to run one evaluation; released on drop.
///
/// A slot only counts as in flight once [`CapacitySlot::start`] hands it to
/// an evaluation. A slot held while waiting for work is not counted.
#[derive(Debug)]
pub struct CapacitySlot {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
    started: bool,
}

impl CapacitySlot {
    /// Mark the slot as carrying an evaluation
    pub fn start(mut self) -> Self {
        if !self.started {
            self.in_flight.fetch_add(1, Ordering::AcqRel);
            self.started = true;
        }
        self
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Drop for CapacitySlot {
    fn drop(&mut self) {
        if self.started {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// Concurrency ceiling with a live-adjustable limit
#[derive(Debug)]
pub struct CapacityPool {
    semaphore: Arc<Semaphore>,
    limit: Mutex<usize>,
    in_flight: Arc<AtomicUsize>,
}

impl CapacityPool {
    /// Create a pool of `limit` slots, clamped to [`MAX_CAPACITY`]
    pub fn new(limit: usize) -> Self {
        let limit = clamp_limit(limit);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit: Mutex::new(limit),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait until a slot is free
    pub async fn acquire(&self) -> Result<CapacitySlot> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AgentError::internal(format!("Capacity pool closed: {}", e)))?;

        Ok(CapacitySlot {
            _permit: permit,
            in_flight: self.in_flight.clone(),
            started: false,
        })
    }

    /// Change the limit, clamped to [`MAX_CAPACITY`].
    ///
    /// Must be called from within a Tokio runtime: a decrease spawns the
    /// task that retires the surplus slots.
    pub fn reconfigure(&self, new_limit: usize) {
        let new_limit = clamp_limit(new_limit);
        let mut limit = self.limit.lock();
        let current = *limit;

        if new_limit > current {
            let delta = new_limit - current;
            self.semaphore.add_permits(delta);
            debug!(from = current, to = new_limit, "Capacity increased");
        } else if new_limit < current {
            let delta = current - new_limit;
            let Ok(delta_permits) = u32::try_from(delta) else {
                warn!(delta, "Capacity decrease too large, ignoring");
                return;
            };

            let semaphore = self.semaphore.clone();
            tokio::spawn(async move {
                match semaphore.acquire_many_owned(delta_permits).await {
                    Ok(permits) => {
                        permits.forget();
                        debug!(retired = delta, "Retired capacity slots");
                    }
                    Err(e) => warn!("Failed to retire capacity slots: {}", e),
                }
            });
            debug!(from = current, to = new_limit, "Capacity decrease scheduled");
        }

        *limit = new_limit;
    }

    /// Configured limit; a pending decrease may not have taken effect yet
    pub fn limit(&self) -> usize {
        *self.limit.lock()
    }

    /// Evaluations currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Slots that could be acquired right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

fn clamp_limit(limit: usize) -> usize {
    if limit > MAX_CAPACITY {
        warn!(requested = limit, max = MAX_CAPACITY, "Capacity limit clamped");
        MAX_CAPACITY
    } else {
        limit
    }
}
