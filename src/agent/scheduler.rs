//! Periodic check scheduling
//!
//! Each configured check gets its own task that submits it on every tick
//! and waits for the verdict before the next tick, so a slow check never
//! piles up requests in the queue.

use crate::core::dispatch::CheckHandle;
use crate::core::types::CheckIdentity;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Submit `definition` every `interval` until `cancel` fires, handing each
/// successful result to `record`.
///
/// Returns the number of completed evaluations.
pub async fn run_schedule<D, O, S, R>(
    identity: CheckIdentity,
    definition: D,
    interval: Duration,
    cancel: CancellationToken,
    submit: S,
    record: R,
) -> u64
where
    D: Clone,
    S: Fn(CheckIdentity, D) -> CheckHandle<O>,
    R: Fn(&CheckIdentity, O),
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut completed = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let handle = submit(identity.clone(), definition.clone());
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = handle => outcome,
        };

        // A verdict arriving after removal must not resurrect the check
        if cancel.is_cancelled() {
            break;
        }

        match outcome {
            Ok(output) => {
                completed += 1;
                record(&identity, output);
            }
            Err(e) if e.is_cancelled() => {
                debug!(check = %identity, "Check evaluation cancelled");
            }
            Err(e) => {
                warn!(check = %identity, "Check evaluation failed: {}", e);
            }
        }
    }

    debug!(check = %identity, completed, "Check schedule stopped");
    completed
}
