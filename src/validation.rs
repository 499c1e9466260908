//! Deadline-bounded health checks

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, RecvTimeoutError};
use tracing::warn;

use crate::resource::PoolableResource;
use crate::slot::SlotId;

/// Run `resource.is_valid()` with a hard deadline.
///
/// The check runs on a detached worker that only holds the resource, never
/// the pool. A timeout, an error or a panic all count as invalid. When the
/// deadline passes the worker is abandoned: it finishes on its own and its
/// late answer is dropped. A zero budget has already expired, so the check
/// is not run at all.
pub(crate) fn check_with_deadline<R: PoolableResource>(
    slot_id: SlotId,
    resource: &Arc<R>,
    timeout: Duration,
) -> bool {
    if timeout.is_zero() {
        warn!(slot = slot_id, "validation budget is zero, treating resource as invalid");
        return false;
    }

    let (tx, rx) = channel::bounded(1);
    let worker = Arc::clone(resource);
    let spawned = thread::Builder::new()
        .name("resource-validation-check".to_string())
        .spawn(move || {
            let _ = tx.send(run_check(worker.as_ref()));
        });
    if let Err(error) = spawned {
        warn!(slot = slot_id, %error, "could not start validation worker");
        return false;
    }

    match rx.recv_timeout(timeout) {
        Ok(outcome) => interpret(slot_id, outcome),
        Err(RecvTimeoutError::Timeout) => {
            warn!(slot = slot_id, timeout_ms = timeout.as_millis() as u64, "validation timed out");
            false
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!(slot = slot_id, "validation worker exited without an answer");
            false
        }
    }
}

enum Outcome {
    Valid(bool),
    Failed(String),
    Panicked,
}

fn run_check<R: PoolableResource>(resource: &R) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| resource.is_valid())) {
        Ok(Ok(valid)) => Outcome::Valid(valid),
        Ok(Err(error)) => Outcome::Failed(error.to_string()),
        Err(_) => Outcome::Panicked,
    }
}

fn interpret(slot_id: SlotId, outcome: Outcome) -> bool {
    match outcome {
        Outcome::Valid(valid) => valid,
        Outcome::Failed(error) => {
            warn!(slot = slot_id, %error, "validation check failed");
            false
        }
        Outcome::Panicked => {
            warn!(slot = slot_id, "validation check panicked");
            false
        }
    }
}
