//! Background eviction of idle resources

use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Sender};
use crossbeam::select;
use tracing::{debug, info};

use crate::errors::{PoolError, PoolResult};
use crate::metrics::MetricsTracker;
use crate::pool::PoolInner;
use crate::resource::PoolableResource;
use crate::slot::Removal;

/// Handle to the recurring eviction thread of one pool.
pub(crate) struct EvictionTask {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl EvictionTask {
    /// Spawn the task. The first pass runs one `period` after start.
    pub fn start<R: PoolableResource>(pool: Weak<PoolInner<R>>, period: Duration) -> PoolResult<Self> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let handle = thread::Builder::new()
            .name("pooled-resource-cleaner".to_string())
            .spawn(move || {
                let ticker = channel::tick(period);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            let Some(pool) = pool.upgrade() else { break };
                            pool.evict_idle();
                        }
                        recv(stop_rx) -> _ => break,
                    }
                }
                debug!("eviction task stopped");
            })
            .map_err(PoolError::Spawn)?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the task and wait for an in-flight pass to finish.
    pub fn stop(mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl<R: PoolableResource> PoolInner<R> {
    /// Destroy idle resources past the idle timeout, never taking the idle
    /// count below `min_size`. Slots are visited in queue order, not by idle
    /// duration. Returns the number evicted.
    pub(crate) fn evict_idle(&self) -> usize {
        let floor = self.config.min_size;
        let timeout = self.config.idle_timeout;

        let idle = self.idle.len();
        if idle <= floor {
            debug!(idle, min_size = floor, "idle count at or below minimum, skipping eviction");
            return 0;
        }

        let now = Instant::now();
        let mut evicted = 0;
        for id in self.idle.expired_ids(now, timeout) {
            match self.idle.remove_expired(id, floor, now, timeout) {
                Removal::Removed(slot) => {
                    info!(
                        slot = slot.id(),
                        idle_ms = slot.idle_for(now).as_millis() as u64,
                        age_ms = slot.age().as_millis() as u64,
                        "evicting idle resource"
                    );
                    self.destroy_slot(slot);
                    MetricsTracker::record(&self.metrics.evicted);
                    evicted += 1;
                }
                Removal::FloorReached => {
                    debug!(min_size = floor, "reached minimum idle count, stopping eviction");
                    break;
                }
                Removal::Skipped => {}
            }
        }
        evicted
    }
}
