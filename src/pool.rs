//! Core pooling engine

use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::eviction::EvictionTask;
use crate::metrics::{Gauges, MetricsTracker, PoolMetrics};
use crate::resource::{BoxError, PoolableResource, ResourceFactory};
use crate::slot::{IdleQueue, ResourceSlot, SlotId, Wait};
use crate::validation;

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A checked-out resource that returns to its pool when dropped
pub struct PooledResource<R: PoolableResource> {
    resource: Arc<R>,
    slot_id: SlotId,
    usage_count: u32,
    pool: Option<Weak<PoolInner<R>>>,
}

impl<R: PoolableResource> PooledResource<R> {
    /// Identity of the slot backing this resource, unique within its pool
    pub fn slot_id(&self) -> u64 {
        self.slot_id
    }

    /// How many times this instance has been acquired, this time included
    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }
}

impl<R: PoolableResource> Deref for PooledResource<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl<R: PoolableResource> Drop for PooledResource<R> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take().and_then(|pool| pool.upgrade()) {
            pool.release(self.slot_id);
        }
    }
}

impl<R: PoolableResource + fmt::Debug> fmt::Debug for PooledResource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledResource")
            .field("slot_id", &self.slot_id)
            .field("usage_count", &self.usage_count)
            .field("resource", &self.resource)
            .finish()
    }
}

/// State shared between the pool handle, its guards and the eviction task.
pub(crate) struct PoolInner<R: PoolableResource> {
    pub(crate) factory: Box<ResourceFactory<R>>,
    pub(crate) config: PoolConfiguration,
    pub(crate) idle: IdleQueue<R>,
    pub(crate) in_use: DashMap<SlotId, ResourceSlot<R>>,
    /// Live slots: idle, in use, or between the two while being validated.
    pub(crate) live: AtomicUsize,
    /// Serializes every step that adds a slot.
    pub(crate) create_lock: Mutex<()>,
    pub(crate) next_id: AtomicU64,
    pub(crate) closed: AtomicBool,
    pub(crate) metrics: MetricsTracker,
}

impl<R: PoolableResource> PoolInner<R> {
    fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn create_slot(&self) -> PoolResult<ResourceSlot<R>> {
        let mut resource = (self.factory)().map_err(PoolError::Creation)?;
        resource.init().map_err(PoolError::Creation)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let total = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        MetricsTracker::record(&self.metrics.created);
        debug!(slot = id, total, "created resource");
        Ok(ResourceSlot::new(id, resource))
    }

    fn pre_fill(&self) -> PoolResult<()> {
        debug!(count = self.config.min_size, "pre-filling pool");
        for _ in 0..self.config.min_size {
            let slot = self.create_slot()?;
            if let Err(slot) = self.idle.push(slot) {
                self.destroy_slot(slot);
            }
        }
        Ok(())
    }

    /// Double-checked creation: the unlocked check keeps a full pool from
    /// contending on the lock, the locked one keeps racing creators from
    /// overshooting `max_size`.
    fn try_create(&self) -> PoolResult<Option<ResourceSlot<R>>> {
        let max = self.config.max_size;
        if self.live() >= max {
            return Ok(None);
        }
        let _guard = self.create_lock.lock();
        if self.live() >= max {
            debug!(max_size = max, "pool reached max size during acquire");
            return Ok(None);
        }
        self.create_slot().map(Some)
    }

    /// Destroy a slot that is in neither collection. Failures are logged.
    pub(crate) fn destroy_slot(&self, slot: ResourceSlot<R>) {
        if let Err(error) = slot.resource().destroy() {
            warn!(slot = slot.id(), %error, "failed to destroy resource");
        }
        self.live.fetch_sub(1, Ordering::AcqRel);
        MetricsTracker::record(&self.metrics.destroyed);
        self.idle.notify_capacity();
    }

    /// Obtain a candidate slot: reuse, create, or wait up to `wait`.
    fn next_slot(&self, wait: Duration) -> PoolResult<ResourceSlot<R>> {
        if let Some(slot) = self.idle.try_pop() {
            return Ok(slot);
        }
        if let Some(slot) = self.try_create()? {
            return Ok(slot);
        }

        debug!(wait_ms = wait.as_millis() as u64, "no idle resource, waiting");
        let now = Instant::now();
        let deadline = now
            .checked_add(wait)
            .unwrap_or_else(|| now + Duration::from_secs(365 * 24 * 60 * 60));
        loop {
            match self.idle.wait_pop(deadline, || self.live() < self.config.max_size) {
                Wait::Slot(slot) => return Ok(slot),
                Wait::Capacity => {
                    if let Some(slot) = self.try_create()? {
                        return Ok(slot);
                    }
                }
                Wait::TimedOut => {
                    MetricsTracker::record(&self.metrics.acquire_timeouts);
                    return Err(PoolError::Timeout(wait));
                }
                Wait::Closed => return Err(PoolError::Closed),
            }
        }
    }

    fn acquire_within(self: &Arc<Self>, wait: Duration) -> PoolResult<PooledResource<R>> {
        let attempts = self.config.acquire_retry_count;
        for attempt in 1..=attempts {
            if self.is_closed() {
                return Err(PoolError::Closed);
            }
            debug!(
                attempt,
                idle = self.idle.len(),
                active = self.in_use.len(),
                total = self.live(),
                "acquiring resource"
            );

            let slot = self.next_slot(wait)?;
            if validation::check_with_deadline(slot.id(), slot.resource(), self.config.validation_timeout) {
                return self.check_out(slot);
            }

            MetricsTracker::record(&self.metrics.validation_failures);
            warn!(slot = slot.id(), attempt, "acquired resource is not valid, destroying it");
            self.destroy_slot(slot);
        }

        MetricsTracker::record(&self.metrics.acquire_timeouts);
        Err(PoolError::RetriesExhausted(attempts))
    }

    fn check_out(self: &Arc<Self>, mut slot: ResourceSlot<R>) -> PoolResult<PooledResource<R>> {
        slot.mark_acquired();
        if let Err(error) = slot.resource().reset() {
            warn!(slot = slot.id(), %error, "failed to reset resource, destroying it");
            self.destroy_slot(slot);
            return Err(PoolError::Reset(error));
        }

        let slot_id = slot.id();
        let resource = Arc::clone(slot.resource());
        let usage_count = slot.usage_count();
        self.in_use.insert(slot_id, slot);

        // Shutdown drains `in_use` after setting `closed`, so one of the two
        // sides always sees the slot. Whoever removes it destroys it.
        if self.is_closed() {
            if let Some((_, slot)) = self.in_use.remove(&slot_id) {
                self.destroy_slot(slot);
            }
            return Err(PoolError::Closed);
        }

        MetricsTracker::record(&self.metrics.acquired);
        Ok(PooledResource {
            resource,
            slot_id,
            usage_count,
            pool: Some(Arc::downgrade(self)),
        })
    }

    pub(crate) fn release(&self, slot_id: SlotId) {
        let Some((_, mut slot)) = self.in_use.remove(&slot_id) else {
            MetricsTracker::record(&self.metrics.unknown_releases);
            warn!(slot = slot_id, "attempted to release unknown resource");
            return;
        };
        slot.touch();
        MetricsTracker::record(&self.metrics.released);
        debug!(slot = slot_id, usage = slot.usage_count(), "releasing resource");

        let slot = if self.config.reset_on_release && slot.usage_count() >= self.config.reset_after_uses {
            match self.replace(slot) {
                Some(fresh) => fresh,
                None => return,
            }
        } else {
            slot
        };

        if let Err(slot) = self.idle.push(slot) {
            self.destroy_slot(slot);
        }
    }

    /// Swap a worn-out slot for a fresh one. `None` if creation failed; the
    /// pool then runs one resource short until an acquire creates another.
    fn replace(&self, slot: ResourceSlot<R>) -> Option<ResourceSlot<R>> {
        debug!(
            slot = slot.id(),
            usage = slot.usage_count(),
            limit = self.config.reset_after_uses,
            "resource reached usage limit, replacing"
        );
        let _guard = self.create_lock.lock();
        self.destroy_slot(slot);
        match self.create_slot() {
            Ok(fresh) => {
                MetricsTracker::record(&self.metrics.replaced);
                Some(fresh)
            }
            Err(error) => {
                warn!(error = ?error, "failed to create replacement resource");
                None
            }
        }
    }

    fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let idle = self.idle.close();
        let ids: Vec<SlotId> = self.in_use.iter().map(|entry| *entry.key()).collect();
        let in_use: Vec<_> = ids
            .into_iter()
            .filter_map(|id| self.in_use.remove(&id).map(|(_, slot)| slot))
            .collect();

        debug!(idle = idle.len(), in_use = in_use.len(), "destroying all resources");
        for slot in idle.into_iter().chain(in_use) {
            self.destroy_slot(slot);
        }
    }
}

/// Thread-safe pool of resources created on demand
///
/// # Examples
///
/// ```
/// use resource_pool::{BoxError, PoolConfiguration, PoolableResource, ResourcePool};
///
/// struct Worker;
///
/// impl PoolableResource for Worker {
///     fn init(&mut self) -> Result<(), BoxError> { Ok(()) }
///     fn destroy(&self) -> Result<(), BoxError> { Ok(()) }
/// }
///
/// let pool = ResourcePool::new(|| Ok(Worker), PoolConfiguration::new().with_max_size(2)).unwrap();
/// {
///     let _worker = pool.acquire().unwrap();
///     assert_eq!(pool.active_count(), 1);
/// }
/// assert_eq!(pool.idle_count(), 1);
/// ```
pub struct ResourcePool<R: PoolableResource> {
    pub(crate) inner: Arc<PoolInner<R>>,
    eviction: Mutex<Option<EvictionTask>>,
}

impl<R: PoolableResource> ResourcePool<R> {
    /// Create a pool. Fails on an invalid configuration, or when pre-filling
    /// cannot create a resource.
    pub fn new<F>(factory: F, config: PoolConfiguration) -> PoolResult<Self>
    where
        F: Fn() -> Result<R, BoxError> + Send + Sync + 'static,
    {
        config.validate()?;
        debug!(?config, "initializing resource pool");

        let inner = Arc::new(PoolInner {
            factory: Box::new(factory),
            idle: IdleQueue::new(config.max_size),
            in_use: DashMap::with_capacity(config.max_size),
            live: AtomicUsize::new(0),
            create_lock: Mutex::new(()),
            next_id: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            metrics: MetricsTracker::new(),
            config,
        });

        if inner.config.pre_fill
            && let Err(error) = inner.pre_fill()
        {
            inner.shutdown();
            return Err(error);
        }

        let period = inner.config.idle_timeout;
        let eviction = if period.is_zero() {
            None
        } else {
            match EvictionTask::start(Arc::downgrade(&inner), period) {
                Ok(task) => Some(task),
                Err(error) => {
                    inner.shutdown();
                    return Err(error);
                }
            }
        };

        Ok(Self {
            inner,
            eviction: Mutex::new(eviction),
        })
    }

    /// Acquire a validated, freshly reset resource, blocking up to the wait
    /// timeout on each attempt.
    pub fn acquire(&self) -> PoolResult<PooledResource<R>> {
        self.inner.acquire_within(self.inner.config.wait_timeout)
    }

    /// Acquire without waiting for a release
    pub fn try_acquire(&self) -> Option<PooledResource<R>> {
        self.inner.acquire_within(Duration::ZERO).ok()
    }

    /// Acquire on tokio's blocking pool
    pub async fn acquire_async(&self) -> PoolResult<PooledResource<R>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.acquire_within(inner.config.wait_timeout))
            .await
            .map_err(|_| PoolError::Cancelled)?
    }

    /// Return a resource to the pool. A resource owned by another pool is
    /// reported and left alone; it goes back to its own pool when dropped.
    pub fn release(&self, mut resource: PooledResource<R>) {
        let owned = resource
            .pool
            .as_ref()
            .is_some_and(|pool| Weak::ptr_eq(pool, &Arc::downgrade(&self.inner)));
        if !owned {
            MetricsTracker::record(&self.inner.metrics.unknown_releases);
            warn!(slot = resource.slot_id, "attempted to release a resource from another pool");
            return;
        }
        resource.pool = None;
        self.inner.release(resource.slot_id);
    }

    /// Stop eviction and destroy every resource, idle or checked out.
    /// Later calls do nothing.
    pub fn destroy_all(&self) {
        let task = self.eviction.lock().take();
        if let Some(task) = task {
            task.stop();
        }
        self.inner.shutdown();
    }

    /// Get pool metrics
    pub fn metrics(&self) -> PoolMetrics {
        let config = &self.inner.config;
        self.inner.metrics.snapshot(Gauges {
            idle: self.idle_count(),
            active: self.active_count(),
            total: self.total_count(),
            max_size: config.max_size,
            reset_on_release: config.reset_on_release,
            reset_after_uses: config.reset_after_uses,
        })
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.metrics().export()
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        crate::metrics::MetricsExporter::export_prometheus(&self.metrics(), pool_name, tags)
    }

    /// Live resources, idle or in use
    pub fn total_count(&self) -> usize {
        self.inner.live()
    }

    /// Get idle count
    pub fn idle_count(&self) -> usize {
        self.inner.idle.len()
    }

    /// Get active count
    pub fn active_count(&self) -> usize {
        self.inner.in_use.len()
    }

    /// Configuration the pool was built with
    pub fn config(&self) -> &PoolConfiguration {
        &self.inner.config
    }
}

impl<R: PoolableResource> Drop for ResourcePool<R> {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

impl<R: PoolableResource> fmt::Debug for ResourcePool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("idle", &self.idle_count())
            .field("active", &self.active_count())
            .field("total", &self.total_count())
            .field("max_size", &self.inner.config.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::thread;

    #[derive(Debug)]
    struct Conn {
        healthy: AtomicBool,
        resets: AtomicU32,
        fail_reset: bool,
    }

    impl Conn {
        fn new() -> Self {
            Self {
                healthy: AtomicBool::new(false),
                resets: AtomicU32::new(0),
                fail_reset: false,
            }
        }
    }

    impl PoolableResource for Conn {
        fn init(&mut self) -> Result<(), BoxError> {
            self.healthy = AtomicBool::new(true);
            Ok(())
        }

        fn reset(&self) -> Result<(), BoxError> {
            if self.fail_reset {
                return Err("reset refused".into());
            }
            self.resets.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn is_valid(&self) -> Result<bool, BoxError> {
            Ok(self.healthy.load(Ordering::SeqCst))
        }

        fn destroy(&self) -> Result<(), BoxError> {
            self.healthy.store(false, Ordering::SeqCst);
            Err("already closed".into())
        }
    }

    fn config() -> PoolConfiguration {
        PoolConfiguration::new()
            .with_max_size(3)
            .with_min_size(0)
            .with_wait_timeout(Duration::from_millis(100))
            .with_validation_timeout(Duration::from_millis(100))
    }

    #[test]
    fn test_acquire_and_release() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config()).unwrap();

        let conn = pool.acquire().unwrap();
        assert!(conn.is_valid().unwrap());
        assert_eq!(conn.resets.load(Ordering::SeqCst), 1);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.total_count(), 1);

        pool.release(conn);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_idle_resource_is_reused() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config()).unwrap();

        let first = pool.acquire().unwrap().slot_id();
        let second = pool.acquire().unwrap();
        assert_eq!(second.slot_id(), first);
        assert_eq!(second.usage_count(), 2);
        assert_eq!(pool.metrics().total_created, 1);
    }

    #[test]
    fn test_try_acquire_when_exhausted() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config().with_max_size(1)).unwrap();

        let held = pool.try_acquire();
        assert!(held.is_some());
        assert!(pool.try_acquire().is_none());
        drop(held);
        assert!(pool.try_acquire().is_some());
    }

    #[test]
    fn test_creation_failure_is_surfaced() {
        let pool = ResourcePool::<Conn>::new(|| Err("refused".into()), config()).unwrap();

        let err = pool.acquire().unwrap_err();
        assert!(matches!(err, PoolError::Creation(_)));
        assert_eq!(pool.total_count(), 0);
    }

    #[test]
    fn test_pre_fill_failure_fails_construction() {
        let result = ResourcePool::<Conn>::new(
            || Err("refused".into()),
            config().with_min_size(1).with_pre_fill(true),
        );
        assert!(matches!(result, Err(PoolError::Creation(_))));
    }

    #[test]
    fn test_invalid_configuration_fails_construction() {
        let result = ResourcePool::new(|| Ok(Conn::new()), config().with_max_size(0));
        assert!(matches!(result, Err(PoolError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_reset_failure_destroys_slot() {
        let pool = ResourcePool::new(
            || {
                Ok(Conn {
                    fail_reset: true,
                    ..Conn::new()
                })
            },
            config(),
        )
        .unwrap();

        assert!(matches!(pool.acquire(), Err(PoolError::Reset(_))));
        assert_eq!(pool.total_count(), 0);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_zero_retries_fails_immediately() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config().with_acquire_retry_count(0)).unwrap();

        let err = pool.acquire().unwrap_err();
        assert!(matches!(err, PoolError::RetriesExhausted(0)));
        assert_eq!(pool.total_count(), 0);
    }

    #[test]
    fn test_always_invalid_exhausts_retries() {
        #[derive(Debug)]
        struct Broken;

        impl PoolableResource for Broken {
            fn init(&mut self) -> Result<(), BoxError> {
                Ok(())
            }

            fn is_valid(&self) -> Result<bool, BoxError> {
                Ok(false)
            }

            fn destroy(&self) -> Result<(), BoxError> {
                Ok(())
            }
        }

        let pool = ResourcePool::new(|| Ok(Broken), config().with_acquire_retry_count(3)).unwrap();
        let err = pool.acquire().unwrap_err();
        assert!(err.is_acquire_timeout());

        let metrics = pool.metrics();
        assert_eq!(metrics.validation_failures, 3);
        assert_eq!(metrics.total_created, 3);
        assert_eq!(metrics.total_destroyed, 3);
        assert_eq!(pool.total_count(), 0);
    }

    #[test]
    fn test_release_after_destroy_all_is_ignored() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config()).unwrap();
        let conn = pool.acquire().unwrap();

        pool.destroy_all();
        assert!(!conn.is_valid().unwrap());
        assert_eq!(pool.total_count(), 0);

        pool.release(conn);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.metrics().unknown_releases, 1);
        assert_eq!(pool.metrics().total_destroyed, 1);
    }

    #[test]
    fn test_acquire_after_destroy_all_is_closed() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config()).unwrap();
        pool.destroy_all();
        pool.destroy_all();
        assert!(matches!(pool.acquire(), Err(PoolError::Closed)));
    }

    #[test]
    fn test_destroy_all_wakes_waiter() {
        let pool = Arc::new(
            ResourcePool::new(
                || Ok(Conn::new()),
                config().with_max_size(1).with_wait_timeout(Duration::from_secs(10)),
            )
            .unwrap(),
        );
        let _held = pool.acquire().unwrap();

        let waiter = Arc::clone(&pool);
        let handle = thread::spawn(move || waiter.acquire().map(|_| ()));
        thread::sleep(Duration::from_millis(50));
        pool.destroy_all();

        assert!(matches!(handle.join().unwrap(), Err(PoolError::Closed)));
    }

    #[test]
    fn test_waiter_replaces_invalid_released_resource() {
        let pool = Arc::new(
            ResourcePool::new(
                || Ok(Conn::new()),
                config().with_max_size(1).with_wait_timeout(Duration::from_secs(5)),
            )
            .unwrap(),
        );
        let held = pool.acquire().unwrap();

        let waiter = Arc::clone(&pool);
        let handle = thread::spawn(move || waiter.acquire().map(|conn| conn.slot_id()));
        thread::sleep(Duration::from_millis(50));

        // An invalid resource is destroyed by the next acquire that pops it.
        held.healthy.store(false, Ordering::SeqCst);
        let old_id = held.slot_id();
        drop(held);

        let new_id = handle.join().unwrap().unwrap();
        assert_ne!(new_id, old_id);
    }

    #[test]
    fn test_failed_replacement_leaves_pool_short() {
        let calls = Arc::new(AtomicU32::new(0));
        let factory_calls = Arc::clone(&calls);
        let pool = ResourcePool::new(
            move || match factory_calls.fetch_add(1, Ordering::SeqCst) {
                1 => Err("backend unavailable".into()),
                _ => Ok(Conn::new()),
            },
            config().with_reset_after_uses(1),
        )
        .unwrap();

        let conn = pool.acquire().unwrap();
        let old_id = conn.slot_id();
        pool.release(conn);

        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.total_count(), 0);
        let metrics = pool.metrics();
        assert_eq!(metrics.total_destroyed, 1);
        assert_eq!(metrics.total_replaced, 0);
        assert_eq!(metrics.total_released, 1);

        let conn = pool.acquire().unwrap();
        assert_ne!(conn.slot_id(), old_id);
        assert_eq!(pool.total_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_check_out_after_close_destroys_slot() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config()).unwrap();
        let slot = pool.inner.create_slot().unwrap();
        pool.inner.closed.store(true, Ordering::Release);

        assert!(matches!(pool.inner.check_out(slot), Err(PoolError::Closed)));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.total_count(), 0);
        assert_eq!(pool.metrics().total_destroyed, 1);
        assert_eq!(pool.metrics().total_acquired, 0);
    }

    #[test]
    fn test_destroy_all_during_acquires_leaves_nothing_live() {
        let pool = Arc::new(
            ResourcePool::new(
                || Ok(Conn::new()),
                config().with_max_size(4).with_wait_timeout(Duration::from_millis(20)),
            )
            .unwrap(),
        );

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    loop {
                        match pool.acquire() {
                            Ok(conn) => drop(conn),
                            Err(PoolError::Closed) => break,
                            Err(_) => {}
                        }
                    }
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(30));
        pool.destroy_all();
        for handle in handles {
            handle.join().unwrap();
        }

        let metrics = pool.metrics();
        assert_eq!(pool.total_count(), 0);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(metrics.total_created, metrics.total_destroyed);
    }

    #[tokio::test]
    async fn test_async_acquire() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config()).unwrap();

        let conn = pool.acquire_async().await.unwrap();
        assert_eq!(conn.usage_count(), 1);
        assert_eq!(pool.active_count(), 1);
    }

    #[tokio::test]
    async fn test_async_acquire_times_out() {
        let pool = ResourcePool::new(|| Ok(Conn::new()), config().with_max_size(1)).unwrap();
        let _held = pool.acquire_async().await.unwrap();

        let err = pool.acquire_async().await.unwrap_err();
        assert!(matches!(err, PoolError::Timeout(_)));
    }
}
