//! Metrics collection and export for resource pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Point-in-time snapshot of a pool
///
/// # Examples
///
/// ```
/// use resource_pool::{BoxError, PoolConfiguration, PoolableResource, ResourcePool};
///
/// struct Handle;
///
/// impl PoolableResource for Handle {
///     fn init(&mut self) -> Result<(), BoxError> { Ok(()) }
///     fn destroy(&self) -> Result<(), BoxError> { Ok(()) }
/// }
///
/// let config = PoolConfiguration::new().with_max_size(4).with_min_size(2).with_pre_fill(true);
/// let pool = ResourcePool::new(|| Ok(Handle), config).unwrap();
///
/// let metrics = pool.metrics();
/// assert_eq!(metrics.idle, 2);
/// assert_eq!(metrics.active, 0);
/// assert_eq!(metrics.total, 2);
/// assert_eq!(metrics.max_size, 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PoolMetrics {
    /// Resources waiting in the idle collection
    pub idle: usize,

    /// Resources checked out to callers
    pub active: usize,

    /// Live resources, including any being validated
    pub total: usize,

    /// Configured capacity
    pub max_size: usize,

    /// Whether usage-based replacement is enabled
    pub reset_on_release: bool,

    /// Usage count that triggers replacement
    pub reset_after_uses: u32,

    /// Active resources relative to capacity (0.0 to 1.0)
    pub utilization: f64,

    /// Successful acquisitions
    pub total_acquired: usize,

    /// Successful releases back to the pool
    pub total_released: usize,

    /// Resources created
    pub total_created: usize,

    /// Resources destroyed, for any reason
    pub total_destroyed: usize,

    /// Resources destroyed by the idle eviction task
    pub total_evicted: usize,

    /// Resources replaced after reaching the usage threshold
    pub total_replaced: usize,

    /// Health checks that failed, errored or timed out
    pub validation_failures: usize,

    /// Acquisitions that failed with a timeout condition
    pub acquire_timeouts: usize,

    /// Releases of resources the pool did not recognise
    pub unknown_releases: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("idle".to_string(), self.idle.to_string());
        metrics.insert("active".to_string(), self.active.to_string());
        metrics.insert("total_max".to_string(), format!("{} / {}", self.total, self.max_size));
        metrics.insert("reset_on_release".to_string(), self.reset_on_release.to_string());
        metrics.insert("reset_after_uses".to_string(), self.reset_after_uses.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("total_destroyed".to_string(), self.total_destroyed.to_string());
        metrics.insert("total_evicted".to_string(), self.total_evicted.to_string());
        metrics.insert("total_replaced".to_string(), self.total_replaced.to_string());
        metrics.insert("validation_failures".to_string(), self.validation_failures.to_string());
        metrics.insert("acquire_timeouts".to_string(), self.acquire_timeouts.to_string());
        metrics.insert("unknown_releases".to_string(), self.unknown_releases.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
#[cfg(feature = "metrics")]
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// Every sample carries a `pool` label plus any extra `tags`.
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> crate::PoolResult<String> {
        Self::encode(metrics, pool_name, tags)
            .map_err(|error| crate::PoolError::MetricsExport(Box::new(error)))
    }

    fn encode(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> prometheus::Result<String> {
        use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Opts, Registry, TextEncoder};

        let registry = Registry::new();
        let opts = |name: &str, help: &str| {
            Opts::new(name, help)
                .const_labels(tags.cloned().unwrap_or_default())
                .const_label("pool", pool_name)
        };

        let gauges = [
            ("resourcepool_resources_idle", "Idle resources", metrics.idle),
            ("resourcepool_resources_active", "Resources checked out", metrics.active),
            ("resourcepool_resources_total", "Live resources", metrics.total),
            ("resourcepool_resources_max", "Configured capacity", metrics.max_size),
        ];
        for (name, help, value) in gauges {
            let gauge = IntGauge::with_opts(opts(name, help))?;
            gauge.set(value as i64);
            registry.register(Box::new(gauge))?;
        }

        let utilization = Gauge::with_opts(opts("resourcepool_utilization", "Pool utilization ratio"))?;
        utilization.set(metrics.utilization);
        registry.register(Box::new(utilization))?;

        let counters = [
            ("resourcepool_acquired_total", "Successful acquisitions", metrics.total_acquired),
            ("resourcepool_released_total", "Releases back to the pool", metrics.total_released),
            ("resourcepool_created_total", "Resources created", metrics.total_created),
            ("resourcepool_destroyed_total", "Resources destroyed", metrics.total_destroyed),
            ("resourcepool_evicted_total", "Idle resources evicted", metrics.total_evicted),
            ("resourcepool_replaced_total", "Resources replaced after reaching the usage limit", metrics.total_replaced),
            ("resourcepool_validation_failures_total", "Failed health checks", metrics.validation_failures),
            ("resourcepool_acquire_timeouts_total", "Timed out acquisitions", metrics.acquire_timeouts),
            ("resourcepool_unknown_releases_total", "Releases of unknown resources", metrics.unknown_releases),
        ];
        for (name, help, value) in counters {
            let counter = IntCounter::with_opts(opts(name, help))?;
            counter.inc_by(value as u64);
            registry.register(Box::new(counter))?;
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Internal lifetime counters
#[derive(Default)]
pub(crate) struct MetricsTracker {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub created: AtomicUsize,
    pub destroyed: AtomicUsize,
    pub evicted: AtomicUsize,
    pub replaced: AtomicUsize,
    pub validation_failures: AtomicUsize,
    pub acquire_timeouts: AtomicUsize,
    pub unknown_releases: AtomicUsize,
}

/// Current sizes and settings the tracker combines with its counters.
pub(crate) struct Gauges {
    pub idle: usize,
    pub active: usize,
    pub total: usize,
    pub max_size: usize,
    pub reset_on_release: bool,
    pub reset_after_uses: u32,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, gauges: Gauges) -> PoolMetrics {
        let utilization = if gauges.max_size > 0 {
            gauges.active as f64 / gauges.max_size as f64
        } else {
            0.0
        };

        PoolMetrics {
            idle: gauges.idle,
            active: gauges.active,
            total: gauges.total,
            max_size: gauges.max_size,
            reset_on_release: gauges.reset_on_release,
            reset_after_uses: gauges.reset_after_uses,
            utilization,
            total_acquired: self.acquired.load(Ordering::Relaxed),
            total_released: self.released.load(Ordering::Relaxed),
            total_created: self.created.load(Ordering::Relaxed),
            total_destroyed: self.destroyed.load(Ordering::Relaxed),
            total_evicted: self.evicted.load(Ordering::Relaxed),
            total_replaced: self.replaced.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            acquire_timeouts: self.acquire_timeouts.load(Ordering::Relaxed),
            unknown_releases: self.unknown_releases.load(Ordering::Relaxed),
        }
    }
}
