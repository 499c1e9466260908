//! # resource_pool
//!
//! Thread-safe pool for expensive resources such as connections, handles
//! or workers.
//!
//! ## Features
//!
//! - Bounded capacity with on-demand creation under contention
//! - Blocking acquire with a wait timeout, plus an async variant
//! - Health checks bounded by a deadline, failing closed
//! - Retry with replacement when a pooled resource turns out invalid
//! - Usage-based replacement after a configured number of acquisitions
//! - Background eviction of idle resources above a minimum floor
//! - Automatic release via RAII (Drop trait)
//! - Metrics snapshot and Prometheus export
//!
//! ## Quick Start
//!
//! ```rust
//! use resource_pool::{BoxError, PoolConfiguration, PoolableResource, ResourcePool};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! struct Connection {
//!     queries: AtomicU32,
//! }
//!
//! impl PoolableResource for Connection {
//!     fn init(&mut self) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//!
//!     fn reset(&self) -> Result<(), BoxError> {
//!         self.queries.store(0, Ordering::Relaxed);
//!         Ok(())
//!     }
//!
//!     fn destroy(&self) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! let config = PoolConfiguration::new().with_max_size(4).with_min_size(1);
//! let pool = ResourcePool::new(|| Ok(Connection { queries: AtomicU32::new(0) }), config)?;
//! {
//!     let conn = pool.acquire()?;
//!     conn.queries.fetch_add(1, Ordering::Relaxed);
//!     // Returned to the pool when `conn` goes out of scope
//! }
//! assert_eq!(pool.idle_count(), 1);
//! # Ok::<(), resource_pool::PoolError>(())
//! ```

mod config;
mod errors;
mod eviction;
mod metrics;
mod pool;
mod resource;
mod slot;
mod validation;

pub use config::PoolConfiguration;
pub use errors::{PoolError, PoolResult};
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use metrics::PoolMetrics;
pub use pool::{PooledResource, ResourcePool};
pub use resource::{BoxError, PoolableResource, ResourceFactory};
