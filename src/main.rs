// resource-pool demo binary
// Run the fuller walkthrough with: cargo run --example basic

use resource_pool::{BoxError, PoolConfiguration, PoolableResource, ResourcePool};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct Handle {
    id: u64,
}

impl PoolableResource for Handle {
    fn init(&mut self) -> Result<(), BoxError> {
        tracing::info!(id = self.id, "opened handle");
        Ok(())
    }

    fn destroy(&self) -> Result<(), BoxError> {
        tracing::info!(id = self.id, "closed handle");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PoolConfiguration::new()
        .with_max_size(4)
        .with_min_size(2)
        .with_pre_fill(true)
        .with_idle_timeout(Duration::from_millis(200))
        .with_reset_after_uses(3);

    let pool = ResourcePool::new(
        || {
            Ok(Handle {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            })
        },
        config,
    )?;

    {
        let handle = pool.acquire()?;
        println!("Got handle {} (use #{})", handle.id, handle.usage_count());
    }

    let mut metrics: Vec<_> = pool.export_metrics().into_iter().collect();
    metrics.sort();
    for (key, value) in metrics {
        println!("  {key}: {value}");
    }

    pool.destroy_all();
    Ok(())
}
