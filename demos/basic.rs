//! Basic usage examples for ResourcePool

use resource_pool::{BoxError, PoolConfiguration, PoolError, PoolableResource, ResourcePool};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct Connection {
    id: u64,
    open: AtomicBool,
}

impl Connection {
    fn connect() -> Result<Self, BoxError> {
        Ok(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            open: AtomicBool::new(false),
        })
    }
}

impl PoolableResource for Connection {
    fn init(&mut self) -> Result<(), BoxError> {
        self.open = AtomicBool::new(true);
        Ok(())
    }

    fn is_valid(&self) -> Result<bool, BoxError> {
        Ok(self.open.load(Ordering::Acquire))
    }

    fn destroy(&self) -> Result<(), BoxError> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }
}

fn main() -> Result<(), PoolError> {
    println!("=== ResourcePool - Basic Examples ===\n");

    // Example 1: Acquire and release
    simple_pool()?;

    // Example 2: Exhausting the pool
    exhausted_pool()?;

    // Example 3: Usage-based replacement
    usage_replacement()?;

    // Example 4: Metrics
    metrics()?;

    Ok(())
}

fn simple_pool() -> Result<(), PoolError> {
    println!("1. Simple Pool:");
    let config = PoolConfiguration::new().with_max_size(4).with_min_size(2).with_pre_fill(true);
    let pool = ResourcePool::new(Connection::connect, config)?;

    {
        let conn = pool.acquire()?;
        println!("   Got connection: {}", conn.id);
        // Released automatically when dropped
    }

    println!("   Idle after return: {}\n", pool.idle_count());
    Ok(())
}

fn exhausted_pool() -> Result<(), PoolError> {
    println!("2. Exhausted Pool:");
    let config = PoolConfiguration::new()
        .with_max_size(1)
        .with_wait_timeout(Duration::from_millis(100));
    let pool = ResourcePool::new(Connection::connect, config)?;

    let _held = pool.acquire()?;
    match pool.acquire() {
        Ok(_) => println!("   Unexpectedly got a second connection"),
        Err(error) => println!("   Second acquire failed: {error}"),
    }
    println!();
    Ok(())
}

fn usage_replacement() -> Result<(), PoolError> {
    println!("3. Usage-based Replacement:");
    let config = PoolConfiguration::new().with_max_size(1).with_reset_after_uses(2);
    let pool = ResourcePool::new(Connection::connect, config)?;

    for _ in 0..3 {
        let conn = pool.acquire()?;
        println!("   Connection {} on use #{}", conn.id, conn.usage_count());
        pool.release(conn);
    }
    println!();
    Ok(())
}

fn metrics() -> Result<(), PoolError> {
    println!("4. Metrics:");
    let pool = ResourcePool::new(Connection::connect, PoolConfiguration::new().with_max_size(5))?;

    let _first = pool.acquire()?;
    let _second = pool.acquire()?;

    let mut metrics: Vec<_> = pool.export_metrics().into_iter().collect();
    metrics.sort();
    for (key, value) in metrics {
        println!("     {}: {}", key, value);
    }

    println!("\n{}", pool.export_metrics_prometheus("demo", None)?);
    Ok(())
}
