//! Lifecycle contract implemented by pooled resource types

/// Error type returned by resource hooks and factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Factory producing fresh, not yet initialised resources.
pub type ResourceFactory<R> = dyn Fn() -> Result<R, BoxError> + Send + Sync;

/// A resource that can be managed by a [`ResourcePool`](crate::ResourcePool).
///
/// Once created, an instance is shared between its pool slot and the caller
/// holding it, so every hook after [`init`](Self::init) takes `&self`.
///
/// # Examples
///
/// ```
/// use resource_pool::{BoxError, PoolableResource};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Session {
///     open: AtomicBool,
/// }
///
/// impl PoolableResource for Session {
///     fn init(&mut self) -> Result<(), BoxError> {
///         self.open = AtomicBool::new(true);
///         Ok(())
///     }
///
///     fn is_valid(&self) -> Result<bool, BoxError> {
///         Ok(self.open.load(Ordering::Acquire))
///     }
///
///     fn destroy(&self) -> Result<(), BoxError> {
///         self.open.store(false, Ordering::Release);
///         Ok(())
///     }
/// }
/// ```
pub trait PoolableResource: Send + Sync + 'static {
    /// Called exactly once, right after construction.
    fn init(&mut self) -> Result<(), BoxError>;

    /// Called on every successful acquire, before the caller sees the resource.
    fn reset(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Health check run under the pool's validation deadline.
    ///
    /// An `Err` or a panic counts as invalid.
    fn is_valid(&self) -> Result<bool, BoxError> {
        Ok(true)
    }

    /// Called exactly once when the pool permanently discards the resource.
    /// Errors are logged and otherwise ignored.
    fn destroy(&self) -> Result<(), BoxError>;
}
