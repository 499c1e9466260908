//! Pool configuration options

use std::time::Duration;

use crate::errors::{PoolError, PoolResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for resource pool behavior
///
/// # Examples
///
/// ```
/// use resource_pool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_max_size(4)
///     .with_min_size(2)
///     .with_wait_timeout(Duration::from_millis(200))
///     .with_reset_after_uses(3);
///
/// assert_eq!(config.max_size, 4);
/// assert!(config.reset_on_release);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfiguration {
    /// Hard ceiling on live resources (idle + in use)
    pub max_size: usize,

    /// Number of idle resources eviction never goes below
    pub min_size: usize,

    /// Idle time after which a resource may be evicted; also the eviction
    /// period. Zero disables eviction.
    pub idle_timeout: Duration,

    /// Longest time a single acquire attempt blocks waiting for a resource
    pub wait_timeout: Duration,

    /// Deadline for a single health check. Zero fails every check.
    pub validation_timeout: Duration,

    /// Number of acquire attempts made when resources turn out invalid
    pub acquire_retry_count: u32,

    /// Whether resources are replaced after `reset_after_uses` acquisitions
    pub reset_on_release: bool,

    /// Usage count at which a released resource is replaced
    pub reset_after_uses: u32,

    /// Whether `min_size` resources are created when the pool is built
    pub pre_fill: bool,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_size: 1,
            idle_timeout: Duration::from_secs(30),
            wait_timeout: Duration::from_secs(30),
            validation_timeout: Duration::from_secs(5),
            acquire_retry_count: 3,
            reset_on_release: false,
            reset_after_uses: 0,
            pre_fill: false,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum pool size
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Set the minimum number of idle resources kept through eviction
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self
    }

    /// Set idle timeout (and eviction period)
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set how long an acquire attempt may wait
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Set the health check deadline
    pub fn with_validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = timeout;
        self
    }

    /// Set the number of acquire attempts
    pub fn with_acquire_retry_count(mut self, count: u32) -> Self {
        self.acquire_retry_count = count;
        self
    }

    /// Enable usage-based replacement after `uses` acquisitions
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_pool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::new().with_reset_after_uses(5);
    ///
    /// assert!(config.reset_on_release);
    /// assert_eq!(config.reset_after_uses, 5);
    /// ```
    pub fn with_reset_after_uses(mut self, uses: u32) -> Self {
        self.reset_on_release = true;
        self.reset_after_uses = uses;
        self
    }

    /// Create `min_size` resources eagerly when the pool is built
    pub fn with_pre_fill(mut self, pre_fill: bool) -> Self {
        self.pre_fill = pre_fill;
        self
    }

    /// Check the size invariants the pool depends on.
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_size == 0 {
            return Err(PoolError::InvalidConfiguration(
                "max_size must be greater than 0".to_string(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(PoolError::InvalidConfiguration(format!(
                "min_size ({}) must not exceed max_size ({})",
                self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PoolConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.acquire_retry_count, 3);
        assert!(!config.reset_on_release);
        assert!(!config.pre_fill);
    }

    #[test]
    fn test_rejects_zero_max_size() {
        let err = PoolConfiguration::new().with_max_size(0).with_min_size(0).validate();
        assert!(matches!(err, Err(PoolError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_min_above_max() {
        let err = PoolConfiguration::new()
            .with_max_size(2)
            .with_min_size(3)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("min_size (3)"));
    }

    #[test]
    fn test_min_equal_to_max_is_allowed() {
        let config = PoolConfiguration::new().with_max_size(3).with_min_size(3);
        assert!(config.validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PoolConfiguration =
            serde_json::from_str(r#"{ "max_size": 4, "pre_fill": true }"#).unwrap();
        assert_eq!(config.max_size, 4);
        assert!(config.pre_fill);
        assert_eq!(config.min_size, 1);
        assert_eq!(config.wait_timeout, Duration::from_secs(30));
    }
}
