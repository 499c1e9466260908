//! Error types for the resource pool

use std::time::Duration;

use thiserror::Error;

use crate::resource::BoxError;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Timed out after {0:?} waiting for an available resource")]
    Timeout(Duration),

    #[error("No valid resource obtained after {0} acquire attempts")]
    RetriesExhausted(u32),

    #[error("Failed to create resource")]
    Creation(#[source] BoxError),

    #[error("Failed to reset resource before hand-out")]
    Reset(#[source] BoxError),

    #[error("Invalid pool configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Pool has been shut down")]
    Closed,

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Failed to start background worker")]
    Spawn(#[source] std::io::Error),

    #[error("Failed to export metrics")]
    MetricsExport(#[source] BoxError),
}

impl PoolError {
    /// Whether this is the acquisition-timeout condition: either the wait
    /// budget elapsed or every attempt produced an invalid resource.
    pub fn is_acquire_timeout(&self) -> bool {
        matches!(self, PoolError::Timeout(_) | PoolError::RetriesExhausted(_))
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
