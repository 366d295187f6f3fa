//! Allocator errors

use thiserror::Error;

/// Errors surfaced by a [`GatewayClassAllocator`](super::GatewayClassAllocator).
///
/// Every variant is a caller defect: too few GatewayClasses for the requested
/// parallelism, or a broken allocate/free pairing. None of them is retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocatorError {
    #[error("no GatewayClass available (all {pool_size} allocated)")]
    Exhausted { pool_size: usize },

    #[error("GatewayClass {0} is not allocated")]
    NotAllocated(String),

    #[error("invalid GatewayClass pool: {0}")]
    InvalidPool(String),
}
