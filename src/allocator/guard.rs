//! Scoped GatewayClass allocation

use std::sync::Arc;

use tracing::error;

use super::{AllocatorError, GatewayClassAllocator};

/// A GatewayClass held for the lifetime of this guard.
///
/// Dropping the guard frees the class, so a test that fails or panics part
/// way through still hands its class back to the pool.
pub struct AllocatedGatewayClass {
    allocator: Arc<dyn GatewayClassAllocator>,
    name: Option<String>,
}

impl AllocatedGatewayClass {
    /// Allocate a GatewayClass from `allocator`
    pub fn acquire(allocator: Arc<dyn GatewayClassAllocator>) -> Result<Self, AllocatorError> {
        let name = allocator.allocate()?;
        Ok(Self {
            allocator,
            name: Some(name),
        })
    }

    /// Name of the held GatewayClass
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Free the class now, surfacing any error from the allocator
    pub fn release(mut self) -> Result<(), AllocatorError> {
        match self.name.take() {
            Some(name) => self.allocator.free(&name),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for AllocatedGatewayClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocatedGatewayClass")
            .field("name", &self.name)
            .finish()
    }
}

impl Drop for AllocatedGatewayClass {
    fn drop(&mut self) {
        let Some(name) = self.name.take() else {
            return;
        };

        if let Err(e) = self.allocator.free(&name) {
            if std::thread::panicking() {
                error!("Failed to free GatewayClass {} during unwind: {}", name, e);
            } else {
                panic!("failed to free GatewayClass {name}: {e}");
            }
        }
    }
}
