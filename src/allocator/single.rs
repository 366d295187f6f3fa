//! Single GatewayClass allocation

use super::{AllocatorError, GatewayClassAllocator};

/// Always allocates the same GatewayClass.
///
/// The class counts as allocatable no matter how many times `allocate` is
/// called, so sequential suites can share it without freeing.
#[derive(Clone, Debug)]
pub struct SingleGatewayClassAllocator {
    gateway_class: String,
}

impl SingleGatewayClassAllocator {
    pub fn new(gateway_class: impl Into<String>) -> Self {
        Self {
            gateway_class: gateway_class.into(),
        }
    }
}

impl GatewayClassAllocator for SingleGatewayClassAllocator {
    fn allocate(&self) -> Result<String, AllocatorError> {
        Ok(self.gateway_class.clone())
    }

    fn free(&self, _gateway_class: &str) -> Result<(), AllocatorError> {
        Ok(())
    }

    fn gateway_classes(&self) -> Vec<String> {
        vec![self.gateway_class.clone()]
    }
}
