//! GatewayClass allocation
//!
//! Conformance tests running in parallel each need a GatewayClass of their
//! own when the controller under test cannot share one safely. An allocator
//! hands out GatewayClass names from a fixed set and takes them back when a
//! test is done.
//!
//! Two policies are provided:
//!
//! - [`SingleGatewayClassAllocator`] always returns the same class
//! - [`MultiGatewayClassAllocator`] hands out each class to at most one
//!   holder at a time and fails fast once the pool is exhausted
//!
//! Tests normally hold an [`AllocatedGatewayClass`], which frees the class
//! when it goes out of scope.

mod error;
mod guard;
mod multi;
mod single;

pub use error::AllocatorError;
pub use guard::AllocatedGatewayClass;
pub use multi::MultiGatewayClassAllocator;
pub use single::SingleGatewayClassAllocator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Allocates a GatewayClass for Gateways.
pub trait GatewayClassAllocator: Send + Sync {
    /// Allocate a GatewayClass for exclusive use until it is freed
    fn allocate(&self) -> Result<String, AllocatorError>;

    /// Return a previously allocated GatewayClass to the pool
    fn free(&self, gateway_class: &str) -> Result<(), AllocatorError>;

    /// All GatewayClasses this allocator can hand out, in scan order
    fn gateway_classes(&self) -> Vec<String>;
}

/// How GatewayClasses are shared between parallel tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPolicy {
    /// Every test uses the same GatewayClass
    #[default]
    Single,
    /// Each test holds a GatewayClass exclusively
    Pool,
}

impl AllocationPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "shared" => Some(AllocationPolicy::Single),
            "pool" | "multi" | "exclusive" => Some(AllocationPolicy::Pool),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AllocationPolicy::Single => "single",
            AllocationPolicy::Pool => "pool",
        }
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build the allocator for `policy` over `gateway_classes`
pub fn new_allocator(
    policy: AllocationPolicy,
    gateway_classes: Vec<String>,
) -> Result<Arc<dyn GatewayClassAllocator>, AllocatorError> {
    match policy {
        AllocationPolicy::Single => match <[String; 1]>::try_from(gateway_classes) {
            Ok([gateway_class]) => Ok(Arc::new(SingleGatewayClassAllocator::new(gateway_class))),
            Err(classes) => Err(AllocatorError::InvalidPool(format!(
                "single policy needs exactly one GatewayClass, got {}",
                classes.len()
            ))),
        },
        AllocationPolicy::Pool => {
            if gateway_classes.is_empty() {
                return Err(AllocatorError::InvalidPool(
                    "pool policy needs at least one GatewayClass".to_string(),
                ));
            }
            Ok(Arc::new(MultiGatewayClassAllocator::new(gateway_classes)))
        }
    }
}
