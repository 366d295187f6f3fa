//! Exclusive GatewayClass allocation from a fixed pool

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use super::{AllocatorError, GatewayClassAllocator};

/// Allocates GatewayClasses from a fixed list.
///
/// An allocation makes the class unavailable until it is freed. Every call to
/// `allocate` scans the list from the front, so the first free class in
/// construction order always wins.
#[derive(Debug)]
pub struct MultiGatewayClassAllocator {
    gateway_classes: Vec<String>,
    allocations: Mutex<HashSet<String>>,
}

impl MultiGatewayClassAllocator {
    pub fn new<I, S>(gateway_classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gateway_classes: Vec<String> = gateway_classes.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        for gc in &gateway_classes {
            if !seen.insert(gc.as_str()) {
                warn!("GatewayClass {} appears more than once in the pool", gc);
            }
        }

        Self {
            gateway_classes,
            allocations: Mutex::new(HashSet::new()),
        }
    }

    #[cfg(test)]
    pub fn allocated(&self) -> usize {
        self.lock().len()
    }

    // The set only changes through single insert/remove calls, so a poisoned
    // lock still guards a consistent set.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.allocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GatewayClassAllocator for MultiGatewayClassAllocator {
    fn allocate(&self) -> Result<String, AllocatorError> {
        let mut allocations = self.lock();

        for gc in &self.gateway_classes {
            if allocations.contains(gc) {
                continue;
            }

            allocations.insert(gc.clone());
            debug!("Allocated GatewayClass {}", gc);
            return Ok(gc.clone());
        }

        Err(AllocatorError::Exhausted {
            pool_size: self.gateway_classes.len(),
        })
    }

    fn free(&self, gateway_class: &str) -> Result<(), AllocatorError> {
        if !self.lock().remove(gateway_class) {
            return Err(AllocatorError::NotAllocated(gateway_class.to_string()));
        }

        debug!("Freed GatewayClass {}", gateway_class);
        Ok(())
    }

    fn gateway_classes(&self) -> Vec<String> {
        self.gateway_classes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_allocates_in_order() {
        let allocator = MultiGatewayClassAllocator::new(["a", "b", "c"]);
        assert_eq!(allocator.allocate().unwrap(), "a");
        assert_eq!(allocator.allocate().unwrap(), "b");
        assert_eq!(allocator.allocate().unwrap(), "c");
        assert_eq!(allocator.allocated(), 3);
    }

    #[test]
    fn test_distinct_until_exhausted() {
        for size in 1..=8 {
            let classes: Vec<String> = (0..size).map(|i| format!("gc-{i}")).collect();
            let allocator = MultiGatewayClassAllocator::new(classes.clone());

            let mut seen = HashSet::new();
            for _ in 0..size {
                let gc = allocator.allocate().unwrap();
                assert!(classes.contains(&gc));
                assert!(seen.insert(gc));
            }

            assert_eq!(
                allocator.allocate(),
                Err(AllocatorError::Exhausted { pool_size: size })
            );
        }
    }

    #[test]
    fn test_free_then_reallocate_first_free() {
        let allocator = MultiGatewayClassAllocator::new(["a", "b", "c"]);
        assert_eq!(allocator.allocate().unwrap(), "a");
        assert_eq!(allocator.allocate().unwrap(), "b");
        allocator.free("a").unwrap();
        assert_eq!(allocator.allocate().unwrap(), "a");
        assert_eq!(allocator.allocate().unwrap(), "c");
        assert!(matches!(
            allocator.allocate(),
            Err(AllocatorError::Exhausted { pool_size: 3 })
        ));
    }

    #[test]
    fn test_scan_restarts_from_front() {
        let allocator = MultiGatewayClassAllocator::new(["a", "b", "c"]);
        allocator.allocate().unwrap();
        allocator.allocate().unwrap();
        allocator.allocate().unwrap();
        allocator.free("c").unwrap();
        allocator.free("a").unwrap();
        assert_eq!(allocator.allocate().unwrap(), "a");
        assert_eq!(allocator.allocate().unwrap(), "c");
    }

    #[test]
    fn test_free_never_allocated() {
        let allocator = MultiGatewayClassAllocator::new(["a", "b"]);
        assert_eq!(
            allocator.free("a"),
            Err(AllocatorError::NotAllocated("a".to_string()))
        );
        assert_eq!(
            allocator.free("unknown"),
            Err(AllocatorError::NotAllocated("unknown".to_string()))
        );
    }

    #[test]
    fn test_double_free() {
        let allocator = MultiGatewayClassAllocator::new(["a", "b"]);
        let gc = allocator.allocate().unwrap();
        allocator.free(&gc).unwrap();
        assert_eq!(
            allocator.free(&gc),
            Err(AllocatorError::NotAllocated(gc.clone()))
        );
        assert_eq!(allocator.allocated(), 0);
    }

    #[test]
    fn test_empty_pool_is_exhausted() {
        let allocator = MultiGatewayClassAllocator::new(Vec::<String>::new());
        assert_eq!(
            allocator.allocate(),
            Err(AllocatorError::Exhausted { pool_size: 0 })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AllocatorError::Exhausted { pool_size: 2 }.to_string(),
            "no GatewayClass available (all 2 allocated)"
        );
        assert_eq!(
            AllocatorError::NotAllocated("eg".to_string()).to_string(),
            "GatewayClass eg is not allocated"
        );
    }

    #[test]
    fn test_concurrent_threads_get_distinct_classes() {
        let classes: Vec<String> = (0..16).map(|i| format!("gc-{i}")).collect();
        let allocator = Arc::new(MultiGatewayClassAllocator::new(classes));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let allocator = allocator.clone();
                std::thread::spawn(move || allocator.allocate())
            })
            .collect();

        let allocated: HashSet<String> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        assert_eq!(allocated.len(), 16);
        assert!(matches!(
            allocator.allocate(),
            Err(AllocatorError::Exhausted { pool_size: 16 })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_observe_exhaustion() {
        let k = 8;
        let classes: Vec<String> = (0..k).map(|i| format!("gc-{i}")).collect();
        let allocator = Arc::new(MultiGatewayClassAllocator::new(classes));

        let handles: Vec<_> = (0..=k)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move { allocator.allocate() })
            })
            .collect();

        let results: Vec<_> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let granted: Vec<String> = results.iter().filter_map(|r| r.clone().ok()).collect();
        let distinct: HashSet<&String> = granted.iter().collect();
        let exhausted = results
            .iter()
            .filter(|r| matches!(r, Err(AllocatorError::Exhausted { .. })))
            .count();

        assert_eq!(granted.len(), k);
        assert_eq!(distinct.len(), k);
        assert_eq!(exhausted, 1);
    }
}
