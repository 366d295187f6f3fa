//! Parallel GatewayClass assignment
//!
//! Spawns one task per worker the way a parallel conformance run would, lets
//! each one acquire a GatewayClass for its test, and holds every allocation
//! until all workers have tried, so the pool sees the full contention of the
//! run.

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Barrier;
use tracing::{debug, info, warn};

use crate::allocator::{AllocatedGatewayClass, AllocatorError, GatewayClassAllocator};
use crate::models::ConformanceTest;
use crate::utils::Timer;

/// Outcome for a single worker
#[derive(Clone, Debug, Serialize)]
pub struct WorkerAssignment {
    pub worker: usize,
    pub test: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerAssignment {
    pub fn is_allocated(&self) -> bool {
        self.gateway_class.is_some()
    }
}

/// Assignment of GatewayClasses to every worker of a run
#[derive(Clone, Debug, Serialize)]
pub struct AssignmentReport {
    pub policy: String,
    pub gateway_classes: Vec<String>,
    pub workers: usize,
    pub assignments: Vec<WorkerAssignment>,
    pub duration_ms: u64,
}

impl AssignmentReport {
    pub fn allocated(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_allocated()).count()
    }

    /// Workers that hit any allocator error, including a failed free
    pub fn failed(&self) -> usize {
        self.assignments.iter().filter(|a| a.error.is_some()).count()
    }
}

/// Parallel assignment executor
pub struct ParallelExecutor {
    workers: usize,
}

impl ParallelExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Assign a GatewayClass to each worker, worker `i` running `tests[i % len]`
    pub async fn assign(
        &self,
        allocator: Arc<dyn GatewayClassAllocator>,
        tests: &[ConformanceTest],
        policy: &str,
    ) -> Result<AssignmentReport> {
        if tests.is_empty() {
            anyhow::bail!("No conformance tests to assign");
        }

        info!(
            "Assigning GatewayClasses to {} workers ({} policy)",
            self.workers, policy
        );

        let timer = Timer::start();
        let barrier = Arc::new(Barrier::new(self.workers));
        let mut handles = Vec::with_capacity(self.workers);

        for worker in 0..self.workers {
            let allocator = allocator.clone();
            let barrier = barrier.clone();
            let test = tests[worker % tests.len()].short_name.clone();

            let handle = tokio::spawn(async move {
                let allocation = AllocatedGatewayClass::acquire(allocator);

                // Hold the class until every worker has tried to allocate.
                barrier.wait().await;

                match allocation {
                    Ok(held) => {
                        let gateway_class = held.name().to_string();
                        debug!("Worker {} ({}) holds {}", worker, test, gateway_class);
                        let released = held.release();
                        assignment(worker, test, Ok(gateway_class), released)
                    }
                    Err(e) => {
                        warn!("Worker {} ({}) got no GatewayClass: {}", worker, test, e);
                        assignment(worker, test, Err(e), Ok(()))
                    }
                }
            });

            handles.push(handle);
        }

        let mut assignments = Vec::with_capacity(self.workers);
        for result in join_all(handles).await {
            assignments.push(result?);
        }
        assignments.sort_by_key(|a| a.worker);

        let report = AssignmentReport {
            policy: policy.to_string(),
            gateway_classes: allocator.gateway_classes(),
            workers: self.workers,
            assignments,
            duration_ms: timer.elapsed_ms(),
        };

        info!(
            "Assignment completed in {}ms - Allocated: {}/{}",
            report.duration_ms,
            report.allocated(),
            report.workers
        );

        Ok(report)
    }
}

fn assignment(
    worker: usize,
    test: String,
    allocated: Result<String, AllocatorError>,
    released: Result<(), AllocatorError>,
) -> WorkerAssignment {
    match (allocated, released) {
        (Ok(gateway_class), Ok(())) => WorkerAssignment {
            worker,
            test,
            gateway_class: Some(gateway_class),
            error: None,
        },
        (Ok(gateway_class), Err(e)) => WorkerAssignment {
            worker,
            test,
            gateway_class: Some(gateway_class),
            error: Some(e.to_string()),
        },
        (Err(e), _) => WorkerAssignment {
            worker,
            test,
            gateway_class: None,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::allocator::{new_allocator, AllocationPolicy};
    use crate::suite;
    use std::collections::HashSet;

    fn classes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("gc-{i}")).collect()
    }

    #[test]
    fn test_executor_creation() {
        assert_eq!(ParallelExecutor::new(8).workers, 8);
        assert_eq!(ParallelExecutor::new(0).workers, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_assigns_distinct_classes() {
        let allocator = new_allocator(AllocationPolicy::Pool, classes(4)).unwrap();

        let report = ParallelExecutor::new(4)
            .assign(allocator.clone(), &suite::all(), "pool")
            .await
            .unwrap();

        assert_eq!(report.allocated(), 4);
        assert_eq!(report.failed(), 0);

        let held: HashSet<_> = report
            .assignments
            .iter()
            .filter_map(|a| a.gateway_class.clone())
            .collect();
        assert_eq!(held.len(), 4);

        // Everything was handed back.
        for _ in 0..4 {
            allocator.allocate().unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_reports_exhaustion() {
        let allocator = new_allocator(AllocationPolicy::Pool, classes(2)).unwrap();

        let report = ParallelExecutor::new(3)
            .assign(allocator, &suite::all(), "pool")
            .await
            .unwrap();

        assert_eq!(report.allocated(), 2);
        assert_eq!(report.failed(), 1);

        let failed = report.assignments.iter().find(|a| !a.is_allocated()).unwrap();
        assert_eq!(
            failed.error.as_deref(),
            Some("no GatewayClass available (all 2 allocated)")
        );
    }

    #[tokio::test]
    async fn test_single_shares_class() {
        let allocator =
            new_allocator(AllocationPolicy::Single, vec!["shared".to_string()]).unwrap();

        let report = ParallelExecutor::new(3)
            .assign(allocator, &suite::all(), "single")
            .await
            .unwrap();

        assert_eq!(report.allocated(), 3);
        assert!(report
            .assignments
            .iter()
            .all(|a| a.gateway_class.as_deref() == Some("shared")));
    }

    #[test]
    fn test_failed_free_counts_as_failure() {
        let worker = assignment(
            0,
            "GatewayHTTPListenerIsolation".to_string(),
            Ok("a".to_string()),
            Err(AllocatorError::NotAllocated("a".to_string())),
        );
        assert!(worker.is_allocated());
        assert_eq!(
            worker.error.as_deref(),
            Some("GatewayClass a is not allocated")
        );

        let report = AssignmentReport {
            policy: "pool".to_string(),
            gateway_classes: vec!["a".to_string()],
            workers: 1,
            assignments: vec![worker],
            duration_ms: 0,
        };
        assert_eq!(report.allocated(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn test_no_tests() {
        let allocator = new_allocator(AllocationPolicy::Pool, classes(1)).unwrap();
        assert!(ParallelExecutor::new(1)
            .assign(allocator, &[], "pool")
            .await
            .is_err());
    }
}
