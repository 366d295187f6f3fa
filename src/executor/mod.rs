//! Worker execution
//!
//! Runs parallel workers against a GatewayClass allocator.

mod parallel;

pub use parallel::{AssignmentReport, ParallelExecutor, WorkerAssignment};
