//! Conformance test registry
//!
//! Every declared conformance test, in the order a runner should schedule
//! them.

mod listener_isolation;

use listener_isolation::gateway_http_listener_isolation;

use crate::models::{ConformanceTest, SupportedFeature};

/// Namespace holding the shared Gateway and backends
pub const INFRA_NAMESPACE: &str = "gateway-conformance-infra";

/// All declared conformance tests
pub fn all() -> Vec<ConformanceTest> {
    vec![gateway_http_listener_isolation()]
}

/// Look up a test by its short name, ignoring case
pub fn find(short_name: &str) -> Option<ConformanceTest> {
    all()
        .into_iter()
        .find(|t| t.short_name.eq_ignore_ascii_case(short_name))
}

/// Tests runnable against an implementation supporting `features`
pub fn supported(features: &[SupportedFeature]) -> Vec<ConformanceTest> {
    all()
        .into_iter()
        .filter(|t| t.is_supported_by(features))
        .collect()
}
