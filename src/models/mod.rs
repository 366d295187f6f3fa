//! Data models for conformance testing
//!
//! Declarative descriptions of conformance tests and the HTTP exchanges they
//! expect.

mod conformance;

pub use conformance::{ConformanceTest, ExpectedResponse, NamespacedName, Request, SupportedFeature};
