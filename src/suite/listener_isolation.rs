//! Listener isolation for HTTP Listeners

use crate::models::{
    ConformanceTest, ExpectedResponse, NamespacedName, Request, SupportedFeature,
};

use super::INFRA_NAMESPACE;

/// Listener isolation for HTTP Listeners with multiple Listeners and HTTPRoutes.
///
/// Each HTTPRoute attaches to a single Listener of the Gateway. Requests for
/// `bar.com` only match the Listener without a hostname, so the routes bound
/// to the wildcard Listeners must answer 404.
pub fn gateway_http_listener_isolation() -> ConformanceTest {
    let ns = INFRA_NAMESPACE;

    ConformanceTest {
        short_name: "GatewayHTTPListenerIsolation".to_string(),
        description: "Listener isolation for HTTP Listeners with multiple Listeners and HTTPRoutes"
            .to_string(),
        features: vec![SupportedFeature::Gateway, SupportedFeature::HttpRoute],
        manifests: vec!["tests/gateway-http-listener-isolation.yaml".to_string()],
        // The manifest adds a Gateway to the infra namespace.
        namespaces: vec![ns.to_string()],
        gateway: NamespacedName::new(ns, "gateway-http-listener-isolation"),
        routes: vec![
            NamespacedName::new(ns, "attaches-to-empty-hostname"),
            NamespacedName::new(ns, "attaches-to-wildcard-example-com"),
            NamespacedName::new(ns, "attaches-to-wildcard-foo-example-com"),
        ],
        cases: vec![
            ExpectedResponse::routed(
                Request::new("bar.com", "/empty-hostname"),
                "infra-backend-v1",
                ns,
            ),
            ExpectedResponse::status(Request::new("bar.com", "/wildcard-example-com"), 404),
            ExpectedResponse::status(Request::new("bar.com", "/foo-wildcard-example-com"), 404),
        ],
    }
}
