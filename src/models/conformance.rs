//! Conformance test declarations
//!
//! Describes conformance tests as data: which features they exercise, which
//! manifests they apply and which HTTP exchanges they expect. Sending the
//! requests and matching the responses is up to the runner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Gateway API features a conformance test depends on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SupportedFeature {
    Gateway,
    GatewayPort8080,
    #[serde(rename = "GatewayHTTPListenerIsolation")]
    GatewayHttpListenerIsolation,
    #[serde(rename = "HTTPRoute")]
    HttpRoute,
    ReferenceGrant,
}

impl SupportedFeature {
    pub fn name(&self) -> &'static str {
        match self {
            SupportedFeature::Gateway => "Gateway",
            SupportedFeature::GatewayPort8080 => "GatewayPort8080",
            SupportedFeature::GatewayHttpListenerIsolation => "GatewayHTTPListenerIsolation",
            SupportedFeature::HttpRoute => "HTTPRoute",
            SupportedFeature::ReferenceGrant => "ReferenceGrant",
        }
    }

    pub fn all() -> Vec<SupportedFeature> {
        vec![
            SupportedFeature::Gateway,
            SupportedFeature::GatewayPort8080,
            SupportedFeature::GatewayHttpListenerIsolation,
            SupportedFeature::HttpRoute,
            SupportedFeature::ReferenceGrant,
        ]
    }

    /// Parse a feature name, ignoring case
    pub fn from_str(s: &str) -> Option<SupportedFeature> {
        Self::all()
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for SupportedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Namespace/name pair identifying a Kubernetes object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Request half of an expected exchange
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub host: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl Request {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            headers: BTreeMap::new(),
        }
    }
}

/// Response half of an expected exchange
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status_code: u16,
}

impl Default for Response {
    fn default() -> Self {
        Self { status_code: 200 }
    }
}

/// One HTTP exchange a conformance test expects from the Gateway
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedResponse {
    pub request: Request,
    #[serde(default)]
    pub response: Response,
    /// Backend expected to serve the request, empty when only the status matters
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub backend: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl ExpectedResponse {
    /// Expect `request` to be served by `backend` in `namespace`
    pub fn routed(request: Request, backend: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            request,
            response: Response::default(),
            backend: backend.into(),
            namespace: namespace.into(),
        }
    }

    /// Expect `request` to be answered with `status_code` by the Gateway itself
    pub fn status(request: Request, status_code: u16) -> Self {
        Self {
            request,
            response: Response { status_code },
            ..Default::default()
        }
    }

    /// Sub-test name for the `index`-th case of a table
    pub fn test_case_name(&self, index: usize) -> String {
        let headers = if self.request.headers.is_empty() {
            ""
        } else {
            " with headers"
        };
        let request = format!(
            "{} request to '{}{}'{}",
            index, self.request.host, self.request.path, headers
        );

        if self.backend.is_empty() {
            format!("{} should receive a {}", request, self.response.status_code)
        } else {
            format!("{} should go to {}", request, self.backend)
        }
    }
}

/// A declared conformance test
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConformanceTest {
    pub short_name: String,
    pub description: String,
    pub features: Vec<SupportedFeature>,
    pub manifests: Vec<String>,
    /// Namespaces that must be ready before the test starts
    #[serde(default)]
    pub namespaces: Vec<String>,
    pub gateway: NamespacedName,
    pub routes: Vec<NamespacedName>,
    pub cases: Vec<ExpectedResponse>,
}

impl ConformanceTest {
    /// Case names in table order
    pub fn case_names(&self) -> Vec<String> {
        self.cases
            .iter()
            .enumerate()
            .map(|(i, tc)| tc.test_case_name(i))
            .collect()
    }

    /// Whether every feature this test needs is in `supported`
    pub fn is_supported_by(&self, supported: &[SupportedFeature]) -> bool {
        self.features.iter().all(|f| supported.contains(f))
    }
}
