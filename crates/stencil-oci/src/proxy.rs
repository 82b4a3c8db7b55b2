//! Raw upstream forwarding.
//!
//! Registry v2 traffic this system does not interpret is forwarded
//! byte-for-byte: the target host and scheme are rewritten to the upstream
//! registry while method, headers, body, and the upstream's status come back
//! verbatim. Hop-by-hop headers stay on their own connection.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::{debug, warn};

use crate::client::TransportConfig;
use crate::error::{OciError, OciResult};

/// Headers scoped to a single connection, never forwarded in either
/// direction.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// A transport-agnostic request to forward.
#[derive(Debug, Clone)]
pub struct RawRequest {
    /// HTTP method name.
    pub method: String,

    /// Path plus optional query string, e.g. `/v2/go/manifests/1.1.0`.
    pub path_and_query: String,

    /// Header pairs in arrival order.
    pub headers: Vec<(String, String)>,

    /// Request body.
    pub body: Vec<u8>,
}

impl RawRequest {
    /// Build a body-less request.
    pub fn new(method: impl Into<String>, path_and_query: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path_and_query: path_and_query.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Attach a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// The upstream's response, verbatim.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Status code.
    pub status: u16,

    /// Header pairs.
    pub headers: Vec<(String, String)>,

    /// Response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// First value of a header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Forwards raw requests to one upstream registry.
#[derive(Debug, Clone)]
pub struct ProxyForwarder {
    http: reqwest::Client,
    upstream: String,
}

impl ProxyForwarder {
    /// Create a forwarder for `upstream_host` (host with optional port).
    pub fn new(upstream_host: impl Into<String>, config: &TransportConfig) -> OciResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OciError::Upstream {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            upstream: format!("{}://{}", config.scheme, upstream_host.into()),
        })
    }

    /// Forward one request and return the upstream response verbatim.
    pub async fn forward(&self, request: RawRequest) -> OciResult<RawResponse> {
        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|_| OciError::InvalidRequest {
                reason: format!("invalid method: {}", request.method),
            })?;
        let url = format!("{}{}", self.upstream, request.path_and_query);
        debug!(method = %method, url = %url, "forwarding to upstream registry");

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            if is_hop_by_hop(name) {
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                OciError::InvalidRequest {
                    reason: format!("invalid header name: {}", name),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| OciError::InvalidRequest {
                reason: format!("invalid value for header {}", name),
            })?;
            headers.append(name, value);
        }

        let response = self
            .http
            .request(method, &url)
            .headers(headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "upstream forward failed");
                OciError::Upstream {
                    message: e.to_string(),
                }
            })?;

        let status = response.status().as_u16();
        let response_headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| OciError::Upstream {
            message: format!("failed to read upstream body: {}", e),
        })?;

        Ok(RawResponse {
            status,
            headers: response_headers,
            body: body.to_vec(),
        })
    }
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forwarder_for(server: &MockServer) -> ProxyForwarder {
        let host = server.uri().trim_start_matches("http://").to_string();
        ProxyForwarder::new(host, &TransportConfig::default().with_scheme("http"))
            .expect("forwarder")
    }

    #[tokio::test]
    async fn forwards_method_path_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/go/blobs/uploads/"))
            .and(query_param("digest", "sha256:abc"))
            .and(header("x-request-id", "42"))
            .and(body_bytes(b"payload".to_vec()))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let forwarder = forwarder_for(&server);
        let response = forwarder
            .forward(
                RawRequest::new("POST", "/v2/go/blobs/uploads/?digest=sha256:abc")
                    .with_header("x-request-id", "42")
                    .with_body(b"payload".to_vec()),
            )
            .await
            .expect("forward failed");

        assert_eq!(response.status, 202);
    }

    #[tokio::test]
    async fn passes_upstream_status_headers_and_body_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/missing/manifests/1.0.0"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("docker-distribution-api-version", "registry/2.0")
                    .set_body_string("{\"errors\":[{\"code\":\"MANIFEST_UNKNOWN\"}]}"),
            )
            .mount(&server)
            .await;

        let forwarder = forwarder_for(&server);
        let response = forwarder
            .forward(RawRequest::new("GET", "/v2/missing/manifests/1.0.0"))
            .await
            .expect("forward failed");

        assert_eq!(response.status, 404);
        assert_eq!(
            response.header("docker-distribution-api-version"),
            Some("registry/2.0")
        );
        assert!(response.body.starts_with(b"{\"errors\""));
    }

    #[tokio::test]
    async fn strips_hop_by_hop_request_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let forwarder = forwarder_for(&server);
        // A connection-scoped header must not poison the upstream call.
        let response = forwarder
            .forward(
                RawRequest::new("GET", "/v2/")
                    .with_header("connection", "close")
                    .with_header("host", "catalog.example.dev"),
            )
            .await
            .expect("forward failed");
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn invalid_method_is_rejected() {
        let server = MockServer::start().await;
        let forwarder = forwarder_for(&server);
        let result = forwarder
            .forward(RawRequest::new("NOT A METHOD", "/v2/"))
            .await;
        assert!(matches!(result, Err(OciError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_upstream_error() {
        let forwarder = ProxyForwarder::new(
            "127.0.0.1:1",
            &TransportConfig::default().with_scheme("http"),
        )
        .expect("forwarder");
        let result = forwarder.forward(RawRequest::new("GET", "/v2/")).await;
        assert!(matches!(result, Err(OciError::Upstream { .. })));
    }
}
