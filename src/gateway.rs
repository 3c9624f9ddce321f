//! ApiGateway: authenticated reads against the Substack Publisher API.
//!
//! One GET per call, no retries and no timeout override. Non-2xx responses
//! and transport failures are mapped onto `PublisherError` so the tool layer
//! can surface them uniformly.

use std::time::Instant;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::error::PublisherError;

/// Substituted when a failing response's body cannot be read.
pub const NO_BODY_PLACEHOLDER: &str = "(no response body)";

/// Keep only parameters that are present and non-empty, verbatim.
///
/// Tools pass every parameter they support; unset or blank ones drop out here.
pub fn build_query<'a>(params: &'a [(&'a str, Option<String>)]) -> Vec<(&'a str, &'a str)> {
    params
        .iter()
        .filter_map(|(key, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Some((*key, v)),
            _ => None,
        })
        .collect()
}

/// Percent-encode a user-supplied value for use as a single path segment.
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Map a non-2xx status and its body text to the error taxonomy.
pub fn error_for_status(status: StatusCode, body: String) -> PublisherError {
    match status {
        StatusCode::UNAUTHORIZED => PublisherError::Authentication(body),
        StatusCode::NOT_FOUND => PublisherError::remote_not_found(&body),
        StatusCode::TOO_MANY_REQUESTS => PublisherError::RateLimited(body),
        other => PublisherError::Api {
            status: other.as_u16(),
            body,
        },
    }
}

/// HTTP client bound to one API base address.
#[derive(Debug, Clone)]
pub struct ApiGateway {
    client: reqwest::Client,
    base_url: String,
}

impl ApiGateway {
    /// Create a gateway for `base_url` (e.g. `https://publisher-api.substack.com/v1`).
    pub fn new(base_url: impl Into<String>) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("substack-publisher-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PublisherError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build the full request URL for `path` with filtered query parameters.
    pub fn url_for(&self, path: &str, query: &[(&str, Option<String>)]) -> crate::Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw)
            .map_err(|e| PublisherError::Transport(format!("invalid request URL '{}': {}", raw, e)))?;
        let pairs = build_query(query);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Perform one authenticated GET and return the parsed JSON body.
    pub async fn request(
        &self,
        path: &str,
        credential: &str,
        query: &[(&str, Option<String>)],
    ) -> crate::Result<Value> {
        let url = self.url_for(path, query)?;
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, credential)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(path = %path, error = %e, "publisher API transport failure");
                PublisherError::Transport(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(
            path = %path,
            status = %status.as_u16(),
            duration_ms = %start.elapsed().as_millis(),
            "publisher API response"
        );

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| NO_BODY_PLACEHOLDER.to_string());
            return Err(error_for_status(status, body));
        }

        response.json::<Value>().await.map_err(|e| {
            PublisherError::Transport(format!("failed to decode response body: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query_of(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_build_query_omits_missing_and_empty() {
        let params = [
            ("startDate", Some("2024-01-01".to_string())),
            ("endDate", None),
            ("sortBy", Some(String::new())),
            ("maxResults", Some("5".to_string())),
        ];
        assert_eq!(
            build_query(&params),
            vec![("startDate", "2024-01-01"), ("maxResults", "5")]
        );
    }

    #[test]
    fn test_build_query_keeps_values_verbatim() {
        let params = [("next", Some("abc==/ +".to_string()))];
        assert_eq!(build_query(&params), vec![("next", "abc==/ +")]);
    }

    #[test]
    fn test_url_for_without_query_has_none() {
        let gateway = ApiGateway::new("https://example.com/v1/").unwrap();
        let url = gateway.url_for("/posts", &[("endDate", None)]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/v1/posts");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_url_for_start_date_only() {
        let gateway = ApiGateway::new("https://example.com/v1").unwrap();
        let url = gateway
            .url_for(
                "/posts",
                &[
                    ("startDate", Some("2024-01-01".to_string())),
                    ("endDate", None),
                ],
            )
            .unwrap();
        assert_eq!(
            query_of(&url),
            vec![("startDate".to_string(), "2024-01-01".to_string())]
        );
    }

    #[test]
    fn test_path_segment_encodes_email() {
        assert_eq!(path_segment("a+b@example.com"), "a%2Bb%40example.com");
        assert_eq!(path_segment("my/slug"), "my%2Fslug");
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, "x".into()),
            PublisherError::Authentication(b) if b == "x"
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, "x".into()),
            PublisherError::NotFound { status: Some(404), .. }
        ));
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, "x".into()),
            PublisherError::RateLimited(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, "x".into()),
            PublisherError::Api { status: 403, .. }
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, "x".into()),
            PublisherError::Api { status: 502, .. }
        ));
    }

    #[tokio::test]
    async fn test_request_sends_headers_and_returns_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(header("authorization", "key-123"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"title": "Hello"}])))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = ApiGateway::new(server.uri()).unwrap();
        let value = gateway.request("/posts", "key-123", &[]).await.unwrap();
        assert_eq!(value, json!([{"title": "Hello"}]));
    }

    #[tokio::test]
    async fn test_request_404_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("post not found"))
            .mount(&server)
            .await;

        let gateway = ApiGateway::new(server.uri()).unwrap();
        let err = gateway
            .request("/posts/missing", "k", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not found (404): post not found");
    }

    #[tokio::test]
    async fn test_request_other_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let gateway = ApiGateway::new(server.uri()).unwrap();
        let err = gateway.request("/posts", "k", &[]).await.unwrap_err();
        assert!(matches!(err, PublisherError::Api { status: 500, ref body } if body == "boom"));
    }

    #[tokio::test]
    async fn test_request_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let gateway = ApiGateway::new(server.uri()).unwrap();
        let err = gateway.request("/posts", "k", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Rate limited (429): slow down");
    }

    #[tokio::test]
    async fn test_request_non_json_success_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let gateway = ApiGateway::new(server.uri()).unwrap();
        let err = gateway.request("/posts", "k", &[]).await.unwrap_err();
        assert!(matches!(err, PublisherError::Transport(ref m) if m.contains("decode")));
    }

    #[tokio::test]
    async fn test_request_truncated_error_body_uses_placeholder() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Promise 100 body bytes, send 5, then hang up.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 100\r\n\r\nshort")
                .await
                .unwrap();
            socket.shutdown().await.ok();
        });

        let gateway = ApiGateway::new(format!("http://{}", addr)).unwrap();
        let err = gateway.request("/posts", "k", &[]).await.unwrap_err();
        assert!(
            matches!(err, PublisherError::Api { status: 503, ref body } if body == NO_BODY_PLACEHOLDER),
            "got: {:?}",
            err
        );
        assert_eq!(err.to_string(), "API error (503): (no response body)");
    }

    #[tokio::test]
    async fn test_request_connection_refused_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = ApiGateway::new(format!("http://{}", addr)).unwrap();
        let err = gateway.request("/posts", "k", &[]).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
