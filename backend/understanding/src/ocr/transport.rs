//! HTTP seam for the Read API client.
//!
//! The client only needs POST with a raw body and GET, both with custom
//! headers. Keeping that behind a trait lets tests script the service.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::TransportError;

/// Status, headers and body of a completed exchange.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are stored lower-cased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` verbatim.
    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError>;

    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;
}

/// Production transport on a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
        let response = request.send().await.map_err(describe)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(describe)?.to_vec();

        debug!(status, body_len = body.len(), "HTTP exchange complete");
        Ok(HttpResponse { status, headers, body })
    }
}

fn describe(e: reqwest::Error) -> TransportError {
    let what = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "connection failed"
    } else {
        "HTTP request failed"
    };
    TransportError::new(format!("{what}: {e}"))
}

fn apply_headers(mut request: reqwest::RequestBuilder, headers: &[(&str, &str)]) -> reqwest::RequestBuilder {
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    request
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError> {
        let request = apply_headers(self.client.post(url), headers).body(body);
        self.send(request).await
    }

    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let request = apply_headers(self.client.get(url), headers);
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::Router;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn header(headers: &HeaderMap, name: &str) -> String {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse::new(202).with_header("Operation-Location", "https://h");
        assert_eq!(response.header("operation-location"), Some("https://h"));
        assert_eq!(response.header("OPERATION-LOCATION"), Some("https://h"));
        assert!(response.is_success());
        assert!(!HttpResponse::new(404).is_success());
    }

    #[tokio::test]
    async fn post_sends_raw_body_and_headers() {
        let app = Router::new().route(
            "/upload",
            post(|headers: HeaderMap, body: Bytes| async move {
                let echo = format!(
                    "{}|{}|{}",
                    header(&headers, "content-type"),
                    header(&headers, "x-key"),
                    body.len()
                );
                (StatusCode::ACCEPTED, [("x-echo", echo)], "")
            }),
        );
        let base = serve(app).await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .post(
                &format!("{base}/upload"),
                &[("Content-Type", "application/octet-stream"), ("X-Key", "k1")],
                vec![0u8, 159, 146, 150, 255],
            )
            .await
            .unwrap();

        assert_eq!(response.status, 202);
        assert_eq!(response.header("X-Echo"), Some("application/octet-stream|k1|5"));
    }

    #[tokio::test]
    async fn get_returns_status_and_body() {
        let app = Router::new().route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }));
        let base = serve(app).await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport.get(&format!("{base}/missing"), &[]).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body_text(), "nope");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport.get(&format!("http://{addr}/"), &[]).await.unwrap_err();
        assert!(!err.message.is_empty());
    }
}
