//! HTTP transport for upstream API requests.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, Result, ShareError};

/// HTTP method used by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully described outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, possibly carrying a fixed query string already.
    pub url: String,
    /// Extra query pairs appended to `url`.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Set a form-urlencoded body built from `pairs`.
    pub fn form(self, pairs: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.raw_form(body)
    }

    /// Set a body sent verbatim with a form content type.
    pub fn raw_form(mut self, body: String) -> Self {
        self.headers.push((
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        ));
        self.body = Some(body);
        self
    }

    /// Look up a header value (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Executes requests. Implemented by [`HttpClient`]; tests plug in scripted transports.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, BoxError>;
}

/// Why a transport call ended without a response.
#[derive(Debug)]
pub(crate) enum SendError {
    Cancelled,
    TimedOut,
    Failed(BoxError),
}

/// Run `request` on `transport`, bounded by `cancel` and `timeout`.
///
/// The in-flight future is dropped as soon as either fires, which aborts the request.
pub(crate) async fn send(
    transport: &dyn Transport,
    request: HttpRequest,
    cancel: &CancellationToken,
    timeout: Duration,
) -> std::result::Result<HttpResponse, SendError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SendError::Cancelled),
        outcome = tokio::time::timeout(timeout, transport.execute(request)) => match outcome {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(SendError::Failed(e)),
            Err(_) => Err(SendError::TimedOut),
        },
    }
}

/// Run `future` until it completes or `token` is cancelled.
///
/// Use this to bind a single driver call to a caller-owned token.
pub async fn cancellable<F, T>(token: &CancellationToken, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ShareError::Cancelled),
        result = future => result,
    }
}

/// HTTP client for making requests to upstream servers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a new HTTP client with a proxy.
    pub fn with_proxy(proxy: &str) -> Result<Self> {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| ShareError::Config(format!("Invalid proxy: {}", e)))?;

        let client = Client::builder()
            .proxy(proxy)
            .build()
            .map_err(|e| ShareError::Config(format!("Failed to build client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, BoxError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl Transport for Stalled {
        async fn execute(&self, _: HttpRequest) -> std::result::Result<HttpResponse, BoxError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_client_creation() {
        let _client = HttpClient::new();
        let _default = HttpClient::default();
    }

    #[test]
    fn test_proxy_invalid() {
        let res = HttpClient::with_proxy(":::::::");
        assert!(res.is_err());
    }

    #[test]
    fn test_form_body_is_encoded() {
        let request = HttpRequest::post("https://pan.baidu.com/share/wxlist")
            .form(&[("dir", "/a b"), ("pwd", "x&y")]);
        assert_eq!(request.body.as_deref(), Some("dir=%2Fa+b&pwd=x%26y"));
        assert_eq!(
            request.header_value("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[tokio::test]
    async fn test_send_honours_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let outcome = send(
            &Stalled,
            HttpRequest::get("https://example.com"),
            &token,
            Duration::from_secs(30),
        )
        .await;
        assert!(matches!(outcome, Err(SendError::Cancelled)));
    }

    #[tokio::test]
    async fn test_send_honours_deadline() {
        let outcome = send(
            &Stalled,
            HttpRequest::get("https://example.com"),
            &CancellationToken::new(),
            Duration::from_millis(10),
        )
        .await;
        assert!(matches!(outcome, Err(SendError::TimedOut)));
    }

    #[tokio::test]
    async fn test_cancellable_wrapper() {
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<()> = cancellable(&token, std::future::pending()).await;
        assert!(matches!(result, Err(ShareError::Cancelled)));
    }
}
