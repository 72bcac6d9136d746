use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// HTTP GET request envelope used by adapter transport calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response envelope returned by an adapter transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Adapter transport contract.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

    /// True when the client performs no network I/O; adapters switch to
    /// their deterministic offline data in that case.
    fn is_offline(&self) -> bool {
        false
    }
}

/// Placeholder client for offline mode; refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpClient;

impl HttpClient for NoopHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            Err(HttpError::non_retryable(format!(
                "offline http client cannot execute '{}'",
                request.url
            )))
        })
    }

    fn is_offline(&self) -> bool {
        true
    }
}

/// reqwest-backed transport used for real provider calls.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sigmascan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| HttpError::non_retryable(format!("client build failed: {error}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .get(&request.url)
                .timeout(Duration::from_millis(request.timeout_ms));
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await.map_err(classify_transport_error)?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|error| HttpError::retryable(format!("body read failed: {error}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

fn classify_transport_error(error: reqwest::Error) -> HttpError {
    if error.is_timeout() || error.is_connect() {
        HttpError::retryable(format!("transport error: {error}"))
    } else {
        HttpError::non_retryable(format!("transport error: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_client_refuses_requests() {
        let client = NoopHttpClient;
        assert!(client.is_offline());

        let error = client
            .execute(HttpRequest::get("https://example.invalid"))
            .await
            .expect_err("must refuse");
        assert!(!error.is_retryable());
    }

    #[test]
    fn success_window_is_2xx() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let not_found = HttpResponse {
            status: 404,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }
}
