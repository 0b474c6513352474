//! Outbound HTTP
//!
//! The `http_request` ephemeral resource talks to an [`HttpClient`]; production uses
//! [`ReqwestHttpClient`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use thiserror::Error;

/// Errors from building, sending, or reading an HTTP exchange
#[derive(Error, Debug)]
pub enum HttpError {
    /// The request could not be constructed (method, URL or header rejected)
    #[error("{0}")]
    InvalidRequest(String),

    /// Transport failure or timeout before a response arrived
    #[error("{0}")]
    Send(#[source] reqwest::Error),

    /// The response body could not be read
    #[error("{0}")]
    ReadBody(#[source] reqwest::Error),

    /// The client itself could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl HttpError {
    /// Diagnostic summary for the stage that failed
    pub fn summary(&self) -> &'static str {
        match self {
            HttpError::InvalidRequest(_) | HttpError::Client(_) => "Failed to create HTTP request",
            HttpError::Send(_) => "Failed to send HTTP request",
            HttpError::ReadBody(_) => "Failed to read HTTP response body",
        }
    }
}

pub type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    /// `None` sends an empty body
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Keyed by canonical header name; repeated headers joined with ", "
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> HttpResult<HttpResponse>;
}

/// [`HttpClient`] over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(user_agent: &str) -> HttpResult<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    fn build(&self, request: HttpRequest) -> HttpResult<reqwest::RequestBuilder> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| HttpError::InvalidRequest(format!("invalid method {:?}: {}", request.method, e)))?;
        let url = Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidRequest(format!("parse {:?}: {}", request.url, e)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpError::InvalidRequest(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HttpError::InvalidRequest(format!("invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        Ok(self
            .client
            .request(method, url)
            .headers(headers)
            .body(request.body.unwrap_or_default())
            .timeout(request.timeout))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
        let response = self.build(request)?.send().await.map_err(HttpError::Send)?;

        let status = response.status().as_u16();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for name in response.headers().keys() {
            let joined = response
                .headers()
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).to_string())
                .collect::<Vec<_>>()
                .join(", ");
            headers.insert(canonical_header_key(name.as_str()), joined);
        }

        let body = response.text().await.map_err(HttpError::ReadBody)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// `content-type` -> `Content-Type`
fn canonical_header_key(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
