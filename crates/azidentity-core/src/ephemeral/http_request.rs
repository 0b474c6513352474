//! `azidentity_http_request`

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{fail, Fallible, TIMEOUT_DESCRIPTION};
use crate::credentials::parse_timeout;
use crate::framework::{
    decode_config, encode_result, Attribute, AttributeKind, EphemeralResource, OpenResponse, Schema,
};
use crate::http::{HttpClient, HttpRequest};
use crate::logging::SharedLogger;

const METHODS: &[&str] = &[
    "CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "TRACE",
];

#[derive(Serialize, Deserialize)]
struct HttpRequestModel {
    request_url: String,
    request_method: String,
    request_body: Option<String>,
    request_headers: Option<BTreeMap<String, Option<String>>>,
    continue_on_error: Option<bool>,
    timeout: Option<String>,
    response_body: Option<String>,
    response_headers: Option<BTreeMap<String, String>>,
    response_status_code: Option<i32>,
    success: Option<bool>,
    error: Option<String>,
}

impl Fallible for HttpRequestModel {
    fn set_failure(&mut self, error: String) {
        self.success = Some(false);
        self.error = Some(error);
    }
}

/// Sends one HTTP request and exposes the response
///
/// Every status code counts as success; only transport failures are errors.
pub struct HttpRequestResource {
    client: Arc<dyn HttpClient>,
    logger: SharedLogger,
}

impl HttpRequestResource {
    pub fn new(client: Arc<dyn HttpClient>, logger: SharedLogger) -> Self {
        Self { client, logger }
    }
}

#[async_trait]
impl EphemeralResource for HttpRequestResource {
    fn type_suffix(&self) -> &'static str {
        "_http_request"
    }

    fn schema(&self) -> Schema {
        Schema::new("Sends an HTTP request and exposes the response.")
            .attribute(
                Attribute::required("request_url", AttributeKind::String)
                    .sensitive()
                    .describe("The URL to send the request to."),
            )
            .attribute(
                Attribute::required("request_method", AttributeKind::String)
                    .one_of(METHODS)
                    .describe("The HTTP method to use."),
            )
            .attribute(
                Attribute::optional("request_body", AttributeKind::String)
                    .sensitive()
                    .describe("Body of the request. Defaults to an empty body."),
            )
            .attribute(
                Attribute::optional("request_headers", AttributeKind::StringMap)
                    .sensitive()
                    .describe("Headers to include in the request."),
            )
            .attribute(
                Attribute::optional("continue_on_error", AttributeKind::Bool)
                    .describe("Report a failed request through success/error instead of failing. The default is false."),
            )
            .attribute(Attribute::optional("timeout", AttributeKind::String).describe(TIMEOUT_DESCRIPTION))
            .attribute(
                Attribute::computed("response_body", AttributeKind::String)
                    .sensitive()
                    .describe("Body of the response."),
            )
            .attribute(
                Attribute::computed("response_headers", AttributeKind::StringMap)
                    .sensitive()
                    .describe("Headers of the response; repeated headers are joined with ', '."),
            )
            .attribute(
                Attribute::computed("response_status_code", AttributeKind::Int32)
                    .describe("Status code of the response."),
            )
            .attribute(
                Attribute::computed("success", AttributeKind::Bool)
                    .describe("Whether a response was received."),
            )
            .attribute(
                Attribute::computed("error", AttributeKind::String)
                    .describe("Error message when the request failed."),
            )
    }

    async fn open(&self, config: Value) -> OpenResponse {
        let diagnostics = self.schema().validate(&config);
        if diagnostics.has_error() {
            return OpenResponse::from_diagnostics(diagnostics);
        }
        let mut model: HttpRequestModel = match decode_config(config) {
            Ok(model) => model,
            Err(diagnostics) => return OpenResponse::from_diagnostics(diagnostics),
        };

        let continue_on_error = model.continue_on_error.unwrap_or(false);
        let request = HttpRequest {
            method: model.request_method.clone(),
            url: model.request_url.clone(),
            body: model.request_body.clone(),
            headers: model
                .request_headers
                .iter()
                .flatten()
                .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
                .collect(),
            timeout: parse_timeout(model.timeout.as_deref(), self.logger.as_ref()),
        };

        let response = match self.client.send(request).await {
            Ok(response) => response,
            Err(e) => {
                crate::log_debug!(self.logger, "{}: {}", e.summary(), e);
                let summary = e.summary();
                return fail(model, continue_on_error, summary, e.to_string());
            }
        };

        crate::log_debug!(self.logger,
            "HTTP {} {} -> {}",
            model.request_method,
            redact_query(&model.request_url),
            response.status
        );

        model.response_body = Some(response.body);
        model.response_headers = Some(response.headers);
        model.response_status_code = Some(i32::from(response.status));
        model.success = Some(true);
        encode_result(&model)
    }
}

/// URL without its query string, for logs
fn redact_query(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ReqwestHttpClient;
    use crate::testing::{memory_logger, refused_url, serve_once};
    use serde_json::json;

    const TEAPOT: &str = "HTTP/1.1 418 I'm a teapot\r\n\
        Content-Type: application/json\r\n\
        Vary: Accept\r\n\
        Vary: Origin\r\n\
        Content-Length: 15\r\n\
        Connection: close\r\n\
        \r\n\
        {\"short\":true}\n";

    fn resource() -> HttpRequestResource {
        HttpRequestResource::new(Arc::new(ReqwestHttpClient::default()), memory_logger())
    }

    #[tokio::test]
    async fn test_any_status_is_success() {
        let (url, server) = serve_once(TEAPOT).await;
        let response = resource()
            .open(json!({
                "request_url": format!("{}/brew?secret=1", url),
                "request_method": "PUT",
                "request_body": "earl grey",
                "request_headers": {"X-Tea": "hot", "X-Skipped": null},
            }))
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let result = response.result.unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["response_status_code"], 418);
        assert_eq!(result["response_body"], "{\"short\":true}\n");
        assert_eq!(result["response_headers"]["Vary"], "Accept, Origin");
        assert_eq!(result["response_headers"]["Content-Type"], "application/json");
        assert_eq!(result["request_body"], "earl grey");
        assert_eq!(result["error"], Value::Null);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("PUT /brew?secret=1 HTTP/1.1"));
        assert!(raw.to_lowercase().contains("x-tea: hot"));
        assert!(!raw.to_lowercase().contains("x-skipped"));
    }

    #[tokio::test]
    async fn test_send_failure() {
        let url = refused_url().await;
        let response = resource()
            .open(json!({"request_url": url, "request_method": "GET"}))
            .await;
        assert!(response.result.is_none());
        assert_eq!(
            response.diagnostics.iter().next().unwrap().summary,
            "Failed to send HTTP request"
        );
    }

    #[tokio::test]
    async fn test_send_failure_continue_on_error() {
        let url = refused_url().await;
        let response = resource()
            .open(json!({"request_url": url, "request_method": "GET", "continue_on_error": true}))
            .await;
        assert!(response.diagnostics.is_empty());
        let result = response.result.unwrap();
        assert_eq!(result["success"], false);
        assert!(!result["error"].as_str().unwrap().is_empty());
        assert_eq!(result["response_status_code"], Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let response = resource()
            .open(json!({"request_url": "not a url", "request_method": "GET"}))
            .await;
        assert_eq!(
            response.diagnostics.iter().next().unwrap().summary,
            "Failed to create HTTP request"
        );
    }

    #[tokio::test]
    async fn test_invalid_url_continue_on_error() {
        let response = resource()
            .open(json!({
                "request_url": "not a url",
                "request_method": "GET",
                "continue_on_error": true,
            }))
            .await;
        assert!(response.diagnostics.is_empty());
        let result = response.result.unwrap();
        assert_eq!(result["success"], false);
        assert!(!result["error"].as_str().unwrap().is_empty());
        assert!(result["response_status_code"].is_null());
    }

    #[tokio::test]
    async fn test_method_validated() {
        let response = resource()
            .open(json!({"request_url": "http://localhost", "request_method": "get"}))
            .await;
        assert_eq!(
            response.diagnostics.iter().next().unwrap().summary,
            "Invalid Attribute Value Match"
        );
    }

    #[test]
    fn test_redact_query() {
        assert_eq!(redact_query("https://x/y?code=1"), "https://x/y");
        assert_eq!(redact_query("https://x/y"), "https://x/y");
    }
}
