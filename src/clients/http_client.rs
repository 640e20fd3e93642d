//! Retrying JSON HTTP client shared by the Shopify and catalog clients.

use std::collections::HashMap;
use std::time::Duration;

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::AppConfig;

/// Default wait before the first retry.
pub const RETRY_WAIT_TIME: Duration = Duration::from_secs(1);

/// Upper bound on any single retry wait, including `Retry-After`.
pub const MAX_RETRY_WAIT: Duration = Duration::from_secs(8);

/// Crate version from Cargo.toml.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the process-wide `reqwest::Client`.
///
/// The client carries the configured timeout and user agent; every
/// [`HttpClient`] borrows it so connections are pooled across handlers.
///
/// # Errors
///
/// Returns [`HttpError::Network`] if the TLS backend cannot be initialized.
pub fn build_reqwest_client(config: &AppConfig) -> Result<reqwest::Client, HttpError> {
    let prefix = config
        .user_agent_prefix()
        .map_or(String::new(), |prefix| format!("{prefix} | "));
    let user_agent = format!("{prefix}Wholesale Sync v{SERVICE_VERSION}");

    let client = reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(config.http_timeout())
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// JSON HTTP client bound to one base URI.
///
/// The client handles:
/// - default headers plus the body `Content-Type`
/// - retries on network errors, 429 and 5xx when `tries > 1`
/// - exponential backoff capped at [`MAX_RETRY_WAIT`], honouring `Retry-After`
/// - deprecation warnings from Shopify
///
/// Header values are never logged.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_uri: String,
    default_headers: HashMap<String, String>,
    retry_wait: Duration,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client for `base_uri` (scheme and host, no trailing slash).
    #[must_use]
    pub fn new(client: reqwest::Client, base_uri: impl Into<String>) -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        Self {
            client,
            base_uri: base_uri.into(),
            default_headers,
            retry_wait: RETRY_WAIT_TIME,
        }
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Sets the base wait between retries.
    #[must_use]
    pub const fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Sends a request, retrying as configured on the request.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the request fails validation
    /// - `Network` if the last attempt failed to connect or timed out
    /// - `Response` for a non-retryable non-2xx status, or any non-2xx
    ///   status when `tries == 1`
    /// - `MaxRetries` when every attempt got 429 or 5xx
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}{}", self.base_uri, request.path);

        let mut headers = self.default_headers.clone();
        if let Some(body_type) = &request.body_type {
            headers.insert(
                "Content-Type".to_string(),
                body_type.as_content_type().to_string(),
            );
        }

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
            };
            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }
            if let Some(body) = &request.body {
                req_builder = req_builder.body(body.to_string());
            }

            let res = match req_builder.send().await {
                Ok(res) => res,
                Err(error) if tries < request.tries => {
                    tracing::warn!(
                        path = %request.path,
                        attempt = tries,
                        error = %error,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(self.backoff(tries)).await;
                    continue;
                }
                Err(error) => return Err(error.into()),
            };

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();
            let body = Self::parse_body(code, &body_text);

            let response = HttpResponse::new(code, res_headers, body);

            if let Some(reason) = response.deprecation_reason() {
                tracing::warn!(
                    path = %request.path,
                    reason,
                    "deprecated request to Shopify API"
                );
            }

            if response.is_ok() {
                return Ok(response);
            }

            let error_message = Self::serialize_error(&response);

            if !response.is_retryable() || request.tries == 1 {
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message: error_message,
                    error_reference: response.request_id().map(String::from),
                }));
            }

            if tries >= request.tries {
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries: request.tries,
                    message: error_message,
                    error_reference: response.request_id().map(String::from),
                }));
            }

            let delay = self.retry_delay(&response, tries);
            tracing::warn!(
                path = %request.path,
                status = code,
                attempt = tries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "retryable response, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn parse_body(code: u16, body_text: &str) -> serde_json::Value {
        if body_text.is_empty() {
            return serde_json::json!({});
        }
        serde_json::from_str(body_text).unwrap_or_else(|_| {
            if code >= 400 {
                serde_json::json!({ "raw_body": body_text })
            } else {
                serde_json::json!({})
            }
        })
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// `retry_wait * 2^(attempt - 1)`, capped.
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_wait.saturating_mul(factor).min(MAX_RETRY_WAIT)
    }

    fn retry_delay(&self, response: &HttpResponse, attempt: u32) -> Duration {
        if response.code == 429 {
            if let Some(retry_after) = response.retry_request_after {
                return Duration::try_from_secs_f64(retry_after)
                    .map_or(MAX_RETRY_WAIT, |wait| wait.min(MAX_RETRY_WAIT));
            }
        }
        self.backoff(attempt)
    }

    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        for field in ["errors", "error", "error_description", "message", "raw_body"] {
            if let Some(value) = response.body.get(field) {
                error_body.insert(field.to_string(), value.clone());
            }
        }

        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::to_string(&error_body).unwrap_or_else(|_| "{}".to_string())
    }
}
