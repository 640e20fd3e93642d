//! Errors from outbound HTTP calls to Shopify and the wholesale catalog.
//!
//! - [`HttpResponseError`]: a non-2xx response
//! - [`MaxHttpRetriesExceededError`]: retries exhausted on 429/5xx
//! - [`InvalidHttpRequestError`]: a request rejected before sending
//! - [`HttpError`]: the unified error returned by every client call

use thiserror::Error;

/// A non-2xx response.
///
/// `message` holds the upstream error fields (`errors`, `error`,
/// `error_description`) serialized as JSON, or the raw body when it was not
/// JSON. It never contains request credentials.
#[derive(Debug, Error)]
#[error("HTTP {code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Serialized upstream error detail.
    pub message: String,
    /// Value of the `X-Request-Id` response header, when present.
    pub error_reference: Option<String>,
}

/// Retries were exhausted on a retryable status.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last message: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of attempts made.
    pub tries: u32,
    /// Serialized error detail from the last response.
    pub message: String,
    /// Value of the last `X-Request-Id` response header, when present.
    pub error_reference: Option<String>,
}

/// A request that failed validation before it was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without a body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// A POST request was built without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error for outbound HTTP calls.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Maximum retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network, TLS or timeout failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response body: {reason}")]
    UnexpectedBody {
        /// What was wrong with the body.
        reason: String,
    },
}

impl HttpError {
    /// Returns the upstream HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::MaxRetries(e) => Some(e.code),
            Self::InvalidRequest(_) | Self::Network(_) | Self::UnexpectedBody { .. } => None,
        }
    }
}

// Verify HttpError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};
