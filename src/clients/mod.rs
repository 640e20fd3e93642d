//! Outbound HTTP clients.
//!
//! - [`HttpClient`]: JSON client with retry and backoff, bound to a base URI
//! - [`AdminClient`]: the Shopify Admin calls (token exchange, shop metadata,
//!   product creation)
//! - [`CatalogClient`]: the wholesale catalog (product listing, stock updates)
//!
//! All clients share the single `reqwest::Client` built by
//! [`build_reqwest_client`], which carries the configured timeout.
//!
//! # Retry Behavior
//!
//! Requests built with `.tries(n)` for `n > 1` are retried on network
//! errors, 429 and 5xx. The wait doubles from the configured base wait up
//! to [`MAX_RETRY_WAIT`]; a 429 `Retry-After` is honoured within that cap.
//! Other statuses return immediately.

pub mod admin;
pub mod catalog;
mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use admin::{AccessTokenResponse, AdminClient, ACCESS_TOKEN_HEADER};
pub use catalog::CatalogClient;
pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{
    build_reqwest_client, HttpClient, MAX_RETRY_WAIT, RETRY_WAIT_TIME, SERVICE_VERSION,
};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
