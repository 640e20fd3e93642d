//! HTTP-facing error type.
//!
//! Every handler returns `Result<_, ApiError>`. The response body is
//! `{"success": false, "error": <code>, "message": <text>}`; store failures
//! are reported without detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::oauth::OAuthError;
use crate::catalog::ImportError;
use crate::webhooks::WebhookError;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error(transparent)]
    Import(#[from] ImportError),

    /// Input rejected before reaching a domain flow.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// Status code and machine-readable code for this error.
    #[must_use]
    pub const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::OAuth(e) => match e {
                OAuthError::InvalidShopDomain { .. } => (StatusCode::BAD_REQUEST, "invalid_shop_domain"),
                OAuthError::MalformedRequest { .. } => (StatusCode::BAD_REQUEST, "malformed_request"),
                OAuthError::AuthenticationFailed => (StatusCode::UNAUTHORIZED, "authentication_failed"),
                OAuthError::ReplayOrForgedState => (StatusCode::UNAUTHORIZED, "invalid_state"),
                OAuthError::ExchangeFailed { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "exchange_failed"),
                OAuthError::MetadataFetchFailed { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "metadata_fetch_failed")
                }
                OAuthError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
            Self::Webhook(e) => match e {
                WebhookError::InvalidHmac => (StatusCode::UNAUTHORIZED, "authentication_failed"),
                WebhookError::MissingCredentials => (StatusCode::BAD_REQUEST, "missing_credentials"),
            },
            Self::Import(e) => match e {
                ImportError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
                ImportError::MissingCredentials => (StatusCode::BAD_REQUEST, "missing_credentials"),
                ImportError::ShopNotAuthenticated { .. } => (StatusCode::UNAUTHORIZED, "shop_not_authenticated"),
                ImportError::CatalogUnavailable { .. } => (StatusCode::BAD_GATEWAY, "catalog_unavailable"),
                ImportError::ProductNotFound { .. } => (StatusCode::NOT_FOUND, "product_not_found"),
                ImportError::ShopifyRejected { .. } => (StatusCode::BAD_GATEWAY, "shopify_rejected"),
                ImportError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }

    fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::OAuth(OAuthError::Store(_)) | Self::Import(ImportError::Store(_))
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }

        let message = if self.is_store_failure() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "success": false,
            "error": code,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}
