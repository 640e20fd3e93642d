//! Webhook errors.
//!
//! Only these outcomes reject a delivery. Every other delivery (unsupported
//! topic, unparsable body, unpaid order, no SKU items) is acknowledged with a
//! [`WebhookOutcome`](crate::webhooks::WebhookOutcome) instead.
//!
//! ```rust
//! use wholesale_sync::webhooks::WebhookError;
//!
//! let error = WebhookError::InvalidHmac;
//! assert_eq!(error.to_string(), "Webhook signature verification failed");
//! ```

use thiserror::Error;

/// Errors that reject a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The body signature did not verify.
    ///
    /// The message is generic on purpose; it is returned to the caller.
    #[error("Webhook signature verification failed")]
    InvalidHmac,

    /// No catalog credentials are configured or supplied.
    #[error("Missing catalog API credentials")]
    MissingCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_hmac_message_is_generic() {
        let message = WebhookError::InvalidHmac.to_string();
        assert!(!message.contains("key"));
        assert!(!message.contains("secret"));
    }
}
