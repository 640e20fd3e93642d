//! HMAC-SHA256 signatures for OAuth redirects and webhook bodies.
//!
//! Shopify signs two kinds of inbound requests with the app's shared secret:
//!
//! - OAuth redirects carry a lowercase hex `hmac` query parameter computed
//!   over the remaining parameters in canonical form ([`canonical_query`]).
//! - Webhooks carry a base64 `X-Shopify-Hmac-Sha256` header computed over the
//!   raw request body.
//!
//! [`SignatureVerifier`] checks both. The provided signature is decoded to
//! bytes and compared in constant time with [`Mac::verify_slice`]; anything
//! that fails to decode is [`Verdict::Forged`].
//!
//! # Key Rotation
//!
//! A verifier built with a fallback secret accepts signatures made with
//! either key, so a secret can be rotated without breaking installs that
//! are mid-flight.
//!
//! # Example
//!
//! ```rust
//! use wholesale_sync::auth::oauth::hmac::{SignatureVerifier, Verdict};
//! use wholesale_sync::ApiSecretKey;
//!
//! let verifier = SignatureVerifier::new(ApiSecretKey::new("hush").unwrap(), None);
//!
//! let params = vec![
//!     ("shop".to_string(), "demo.myshopify.com".to_string()),
//!     ("code".to_string(), "abc".to_string()),
//! ];
//! let mut signed = params.clone();
//! signed.push(("hmac".to_string(), verifier.sign_query(&params)));
//! assert_eq!(verifier.verify_query(&signed), Verdict::Authentic);
//!
//! let body = br#"{"id":1}"#;
//! let header = verifier.sign_body(body);
//! assert_eq!(verifier.verify_body(body, &header), Verdict::Authentic);
//! assert_eq!(verifier.verify_body(b"tampered", &header), Verdict::Forged);
//! ```

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::{AppConfig, ApiSecretKey};

type HmacSha256 = Hmac<Sha256>;

/// Query parameters excluded from the signed message.
const SIGNATURE_PARAMS: [&str; 2] = ["hmac", "signature"];

/// Outcome of a signature check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The signature matches one of the configured secrets.
    Authentic,
    /// The signature is missing, undecodable or wrong.
    Forged,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Authentic`].
    #[must_use]
    pub const fn is_authentic(self) -> bool {
        matches!(self, Self::Authentic)
    }
}

/// Verifies and produces Shopify HMAC-SHA256 signatures.
#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    primary: ApiSecretKey,
    fallback: Option<ApiSecretKey>,
}

impl SignatureVerifier {
    /// Creates a verifier with a primary secret and an optional fallback.
    #[must_use]
    pub const fn new(primary: ApiSecretKey, fallback: Option<ApiSecretKey>) -> Self {
        Self { primary, fallback }
    }

    /// Verifier for OAuth redirects: the API secret, falling back to the old one.
    #[must_use]
    pub fn for_oauth(config: &AppConfig) -> Self {
        Self::new(
            config.api_secret_key().clone(),
            config.old_api_secret_key().cloned(),
        )
    }

    /// Verifier for webhook bodies: the webhook secret, falling back to the
    /// old API secret.
    #[must_use]
    pub fn for_webhooks(config: &AppConfig) -> Self {
        Self::new(
            config.webhook_secret().clone(),
            config.old_api_secret_key().cloned(),
        )
    }

    /// Verifies the `hmac` parameter of a redirect against the other params.
    ///
    /// Returns [`Verdict::Forged`] when `hmac` is absent or not valid hex.
    #[must_use]
    pub fn verify_query(&self, params: &[(String, String)]) -> Verdict {
        let Some(provided) = params
            .iter()
            .find(|(key, _)| key == "hmac")
            .map(|(_, value)| value.trim())
        else {
            return Verdict::Forged;
        };
        let Ok(provided) = hex::decode(provided) else {
            return Verdict::Forged;
        };

        let message = canonical_query(params);
        self.verify_bytes(message.as_bytes(), &provided)
    }

    /// Verifies a base64 webhook signature over the raw body.
    #[must_use]
    pub fn verify_body(&self, body: &[u8], provided: &str) -> Verdict {
        match STANDARD.decode(provided.trim()) {
            Ok(provided) => self.verify_bytes(body, &provided),
            Err(_) => Verdict::Forged,
        }
    }

    /// Signs redirect params with the primary secret, returning lowercase hex.
    #[must_use]
    pub fn sign_query(&self, params: &[(String, String)]) -> String {
        let message = canonical_query(params);
        hex::encode(mac_with(&self.primary, message.as_bytes()).finalize().into_bytes())
    }

    /// Signs a body with the primary secret, returning base64.
    #[must_use]
    pub fn sign_body(&self, body: &[u8]) -> String {
        STANDARD.encode(mac_with(&self.primary, body).finalize().into_bytes())
    }

    fn verify_bytes(&self, message: &[u8], provided: &[u8]) -> Verdict {
        let secrets = std::iter::once(&self.primary).chain(self.fallback.as_ref());
        for secret in secrets {
            if mac_with(secret, message).verify_slice(provided).is_ok() {
                return Verdict::Authentic;
            }
        }
        Verdict::Forged
    }
}

#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
fn mac_with(secret: &ApiSecretKey, message: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_ref().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message);
    mac
}

/// Renders redirect params in the form Shopify signs.
///
/// - `hmac` and `signature` are dropped
/// - params are sorted by key
/// - each param renders as `key=value`, joined with `&`
/// - in values `%` becomes `%25` and `&` becomes `%26`; keys additionally
///   escape `=` as `%3D`
/// - a key ending in `[]`, or repeated, renders once with its values as a
///   list: `ids[]=1&ids[]=2` becomes `ids=["1", "2"]`
///
/// ```rust
/// use wholesale_sync::auth::oauth::hmac::canonical_query;
///
/// let params = vec![
///     ("shop".to_string(), "a.myshopify.com".to_string()),
///     ("hmac".to_string(), "ignored".to_string()),
///     ("code".to_string(), "x&y".to_string()),
/// ];
/// assert_eq!(canonical_query(&params), "code=x%26y&shop=a.myshopify.com");
/// ```
#[must_use]
pub fn canonical_query(params: &[(String, String)]) -> String {
    let mut grouped: BTreeMap<String, (bool, Vec<String>)> = BTreeMap::new();

    for (key, value) in params {
        if SIGNATURE_PARAMS.contains(&key.as_str()) {
            continue;
        }
        let (name, is_list) = key
            .strip_suffix("[]")
            .map_or((key.as_str(), false), |name| (name, true));
        let entry = grouped
            .entry(escape_key(name))
            .or_insert_with(|| (false, Vec::new()));
        entry.0 |= is_list;
        entry.1.push(escape_value(value));
    }

    grouped
        .into_iter()
        .map(|(key, (is_list, values))| {
            if is_list || values.len() > 1 {
                let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
                format!("{key}=[{}]", quoted.join(", "))
            } else {
                format!("{key}={}", values.concat())
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn escape_value(value: &str) -> String {
    value.replace('%', "%25").replace('&', "%26")
}

fn escape_key(key: &str) -> String {
    escape_value(key).replace('=', "%3D")
}
