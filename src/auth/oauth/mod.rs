//! OAuth 2.0 authorization code grant for app installs.
//!
//! The install flow has two halves:
//!
//! 1. **Initiation** ([`begin_auth`]): validate the shop, record a fresh
//!    single-use [`Nonce`] and build the Shopify authorization URL.
//!
//! 2. **Callback** ([`validate_auth_callback`]): verify the callback
//!    signature, consume the nonce, exchange the code for a token, fetch
//!    shop metadata and commit the [`ShopCredential`](crate::auth::ShopCredential).
//!
//! # Security
//!
//! - Callback params are signed with HMAC-SHA256 over their canonical form;
//!   see [`SignatureVerifier`]
//! - A nonce is consumed on first presentation, so a callback URL cannot be
//!   replayed
//! - When an old API secret is configured, signatures made with it are still
//!   accepted during key rotation
//!
//! # Example
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use std::time::Duration;
//! use wholesale_sync::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
//! use wholesale_sync::auth::oauth::{begin_auth, AuthQuery, CallbackDeps, validate_auth_callback, OAuthError};
//! use wholesale_sync::store::{MemoryAuthStateStore, MemoryCredentialStore};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .app_url(HostUrl::new("https://app.example.com").unwrap())
//!     .build()
//!     .unwrap();
//! let states = MemoryAuthStateStore::new(Duration::from_secs(600));
//! let credentials = MemoryCredentialStore::new();
//!
//! let started = begin_auth(&config, &states, "demo.myshopify.com").await.unwrap();
//!
//! // An unsigned callback never reaches the network.
//! let query = AuthQuery::new(vec![
//!     ("shop".into(), "demo.myshopify.com".into()),
//!     ("code".into(), "code".into()),
//!     ("state".into(), started.state.to_string()),
//!     ("hmac".into(), "00".into()),
//! ]);
//! let deps = CallbackDeps {
//!     config: &config,
//!     http: &reqwest::Client::new(),
//!     states: &states,
//!     credentials: &credentials,
//! };
//! let result = validate_auth_callback(deps, &query).await;
//! assert!(matches!(result, Err(OAuthError::AuthenticationFailed)));
//! # }
//! ```

mod begin_auth;
mod callback;
mod error;
pub mod hmac;
mod state;

pub use begin_auth::{authorization_url, begin_auth, BeginAuthResult};
pub use callback::{landing_url, validate_auth_callback, AuthQuery, CallbackDeps, Installed};
pub use error::OAuthError;
pub use hmac::{SignatureVerifier, Verdict};
pub use state::{AuthorizationState, Nonce};
