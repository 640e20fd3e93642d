//! # Shopify Wholesale Sync
//!
//! A Shopify app service that installs into merchant stores, imports
//! products from a wholesale catalog and keeps catalog stock in step with
//! paid orders.
//!
//! ## Overview
//!
//! - OAuth 2.0 install flow via [`auth::oauth`], with signed callbacks and
//!   single-use nonces
//! - Per-shop credentials behind the [`store::CredentialStore`] trait
//! - Order webhooks via [`webhooks`], verified over the raw body and fanned
//!   out to the catalog as stock decrements
//! - Product import via [`catalog::import`]
//! - Type-safe configuration via [`AppConfig`] and [`AppConfigBuilder`]
//! - Async HTTP client with retry and rate limit handling via [`clients`]
//! - The axum service in [`server`]
//!
//! ## Quick Start
//!
//! ```rust
//! use wholesale_sync::{AppConfig, ApiKey, ApiSecretKey, ApiVersion, AuthScopes, HostUrl};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .app_url(HostUrl::new("https://app.example.com").unwrap())
//!     .scopes("read_orders,write_inventory".parse::<AuthScopes>().unwrap())
//!     .api_version(ApiVersion::V2024_01)
//!     .build()
//!     .unwrap();
//!
//! assert!(config.scopes().covers(&"read_inventory".parse().unwrap()));
//! ```
//!
//! ## Running the Service
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use wholesale_sync::AppConfig;
//! use wholesale_sync::server::{router, AppState};
//!
//! let config = AppConfig::from_env()?;
//! let addr = config.bind_addr();
//! let app = router(AppState::in_memory(config)?);
//!
//! let listener = tokio::net::TcpListener::bind(addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and stores are passed explicitly
//! - **Fail-fast validation**: all newtypes validate on construction
//! - **Secrets stay hidden**: tokens and keys never appear in `Debug`, logs
//!   or error messages
//! - **Thread-safe**: all shared types are `Send + Sync`

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod webhooks;

pub use auth::{AccessToken, AuthScopes, ShopCredential, ShopInfo};
pub use catalog::CatalogCredentials;
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, AppConfig, AppConfigBuilder, HostUrl, ShopDomain,
};
pub use error::ConfigError;

pub use clients::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};

pub use auth::oauth::{begin_auth, validate_auth_callback, AuthQuery, BeginAuthResult, OAuthError};
