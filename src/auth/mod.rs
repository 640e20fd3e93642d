//! Shop authorization.
//!
//! - [`AuthScopes`]: a set of OAuth scopes with implied read scopes
//! - [`ShopCredential`]: the access token committed for one shop
//! - [`oauth`]: the install flow that produces credentials
//!
//! # Example
//!
//! ```rust
//! use wholesale_sync::{AccessToken, AuthScopes, ShopDomain};
//! use wholesale_sync::auth::ShopCredential;
//!
//! let credential = ShopCredential::new(
//!     ShopDomain::new("demo.myshopify.com").unwrap(),
//!     AccessToken::new("shpat_example"),
//!     "write_products".parse::<AuthScopes>().unwrap(),
//! );
//!
//! // write_products implies read_products
//! assert!(credential.scopes.covers(&"read_products".parse().unwrap()));
//! assert!(!format!("{credential:?}").contains("shpat_example"));
//! ```

mod credential;
pub mod oauth;
mod scopes;

pub use credential::{AccessToken, ShopCredential, ShopInfo};
pub use scopes::AuthScopes;
