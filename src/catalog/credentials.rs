//! Credentials for the wholesale catalog API.
//!
//! The catalog authenticates every call with an `App-ID` / `Secret-Key`
//! header pair. The secret is masked in `Debug` output and never serialized.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Credentials for the wholesale catalog API (`App-ID` / `Secret-Key`).
///
/// `Debug` masks the secret key.
///
/// ```rust
/// use wholesale_sync::CatalogCredentials;
///
/// let creds = CatalogCredentials::new("app-1", "s3cret").unwrap();
/// assert_eq!(creds.app_id(), "app-1");
/// assert!(!format!("{creds:?}").contains("s3cret"));
/// assert!(CatalogCredentials::new("app-1", "").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogCredentials {
    app_id: String,
    secret_key: String,
}

impl CatalogCredentials {
    /// Creates credentials, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCatalogCredential`] naming the empty field.
    pub fn new(
        app_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let app_id = app_id.into().trim().to_string();
        let secret_key = secret_key.into().trim().to_string();
        if app_id.is_empty() {
            return Err(ConfigError::EmptyCatalogCredential { field: "appId" });
        }
        if secret_key.is_empty() {
            return Err(ConfigError::EmptyCatalogCredential { field: "secretKey" });
        }
        Ok(Self { app_id, secret_key })
    }

    /// Returns the app id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the secret key for the `Secret-Key` header.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Returns the public view of these credentials.
    #[must_use]
    pub fn summary(&self) -> CredentialSummary {
        CredentialSummary {
            app_id: self.app_id.clone(),
            secret_key_set: true,
        }
    }
}

impl fmt::Debug for CatalogCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogCredentials")
            .field("app_id", &self.app_id)
            .field("secret_key", &"*****")
            .finish()
    }
}

/// What `GET /config` reveals about the stored credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSummary {
    /// The app id.
    pub app_id: String,
    /// Always `true`; the secret itself is never returned.
    pub secret_key_set: bool,
}
