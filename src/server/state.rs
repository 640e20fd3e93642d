//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::oauth::CallbackDeps;
use crate::catalog::import::ImportDeps;
use crate::catalog::CatalogSettings;
use crate::clients::{build_reqwest_client, HttpError};
use crate::config::AppConfig;
use crate::store::{AuthStateStore, CredentialStore, MemoryAuthStateStore, MemoryCredentialStore};
use crate::webhooks::IngestDeps;

/// Handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    http: reqwest::Client,
    credentials: Arc<dyn CredentialStore>,
    states: Arc<dyn AuthStateStore>,
    settings: CatalogSettings,
}

impl AppState {
    /// Creates state from explicit parts.
    ///
    /// Catalog settings are seeded from the configured catalog credentials.
    #[must_use]
    pub fn new(
        config: AppConfig,
        http: reqwest::Client,
        credentials: Arc<dyn CredentialStore>,
        states: Arc<dyn AuthStateStore>,
    ) -> Self {
        let settings = CatalogSettings::new(config.catalog_credentials().cloned());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                http,
                credentials,
                states,
                settings,
            }),
        }
    }

    /// Creates state with in-memory stores and a client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the HTTP client cannot be built.
    pub fn in_memory(config: AppConfig) -> Result<Self, HttpError> {
        let http = build_reqwest_client(&config)?;
        let states = Arc::new(MemoryAuthStateStore::new(config.nonce_ttl()));
        Ok(Self::new(
            config,
            http,
            Arc::new(MemoryCredentialStore::new()),
            states,
        ))
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.inner.credentials.as_ref()
    }

    #[must_use]
    pub fn states(&self) -> &dyn AuthStateStore {
        self.inner.states.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &CatalogSettings {
        &self.inner.settings
    }

    pub(crate) fn callback_deps(&self) -> CallbackDeps<'_> {
        CallbackDeps {
            config: self.config(),
            http: self.http(),
            states: self.states(),
            credentials: self.credentials(),
        }
    }

    pub(crate) fn ingest_deps(&self) -> IngestDeps<'_> {
        IngestDeps {
            config: self.config(),
            http: self.http(),
            settings: self.settings(),
        }
    }

    pub(crate) fn import_deps(&self) -> ImportDeps<'_> {
        ImportDeps {
            config: self.config(),
            http: self.http(),
            credentials: self.credentials(),
            settings: self.settings(),
        }
    }
}
