//! Catalog credentials that can be replaced at runtime through `/config`.

use tokio::sync::RwLock;

use super::CatalogCredentials;

/// Runtime-replaceable catalog credentials.
///
/// Seeded from [`AppConfig::catalog_credentials`](crate::AppConfig::catalog_credentials)
/// and replaced through `POST /config`.
#[derive(Debug, Default)]
pub struct CatalogSettings {
    credentials: RwLock<Option<CatalogCredentials>>,
}

impl CatalogSettings {
    /// Creates settings holding `initial`.
    #[must_use]
    pub fn new(initial: Option<CatalogCredentials>) -> Self {
        Self {
            credentials: RwLock::new(initial),
        }
    }

    /// Returns the current credentials.
    pub async fn get(&self) -> Option<CatalogCredentials> {
        self.credentials.read().await.clone()
    }

    /// Replaces the current credentials.
    pub async fn set(&self, credentials: CatalogCredentials) {
        *self.credentials.write().await = Some(credentials);
    }
}
