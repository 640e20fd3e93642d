//! `GET /config` and `POST /config`: runtime catalog credentials.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{CatalogCredentials, CredentialSummary};
use crate::server::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub config: Option<CredentialSummary>,
}

/// `GET /config`
pub async fn show(State(state): State<AppState>) -> Json<SettingsResponse> {
    let config = state.settings().get().await.map(|c| c.summary());
    Json(SettingsResponse {
        success: true,
        message: None,
        config,
    })
}

/// `POST /config`
pub async fn update(
    State(state): State<AppState>,
    body: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let Json(update) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let credentials = CatalogCredentials::new(
        update.app_id.unwrap_or_default(),
        update.secret_key.unwrap_or_default(),
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let summary = credentials.summary();
    state.settings().set(credentials).await;
    info!(app_id = %summary.app_id, "catalog credentials replaced");

    Ok(Json(SettingsResponse {
        success: true,
        message: Some("Configuration saved successfully"),
        config: Some(summary),
    }))
}
