//! `GET /health`

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::clients::SERVICE_VERSION;

#[derive(Debug, Serialize)]
pub struct Health {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

/// Liveness only; dependencies are not checked.
pub async fn health() -> Json<Health> {
    Json(Health {
        success: true,
        message: "Wholesale sync service is running",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: SERVICE_VERSION,
    })
}
