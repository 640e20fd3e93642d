//! `POST /import`

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::catalog::{import_product, ImportOutcome, ImportRequest};
use crate::server::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: ImportOutcome,
}

pub async fn import(
    State(state): State<AppState>,
    body: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let outcome = import_product(state.import_deps(), &request).await?;
    Ok(Json(ImportResponse {
        success: true,
        message: "Product imported successfully",
        outcome,
    }))
}
