//! Install flow handlers.
//!
//! - `GET /authorize?shop=`: redirects to Shopify's consent screen
//! - `GET /callback`: completes the install and redirects to the app

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::auth::oauth::{begin_auth, validate_auth_callback, AuthQuery};
use crate::server::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub shop: Option<String>,
}

/// `GET /authorize`
pub async fn authorize(
    State(state): State<AppState>,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Response, ApiError> {
    let shop = query
        .shop
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Shop parameter is required".to_string()))?;

    let started = begin_auth(state.config(), state.states(), shop).await?;
    Ok(found(&started.auth_url))
}

/// `GET /callback`
///
/// The query is taken as raw pairs so the signature is checked over every
/// parameter Shopify sent.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let installed = validate_auth_callback(state.callback_deps(), &AuthQuery::new(params)).await?;
    Ok(found(&installed.landing_url))
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
