//! The HTTP service.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /authorize` | [`routes::auth::authorize`] |
//! | `GET /callback` | [`routes::auth::callback`] |
//! | `POST /webhooks/orders` | [`routes::webhooks::orders`] |
//! | `GET /config`, `POST /config` | [`routes::settings`] |
//! | `POST /import` | [`routes::import::import`] |
//! | `GET /health` | [`routes::health::health`] |
//!
//! [`router`] returns a ready-to-serve [`Router`] so tests can drive it with
//! `tower::ServiceExt::oneshot` without binding a socket.

mod error;
pub mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/authorize", get(routes::auth::authorize))
        .route("/callback", get(routes::auth::callback))
        .route("/webhooks/orders", post(routes::webhooks::orders))
        .route(
            "/config",
            get(routes::settings::show).post(routes::settings::update),
        )
        .route("/import", post(routes::import::import))
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
