//! privacyspy-server: HTTP front end for the privacy policy scorer.
//!
//! Exposes `/analyze` over GET (query string) and POST (JSON body). Both return
//! the versioned response envelope from `privacyspy_common::api`.

pub mod config;
pub mod error;
pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use handlers::AppState;

/// Largest accepted request body. Inline HTML policies can be sizeable.
const MAX_REQUEST_BODY_BYTES: usize = 8 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(
            "/analyze",
            get(handlers::analyze_query).post(handlers::analyze_json),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}
