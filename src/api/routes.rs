//! API Routes
//!
//! Configures the Axum router serving peer requests.

use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{peer_handler, AppState};

/// Creates the peer-facing router.
///
/// Every request reaches [`peer_handler`], which validates the base path
/// itself so a bad prefix gets a 400 rather than the router's empty 404.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(peer_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
