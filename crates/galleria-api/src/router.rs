//! Route definitions for the Galleria HTTP API.
//!
//! Operator endpoints are mounted under `/api`; everything unmatched falls
//! back to dynamic dispatch against the extension route table.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::dispatch;
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(extension_routes())
        .merge(health_routes());

    Router::new()
        .route("/", get(handlers::gallery::gallery_page))
        .nest("/api", api_routes)
        .fallback(dispatch::dispatch_extension_route)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Extension lifecycle endpoints: list, enable, disable
fn extension_routes() -> Router<AppState> {
    Router::new()
        .route("/extensions", get(handlers::extensions::list_extensions))
        .route(
            "/extensions/{id}/enable",
            post(handlers::extensions::enable_extension),
        )
        .route(
            "/extensions/{id}/disable",
            post(handlers::extensions::disable_extension),
        )
}

/// Liveness endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
