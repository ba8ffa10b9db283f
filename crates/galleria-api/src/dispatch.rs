//! Dynamic dispatch of extension-contributed routes.
//!
//! Extension routes live outside the static axum router so they can come
//! and go at runtime. Unmatched requests fall through here and are
//! resolved against the current route-table snapshot.

use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::Request;
use tracing::debug;

use galleria_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Fallback handler resolving requests against the extension route table.
pub async fn dispatch_extension_route(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match state.ctx.routes.resolve(&method, &path).await {
        Some(handler) => {
            debug!(method = %method, path = %path, "Dispatching extension route");
            handler.call(request).await
        }
        None => ApiError(AppError::not_found(format!("No route for {method} {path}")))
            .into_response(),
    }
}
