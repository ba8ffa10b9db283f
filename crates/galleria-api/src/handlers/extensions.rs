//! Operator control surface for the extension system.

use axum::Json;
use axum::extract::{Path, State};

use galleria_extension::discovery::ExtensionDescriptor;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/extensions` — list all discoverable extensions.
pub async fn list_extensions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExtensionDescriptor>>, ApiError> {
    let descriptors = state.extensions.list().await?;
    Ok(Json(descriptors))
}

/// `POST /api/extensions/{id}/enable` — persist intent and load.
///
/// Enabling an extension already in that state is success.
pub async fn enable_extension(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExtensionDescriptor>, ApiError> {
    let descriptor = state.extensions.enable(&id, &state.ctx).await?;
    Ok(Json(descriptor))
}

/// `POST /api/extensions/{id}/disable` — persist intent and unload.
pub async fn disable_extension(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExtensionDescriptor>, ApiError> {
    let descriptor = state.extensions.disable(&id, &state.ctx).await?;
    Ok(Json(descriptor))
}
