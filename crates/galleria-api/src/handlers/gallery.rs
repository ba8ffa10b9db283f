//! The gallery landing page.
//!
//! Rendering is deliberately plain HTML assembled here; what matters to
//! the extension system is that the output passes through the render
//! interceptor chain, giving extensions an ordered, revertible way to
//! rewrite the page.

use axum::extract::State;
use axum::response::Html;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /` — the gallery page, piped through the interceptor chain.
pub async fn gallery_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let descriptors = state.extensions.list().await?;
    let enabled = descriptors.iter().filter(|d| d.enabled).count();

    let html = render_gallery(descriptors.len(), enabled);
    let html = state.ctx.interceptors.apply(html).await;

    Ok(Html(html))
}

fn render_gallery(total: usize, enabled: usize) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Asset Gallery</title></head>\n\
         <body>\n<h1>Asset Gallery</h1>\n\
         <p>{enabled} of {total} extensions enabled</p>\n\
         </body>\n</html>\n"
    )
}
