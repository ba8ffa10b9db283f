//! Sample extension: contributes a `GET /hello` route.

use std::sync::Arc;

use axum::Json;
use axum::response::IntoResponse;
use serde_json::json;

use galleria_extension_sdk::prelude::*;

/// The extension id, matching its directory name under the extensions root.
pub const ID: &str = "hello";

/// Contributes a single JSON greeting route.
#[derive(Debug, Default)]
pub struct HelloExtension;

#[async_trait]
impl Extension for HelloExtension {
    async fn setup(&self, ctx: &AppContext) -> Result<(), AppError> {
        ctx.routes
            .add(ExtensionRoute::new(
                http::Method::GET,
                "/hello",
                Arc::new(ClosureRouteHandler::new(|_req| async {
                    Json(json!({"message": "Hello from extension!"})).into_response()
                })),
            ))
            .await;
        Ok(())
    }
}

/// Factory for registering this extension as compiled-in.
pub fn factory() -> Arc<dyn Extension> {
    Arc::new(HelloExtension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_contributes_hello_route() {
        let ctx = AppContext::new();
        HelloExtension.setup(&ctx).await.unwrap();

        assert!(
            ctx.routes
                .resolve(&http::Method::GET, "/hello")
                .await
                .is_some()
        );
    }
}
