//! Sample extension: rewrites the gallery page title through the render
//! interceptor chain instead of patching the renderer itself.

use std::sync::Arc;

use tracing::info;

use galleria_extension_sdk::prelude::*;

/// The extension id, matching its directory name under the extensions root.
pub const ID: &str = "banner";

/// Replaces the stock gallery title on every rendered page.
#[derive(Debug, Default)]
pub struct BannerExtension;

struct TitleInterceptor;

impl RenderInterceptor for TitleInterceptor {
    fn name(&self) -> &str {
        "title"
    }

    fn wrap(&self, html: String) -> String {
        html.replace("Asset Gallery", "Asset Gallery [banner]")
    }
}

#[async_trait]
impl Extension for BannerExtension {
    async fn setup(&self, ctx: &AppContext) -> Result<(), AppError> {
        ctx.interceptors
            .register(ID, Arc::new(TitleInterceptor))
            .await;
        Ok(())
    }

    // Interceptor removal happens in the unloader; teardown is the place
    // for any state the chain does not track.
    async fn teardown(&self, _ctx: &AppContext) -> Result<(), AppError> {
        info!(extension_id = ID, "Banner extension tearing down");
        Ok(())
    }
}

/// Factory for registering this extension as compiled-in.
pub fn factory() -> Arc<dyn Extension> {
    Arc::new(BannerExtension)
}
