//! # galleria-extension-sdk
//!
//! SDK for developing Galleria extensions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use galleria_extension_sdk::prelude::*;
//!
//! #[derive(Debug)]
//! struct MyExtension;
//!
//! #[async_trait]
//! impl Extension for MyExtension {
//!     async fn setup(&self, ctx: &AppContext) -> Result<(), AppError> {
//!         ctx.routes
//!             .add(ExtensionRoute::new(
//!                 http::Method::GET,
//!                 "/mine",
//!                 Arc::new(ClosureRouteHandler::new(|_req| async {
//!                     "hi".into_response()
//!                 })),
//!             ))
//!             .await;
//!         Ok(())
//!     }
//! }
//!
//! declare_extension!(MyExtension, MyExtension);
//! ```
//!
//! Extensions built as shared libraries are placed as
//! `extension.<dll-suffix>` inside their directory under the extensions
//! root, next to `manifest.json`. Compiled-in extensions skip the macro
//! and register a factory with the lifecycle manager instead.

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use galleria_core::error::AppError;
    pub use galleria_extension::context::AppContext;
    pub use galleria_extension::hooks::definitions::Extension;
    pub use galleria_extension::interceptors::RenderInterceptor;
    pub use galleria_extension::routes::{
        ClosureRouteHandler, ExtensionRoute, RouteHandler, RouteKey,
    };
}

/// Declares the `create_extension` entry point for a dynamically loaded
/// extension.
///
/// The first argument is the extension type, the second an expression
/// constructing it.
#[macro_export]
macro_rules! declare_extension {
    ($extension_type:ty, $constructor:expr) => {
        /// Entry point resolved by the host's dynamic loader.
        #[unsafe(no_mangle)]
        pub extern "C" fn create_extension()
        -> *mut dyn $crate::prelude::Extension {
            let extension: $extension_type = $constructor;
            let boxed: Box<dyn $crate::prelude::Extension> = Box::new(extension);
            Box::into_raw(boxed)
        }
    };
}
