//! Common imports for working with the extension framework.

pub use crate::context::AppContext;
pub use crate::discovery::{ExtensionDescriptor, Manifest};
pub use crate::hooks::definitions::Extension;
pub use crate::interceptors::{RenderInterceptor, RenderInterceptors};
pub use crate::routes::{ClosureRouteHandler, ExtensionRoute, RouteHandler, RouteKey, RouteTable};

pub use async_trait::async_trait;
pub use galleria_core::error::AppError;
