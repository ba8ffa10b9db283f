//! Application context passed to extension call-outs.

use std::sync::Arc;

use crate::interceptors::RenderInterceptors;
use crate::routes::RouteTable;

/// The single object handed to every extension call-out, exposing the
/// resources an extension may contribute to.
///
/// Constructed once by the server's startup routine and passed by
/// reference everywhere; there is no process-global instance.
#[derive(Clone)]
pub struct AppContext {
    /// The live table of extension-contributed routes.
    pub routes: Arc<RouteTable>,
    /// The ordered render-interceptor chain.
    pub interceptors: Arc<RenderInterceptors>,
}

impl AppContext {
    /// Creates a fresh context with an empty route table and chain.
    pub fn new() -> Self {
        Self {
            routes: Arc::new(RouteTable::new()),
            interceptors: Arc::new(RenderInterceptors::new()),
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish()
    }
}
