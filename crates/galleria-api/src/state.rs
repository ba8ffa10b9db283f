//! Application state shared across all handlers.

use std::sync::Arc;

use galleria_core::config::AppConfig;
use galleria_extension::context::AppContext;
use galleria_extension::manager::ExtensionManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped (or Arc-backed) for cheap cloning.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Extension lifecycle manager.
    pub extensions: Arc<ExtensionManager>,
    /// Context handed to extension call-outs; holds the live route table
    /// and the render interceptor chain.
    pub ctx: AppContext,
}

impl AppState {
    /// Assembles the state from its parts.
    pub fn new(config: Arc<AppConfig>, extensions: Arc<ExtensionManager>, ctx: AppContext) -> Self {
        Self {
            config,
            extensions,
            ctx,
        }
    }
}
