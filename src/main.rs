//! Galleria Server — asset gallery with runtime extensions.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use galleria_api::state::AppState;
use galleria_core::config::AppConfig;
use galleria_core::error::AppError;
use galleria_extension::context::AppContext;
use galleria_extension::manager::ExtensionManager;
use galleria_extension::state::ExtensionStateStore;

#[tokio::main]
async fn main() {
    let env = std::env::var("GALLERIA_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => fmt().with_env_filter(filter).json().init(),
        _ => fmt().with_env_filter(filter).init(),
    }
}

/// Wire up the extension system and serve HTTP
async fn run(config: AppConfig) -> Result<(), AppError> {
    let config = Arc::new(config);

    let state_store = Arc::new(ExtensionStateStore::connect(&config.database).await?);
    let manager = Arc::new(ExtensionManager::new(&config.extensions, state_store)?);

    // Compiled-in sample extensions. Each still needs its manifest
    // directory under the extensions root to be discoverable.
    manager
        .register_builtin(extension_hello::ID, Box::new(extension_hello::factory))
        .await;
    manager
        .register_builtin(extension_banner::ID, Box::new(extension_banner::factory))
        .await;

    let ctx = AppContext::new();

    if config.extensions.auto_load {
        manager.bootstrap(&ctx).await?;
    }

    let state = AppState::new(config.clone(), manager, ctx);
    let router = galleria_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Galleria server listening");

    axum::serve(listener, router).await?;
    Ok(())
}
