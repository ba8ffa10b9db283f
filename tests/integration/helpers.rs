//! Shared test helpers for integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use galleria_api::state::AppState;
use galleria_core::config::{AppConfig, DatabaseConfig, ExtensionConfig};
use galleria_extension::context::AppContext;
use galleria_extension::manager::ExtensionManager;
use galleria_extension::state::ExtensionStateStore;

/// Test application context
pub struct TestApp {
    /// Keeps the temp directory alive for the test's duration
    _tmp: tempfile::TempDir,
    /// The Axum router for making test requests
    pub router: Router,
    /// Extension lifecycle manager
    pub manager: Arc<ExtensionManager>,
    /// Durable state store for direct assertions
    pub state_store: Arc<ExtensionStateStore>,
    /// Context holding the route table and interceptor chain
    pub ctx: AppContext,
}

/// Decoded response from a test request
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Raw body text
    pub text: String,
}

impl TestResponse {
    /// Parse the body as JSON, panicking on malformed payloads.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).expect("response body is not JSON")
    }
}

impl TestApp {
    /// Create a test application with manifest directories for the given
    /// extension ids. The `hello` and `banner` compiled-in factories are
    /// always registered; ids without a factory behave as manifest-only
    /// extensions.
    pub async fn new(ids: &[&str]) -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");

        let root = tmp.path().join("extensions");
        for id in ids {
            let dir = root.join(id);
            std::fs::create_dir_all(&dir).expect("Failed to create extension dir");
            std::fs::write(
                dir.join("manifest.json"),
                format!(r#"{{"name": "{id} extension", "version": "1.0.0"}}"#),
            )
            .expect("Failed to write manifest");
        }

        Self::boot(tmp, root).await
    }

    /// Rebuild the manager, context, and router over the same durable
    /// state and extension directories, simulating a process restart.
    pub async fn restart(self) -> Self {
        let tmp = self._tmp;
        let root = tmp.path().join("extensions");
        drop(self.router);
        Self::boot(tmp, root).await
    }

    async fn boot(tmp: tempfile::TempDir, root: PathBuf) -> Self {
        let config = Arc::new(AppConfig {
            database: DatabaseConfig {
                path: tmp.path().join("state.db").to_string_lossy().into_owned(),
                max_connections: 2,
            },
            extensions: ExtensionConfig {
                directory: root.to_string_lossy().into_owned(),
                auto_load: true,
                broadcast_setup_to_all: true,
            },
            ..AppConfig::default()
        });

        let state_store = Arc::new(
            ExtensionStateStore::connect(&config.database)
                .await
                .expect("Failed to open state store"),
        );

        let manager = Arc::new(
            ExtensionManager::new(&config.extensions, state_store.clone())
                .expect("Failed to build extension manager"),
        );
        manager
            .register_builtin(extension_hello::ID, Box::new(extension_hello::factory))
            .await;
        manager
            .register_builtin(extension_banner::ID, Box::new(extension_banner::factory))
            .await;

        let ctx = AppContext::new();
        manager.bootstrap(&ctx).await.expect("Bootstrap failed");

        let state = AppState::new(config, manager.clone(), ctx.clone());
        let router = galleria_api::build_router(state);

        Self {
            _tmp: tmp,
            router,
            manager,
            state_store,
            ctx,
        }
    }

    /// Issue a request against the router.
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
