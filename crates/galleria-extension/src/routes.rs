//! The live table of extension-contributed HTTP routes.
//!
//! The table is the single shared resource between request handling and
//! lifecycle operations. Every mutation builds a fresh route vector and
//! swaps it in behind an `Arc`, so concurrent readers always observe a
//! complete snapshot and never a route mid-removal.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use http::{Method, Request};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Identity of a route: method plus path, the unit of ownership diffing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    /// HTTP method.
    pub method: Method,
    /// Request path, e.g. `/hello`.
    pub path: String,
}

impl RouteKey {
    /// Creates a route key.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Trait for handlers backing extension-contributed routes.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// Handles a request routed to this handler.
    async fn call(&self, request: Request<Body>) -> Response;
}

/// A closure-based route handler for quick handler creation.
pub struct ClosureRouteHandler {
    /// Handler function.
    handler: Arc<
        dyn Fn(
                Request<Body>,
            ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
            + Send
            + Sync,
    >,
}

impl ClosureRouteHandler {
    /// Creates a new closure-based handler.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Response> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |request| Box::pin(handler(request))),
        }
    }
}

#[async_trait]
impl RouteHandler for ClosureRouteHandler {
    async fn call(&self, request: Request<Body>) -> Response {
        (self.handler)(request).await
    }
}

/// A single extension-contributed route.
#[derive(Clone)]
pub struct ExtensionRoute {
    /// Route identity.
    pub key: RouteKey,
    /// The handler invoked for matching requests.
    pub handler: Arc<dyn RouteHandler>,
}

impl ExtensionRoute {
    /// Creates a route from its parts.
    pub fn new(method: Method, path: impl Into<String>, handler: Arc<dyn RouteHandler>) -> Self {
        Self {
            key: RouteKey::new(method, path),
            handler,
        }
    }
}

impl std::fmt::Debug for ExtensionRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRoute")
            .field("key", &self.key)
            .field("handler", &"<handler>")
            .finish()
    }
}

/// The shared, swap-on-write table of extension routes.
#[derive(Debug)]
pub struct RouteTable {
    /// Current snapshot. Mutations replace the whole vector.
    routes: RwLock<Arc<Vec<ExtensionRoute>>>,
}

impl RouteTable {
    /// Creates an empty route table.
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Returns the current immutable snapshot.
    pub async fn snapshot(&self) -> Arc<Vec<ExtensionRoute>> {
        self.routes.read().await.clone()
    }

    /// Returns the keys of all routes, in table order.
    pub async fn keys(&self) -> Vec<RouteKey> {
        self.routes
            .read()
            .await
            .iter()
            .map(|r| r.key.clone())
            .collect()
    }

    /// Adds a route, swapping in a new snapshot.
    ///
    /// Adding a key that is already present replaces the handler in place
    /// instead of growing the table, so a repeated `setup` broadcast never
    /// produces duplicate entries attributable to the wrong extension.
    pub async fn add(&self, route: ExtensionRoute) {
        let mut guard = self.routes.write().await;
        let mut next: Vec<ExtensionRoute> = guard.as_ref().clone();

        if let Some(existing) = next.iter_mut().find(|r| r.key == route.key) {
            debug!(route = %route.key, "Route already present, replacing handler");
            existing.handler = route.handler;
        } else {
            info!(route = %route.key, "Route added");
            next.push(route);
        }

        *guard = Arc::new(next);
    }

    /// Removes a route by key, swapping in a new snapshot.
    ///
    /// Returns whether the route was present. Removing an absent key is
    /// tolerated; the table may have been mutated externally.
    pub async fn remove(&self, key: &RouteKey) -> bool {
        let mut guard = self.routes.write().await;

        if !guard.iter().any(|r| &r.key == key) {
            debug!(route = %key, "Route already absent, nothing to remove");
            return false;
        }

        let next: Vec<ExtensionRoute> = guard
            .as_ref()
            .iter()
            .filter(|r| &r.key != key)
            .cloned()
            .collect();

        info!(route = %key, "Route removed");
        *guard = Arc::new(next);
        true
    }

    /// Removes a set of routes in a single snapshot swap.
    ///
    /// Readers observe either all of the keys or none of them, never a
    /// half-removed set. Absent keys are tolerated. Returns how many
    /// routes were actually removed.
    pub async fn remove_all(&self, keys: &[RouteKey]) -> usize {
        let mut guard = self.routes.write().await;

        let next: Vec<ExtensionRoute> = guard
            .as_ref()
            .iter()
            .filter(|r| !keys.contains(&r.key))
            .cloned()
            .collect();

        let removed = guard.len() - next.len();
        if removed == 0 {
            debug!("Routes already absent, nothing to remove");
            return 0;
        }

        info!(routes = removed, "Routes removed");
        *guard = Arc::new(next);
        removed
    }

    /// Resolves a request to a handler from the current snapshot.
    pub async fn resolve(&self, method: &Method, path: &str) -> Option<Arc<dyn RouteHandler>> {
        self.routes
            .read()
            .await
            .iter()
            .find(|r| &r.key.method == method && r.key.path == path)
            .map(|r| r.handler.clone())
    }

    /// Returns the number of routes in the table.
    pub async fn len(&self) -> usize {
        self.routes.read().await.len()
    }

    /// Returns whether the table is empty.
    pub async fn is_empty(&self) -> bool {
        self.routes.read().await.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}
