//! Ordered render-interceptor chain.
//!
//! Extensions that want to rewrite rendered pages register an interceptor
//! here instead of monkey-patching a shared render function. The chain is
//! applied in registration order, and every entry is tagged with the owning
//! extension id so unload can remove exactly what that extension added.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

/// A transformation applied to rendered HTML before it is served.
pub trait RenderInterceptor: Send + Sync {
    /// A name unique within the owning extension, used to replace an
    /// interceptor on re-registration instead of stacking duplicates.
    fn name(&self) -> &str;

    /// Wraps the rendered page, returning the (possibly modified) HTML.
    fn wrap(&self, html: String) -> String;
}

/// Entry in the interceptor chain.
struct InterceptorEntry {
    /// Extension that registered this interceptor.
    owner: String,
    /// Interceptor name within the owner.
    name: String,
    /// The interceptor.
    interceptor: Arc<dyn RenderInterceptor>,
}

impl std::fmt::Debug for InterceptorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorEntry")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .finish()
    }
}

/// The ordered chain of render interceptors.
#[derive(Debug)]
pub struct RenderInterceptors {
    /// Registration-ordered entries.
    chain: RwLock<Vec<InterceptorEntry>>,
}

impl RenderInterceptors {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            chain: RwLock::new(Vec::new()),
        }
    }

    /// Registers an interceptor for the given owner.
    ///
    /// Re-registering under the same `(owner, name)` pair replaces the
    /// existing entry in place, so a repeated `setup` broadcast does not
    /// stack duplicates.
    pub async fn register(&self, owner: &str, interceptor: Arc<dyn RenderInterceptor>) {
        let name = interceptor.name().to_string();
        let mut chain = self.chain.write().await;

        if let Some(existing) = chain
            .iter_mut()
            .find(|e| e.owner == owner && e.name == name)
        {
            debug!(owner = %owner, name = %name, "Interceptor already present, replacing");
            existing.interceptor = interceptor;
            return;
        }

        info!(owner = %owner, name = %name, "Render interceptor registered");
        chain.push(InterceptorEntry {
            owner: owner.to_string(),
            name,
            interceptor,
        });
    }

    /// Removes every interceptor owned by the given extension id.
    pub async fn remove_owner(&self, owner: &str) {
        let mut chain = self.chain.write().await;
        let before = chain.len();
        chain.retain(|e| e.owner != owner);

        if chain.len() != before {
            info!(owner = %owner, removed = before - chain.len(), "Render interceptors removed");
        }
    }

    /// Pipes rendered HTML through the chain in registration order.
    pub async fn apply(&self, html: String) -> String {
        let chain = self.chain.read().await;
        chain
            .iter()
            .fold(html, |acc, entry| entry.interceptor.wrap(acc))
    }

    /// Returns the number of registered interceptors.
    pub async fn count(&self) -> usize {
        self.chain.read().await.len()
    }
}

impl Default for RenderInterceptors {
    fn default() -> Self {
        Self::new()
    }
}
