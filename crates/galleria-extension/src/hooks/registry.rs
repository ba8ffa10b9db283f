//! Hook registry — extension handles in registration order.
//!
//! The registry is the process-wide set of code units reachable by
//! broadcast dispatch. It is constructed once by the server's startup
//! routine and shared by reference; entries are added on load and removed
//! on unload.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::definitions::Extension;

/// Entry in the hook registry.
struct RegistryEntry {
    /// Owning extension id.
    id: String,
    /// The extension's code-unit handle.
    handle: Arc<dyn Extension>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry").field("id", &self.id).finish()
    }
}

/// Registration-ordered registry of extension handles.
#[derive(Debug)]
pub struct HookRegistry {
    /// Entries in registration order; order governs broadcast dispatch.
    entries: RwLock<Vec<RegistryEntry>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Registers a handle under an extension id.
    ///
    /// Registering an id that is already present replaces the handle in
    /// place, keeping its original position in dispatch order.
    pub async fn register(&self, id: &str, handle: Arc<dyn Extension>) {
        let mut entries = self.entries.write().await;

        if let Some(existing) = entries.iter_mut().find(|e| e.id == id) {
            debug!(extension_id = %id, "Extension already registered, replacing handle");
            existing.handle = handle;
            return;
        }

        info!(extension_id = %id, "Extension registered with hook registry");
        entries.push(RegistryEntry {
            id: id.to_string(),
            handle,
        });
    }

    /// Unregisters an id. Unregistering an unknown id is a no-op.
    pub async fn unregister(&self, id: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() != before {
            info!(extension_id = %id, "Extension unregistered from hook registry");
        }
    }

    /// Returns `(id, handle)` pairs in registration order.
    pub async fn handles(&self) -> Vec<(String, Arc<dyn Extension>)> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| (e.id.clone(), e.handle.clone()))
            .collect()
    }

    /// Returns the handle registered under an id, if any.
    pub async fn get(&self, id: &str) -> Option<Arc<dyn Extension>> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.handle.clone())
    }

    /// Returns whether an id is registered.
    pub async fn contains(&self, id: &str) -> bool {
        self.entries.read().await.iter().any(|e| e.id == id)
    }

    /// Returns the number of registered extensions.
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
