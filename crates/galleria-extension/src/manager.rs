//! Extension lifecycle manager.
//!
//! The façade tying durable state, discovery, the loader, and the hook
//! registry together. Durable state is written before the loader runs, so
//! a crash mid-load leaves the intent recorded and bootstrap self-heals on
//! the next start. All lifecycle operations are serialized behind one
//! mutex; the route table is a single shared resource and its mutation
//! must be globally exclusive.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use galleria_core::config::ExtensionConfig;
use galleria_core::error::AppError;

use crate::context::AppContext;
use crate::discovery::{ExtensionDescriptor, ExtensionDiscovery};
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registry::HookRegistry;
use crate::loader::{ExtensionFactory, ExtensionLoader};
use crate::state::ExtensionStateStore;

/// Manages the full extension lifecycle: enable, disable, bootstrap, list.
///
/// The manager is the only component that mutates both the durable state
/// store and the loader's in-memory set within one logical operation.
#[derive(Debug)]
pub struct ExtensionManager {
    /// Durable enabled/disabled state.
    state: Arc<ExtensionStateStore>,
    /// Descriptor discovery over the extensions root.
    discovery: ExtensionDiscovery,
    /// Loader/unloader for extension code units.
    loader: ExtensionLoader,
    /// Hook registry shared with the dispatcher.
    registry: Arc<HookRegistry>,
    /// Dispatcher for call-out broadcasts.
    dispatcher: Arc<HookDispatcher>,
    /// Serializes enable/disable/bootstrap against each other.
    lifecycle: Mutex<()>,
}

impl ExtensionManager {
    /// Creates a manager over the configured extensions root.
    pub fn new(
        config: &ExtensionConfig,
        state: Arc<ExtensionStateStore>,
    ) -> Result<Self, AppError> {
        let registry = Arc::new(HookRegistry::new());
        let dispatcher = Arc::new(HookDispatcher::new(registry.clone()));
        let discovery = ExtensionDiscovery::new(&config.directory, state.clone())?;
        let loader = ExtensionLoader::new(
            &config.directory,
            config.broadcast_setup_to_all,
            registry.clone(),
            dispatcher.clone(),
        );

        Ok(Self {
            state,
            discovery,
            loader,
            registry,
            dispatcher,
            lifecycle: Mutex::new(()),
        })
    }

    /// Registers a compiled-in extension factory.
    pub async fn register_builtin(&self, id: &str, factory: ExtensionFactory) {
        self.loader.register_builtin(id, factory).await;
    }

    /// Lists all discoverable extensions with their enabled flags.
    pub async fn list(&self) -> Result<Vec<ExtensionDescriptor>, AppError> {
        self.discovery.discover().await
    }

    /// Enables an extension: persists the intent, then loads it.
    ///
    /// Enabling an extension that is already enabled and loaded is
    /// success, not an error. Unknown ids are rejected here; the state
    /// store itself never validates existence.
    pub async fn enable(
        &self,
        id: &str,
        ctx: &AppContext,
    ) -> Result<ExtensionDescriptor, AppError> {
        let _guard = self.lifecycle.lock().await;

        let mut descriptor = self.find_descriptor(id).await?;

        // State first: a crash before the load completes leaves durable
        // intent that bootstrap retries on the next start.
        self.state.set_state(id, true).await?;
        self.loader.load(id, ctx).await?;

        descriptor.enabled = true;
        info!(extension_id = %id, "Extension enabled");
        Ok(descriptor)
    }

    /// Disables an extension: persists the intent, dispatches `teardown`
    /// if it is loaded, then unloads it.
    ///
    /// Disabling an extension that was never loaded still records the
    /// disabled state.
    pub async fn disable(
        &self,
        id: &str,
        ctx: &AppContext,
    ) -> Result<ExtensionDescriptor, AppError> {
        let _guard = self.lifecycle.lock().await;

        let mut descriptor = self.find_descriptor(id).await?;

        self.state.set_state(id, false).await?;

        if self.loader.is_loaded(id).await {
            self.dispatcher.dispatch_teardown(id, ctx).await?;
        }
        self.loader.unload(id, ctx).await?;

        descriptor.enabled = false;
        info!(extension_id = %id, "Extension disabled");
        Ok(descriptor)
    }

    /// Loads every discovered extension whose durable state says enabled,
    /// in discovery order.
    ///
    /// "Enabled but not loaded" is the normal startup condition, so a
    /// failing extension is logged and skipped rather than aborting the
    /// rest of startup; the next enable call or restart retries it.
    pub async fn bootstrap(&self, ctx: &AppContext) -> Result<(), AppError> {
        let _guard = self.lifecycle.lock().await;

        let descriptors = self.discovery.discover().await?;
        let enabled_count = descriptors.iter().filter(|d| d.enabled).count();
        info!(
            discovered = descriptors.len(),
            enabled = enabled_count,
            "Bootstrapping extensions"
        );

        for descriptor in descriptors.iter().filter(|d| d.enabled) {
            if let Err(e) = self.loader.load(&descriptor.id, ctx).await {
                error!(
                    extension_id = %descriptor.id,
                    error = %e,
                    "Extension failed to load during bootstrap, skipping"
                );
            }
        }

        Ok(())
    }

    /// Returns whether an extension is currently loaded.
    pub async fn is_loaded(&self, id: &str) -> bool {
        self.loader.is_loaded(id).await
    }

    /// Returns the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Returns the hook dispatcher.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.dispatcher
    }

    /// Returns the durable state store.
    pub fn state(&self) -> &Arc<ExtensionStateStore> {
        &self.state
    }

    async fn find_descriptor(&self, id: &str) -> Result<ExtensionDescriptor, AppError> {
        self.discovery
            .discover()
            .await?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::not_found(format!("Extension '{id}' not found")))
    }
}
