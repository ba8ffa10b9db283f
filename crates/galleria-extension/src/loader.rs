//! Extension loader/unloader.
//!
//! Resolves an extension's code unit, registers it with the hook registry,
//! broadcasts `setup`, and diffs the route table around the broadcast to
//! capture which routes the load contributed. Unload reverts exactly that
//! set plus any render interceptors the extension registered.
//!
//! Code units come in two forms, mirroring how sample extensions ship:
//! compiled-in factories registered at startup, and (behind the `dynamic`
//! feature) shared libraries loaded per extension directory. Each dynamic
//! library is loaded into its own handle, so same-named internal symbols
//! in different extensions never collide.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use galleria_core::error::AppError;

use crate::context::AppContext;
use crate::hooks::definitions::Extension;
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registry::HookRegistry;
use crate::routes::RouteKey;

/// Factory producing a compiled-in extension's handle.
pub type ExtensionFactory = Box<dyn Fn() -> Arc<dyn Extension> + Send + Sync>;

/// Runtime record of one loaded extension. Never persisted; rebuilt from
/// durable state on every process restart.
pub struct LoadedExtension {
    /// Extension id.
    pub id: String,
    /// Handle to the executed code unit.
    pub handle: Arc<dyn Extension>,
    /// Routes this extension contributed, in table order at load time.
    pub routes: Vec<RouteKey>,
    /// Keeps the shared library mapped for as long as the extension is
    /// loaded. Dropped last, after every reference into it is gone.
    #[cfg(feature = "dynamic")]
    _library: Option<libloading::Library>,
}

impl std::fmt::Debug for LoadedExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedExtension")
            .field("id", &self.id)
            .field("routes", &self.routes)
            .finish()
    }
}

/// Resolved code unit for a single load attempt.
enum CodeUnit {
    /// Compiled-in extension produced by a registered factory.
    Builtin(Arc<dyn Extension>),
    /// Extension loaded from a shared library.
    #[cfg(feature = "dynamic")]
    Dynamic(Arc<dyn Extension>, libloading::Library),
}

/// Loads and unloads extension code units into the running process.
pub struct ExtensionLoader {
    /// The extensions root directory.
    root: PathBuf,
    /// Whether a load event broadcasts `setup` to every registered
    /// extension or only to the newly loaded one.
    broadcast_setup_to_all: bool,
    /// Compiled-in extension factories, keyed by id.
    factories: RwLock<HashMap<String, ExtensionFactory>>,
    /// Currently loaded extensions. At most one entry per id.
    loaded: RwLock<HashMap<String, LoadedExtension>>,
    /// Hook registry shared with the dispatcher.
    registry: Arc<HookRegistry>,
    /// Dispatcher used for the setup broadcast.
    dispatcher: Arc<HookDispatcher>,
}

impl std::fmt::Debug for ExtensionLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionLoader")
            .field("root", &self.root)
            .field("broadcast_setup_to_all", &self.broadcast_setup_to_all)
            .finish()
    }
}

impl ExtensionLoader {
    /// Creates a loader over the given extensions root.
    pub fn new(
        root: impl Into<PathBuf>,
        broadcast_setup_to_all: bool,
        registry: Arc<HookRegistry>,
        dispatcher: Arc<HookDispatcher>,
    ) -> Self {
        Self {
            root: root.into(),
            broadcast_setup_to_all,
            factories: RwLock::new(HashMap::new()),
            loaded: RwLock::new(HashMap::new()),
            registry,
            dispatcher,
        }
    }

    /// Registers a compiled-in extension factory under an id.
    pub async fn register_builtin(&self, id: &str, factory: ExtensionFactory) {
        debug!(extension_id = %id, "Built-in extension factory registered");
        self.factories.write().await.insert(id.to_string(), factory);
    }

    /// Returns whether an id is currently loaded.
    pub async fn is_loaded(&self, id: &str) -> bool {
        self.loaded.read().await.contains_key(id)
    }

    /// Returns the route keys owned by a loaded extension.
    pub async fn owned_routes(&self, id: &str) -> Vec<RouteKey> {
        self.loaded
            .read()
            .await
            .get(id)
            .map(|l| l.routes.clone())
            .unwrap_or_default()
    }

    /// Returns the ids of all loaded extensions.
    pub async fn loaded_ids(&self) -> Vec<String> {
        self.loaded.read().await.keys().cloned().collect()
    }

    /// Loads an extension's code unit and captures its contributions.
    ///
    /// Loading an already-loaded id is a no-op. An extension with a
    /// manifest but no code unit is valid and loads nothing. A code unit
    /// that fails during execution or setup is fatal for this attempt:
    /// the error propagates and no loaded record is created, but earlier
    /// registrations are deliberately left as-is (no partial rollback);
    /// a later load attempt re-registers idempotently.
    pub async fn load(&self, id: &str, ctx: &AppContext) -> Result<(), AppError> {
        if self.loaded.read().await.contains_key(id) {
            debug!(extension_id = %id, "Extension already loaded, skipping");
            return Ok(());
        }

        let Some(unit) = self.resolve_code_unit(id).await? else {
            info!(extension_id = %id, "Extension has no code unit, nothing to load");
            return Ok(());
        };

        #[cfg(feature = "dynamic")]
        let (handle, library) = match unit {
            CodeUnit::Builtin(handle) => (handle, None),
            CodeUnit::Dynamic(handle, library) => (handle, Some(library)),
        };
        #[cfg(not(feature = "dynamic"))]
        let CodeUnit::Builtin(handle) = unit;

        self.registry.register(id, handle.clone()).await;

        let before: HashSet<RouteKey> = ctx.routes.keys().await.into_iter().collect();

        if self.broadcast_setup_to_all {
            self.dispatcher.broadcast_setup(ctx).await?;
        } else {
            self.dispatcher.dispatch_setup(id, ctx).await?;
        }

        let owned: Vec<RouteKey> = ctx
            .routes
            .keys()
            .await
            .into_iter()
            .filter(|key| !before.contains(key))
            .collect();

        info!(
            extension_id = %id,
            routes = owned.len(),
            "Extension loaded"
        );

        self.loaded.write().await.insert(
            id.to_string(),
            LoadedExtension {
                id: id.to_string(),
                handle,
                routes: owned,
                #[cfg(feature = "dynamic")]
                _library: library,
            },
        );

        Ok(())
    }

    /// Unloads an extension, reverting its contributions.
    ///
    /// Unloading an id that is not loaded is a no-op. Routes already
    /// absent from the table are tolerated.
    pub async fn unload(&self, id: &str, ctx: &AppContext) -> Result<(), AppError> {
        let Some(loaded) = self.loaded.write().await.remove(id) else {
            debug!(extension_id = %id, "Extension not loaded, nothing to unload");
            return Ok(());
        };

        ctx.routes.remove_all(&loaded.routes).await;

        ctx.interceptors.remove_owner(id).await;
        self.registry.unregister(id).await;

        info!(
            extension_id = %id,
            routes = loaded.routes.len(),
            "Extension unloaded"
        );

        // `loaded` drops here, releasing the handle and, for dynamic
        // extensions, unmapping the library last.
        Ok(())
    }

    /// Resolves the code unit for an id: a compiled-in factory first,
    /// then a shared library inside the extension directory.
    async fn resolve_code_unit(&self, id: &str) -> Result<Option<CodeUnit>, AppError> {
        if let Some(factory) = self.factories.read().await.get(id) {
            return Ok(Some(CodeUnit::Builtin(factory())));
        }

        #[cfg(feature = "dynamic")]
        {
            let path = self
                .root
                .join(id)
                .join(format!("extension{}", std::env::consts::DLL_SUFFIX));
            if path.exists() {
                let (handle, library) = unsafe { dynamic::load_from_path(&path)? };
                return Ok(Some(CodeUnit::Dynamic(handle, library)));
            }
        }

        Ok(None)
    }
}

/// Dynamic loading of extension shared libraries (feature-gated).
#[cfg(feature = "dynamic")]
mod dynamic {
    use std::path::Path;
    use std::sync::Arc;

    use tracing::info;

    use galleria_core::error::AppError;

    use crate::hooks::definitions::Extension;

    /// Type of the creation function exported by dynamic extensions.
    ///
    /// Dynamic extensions must export:
    /// `extern "C" fn create_extension() -> *mut dyn Extension`
    pub type CreateExtensionFn = unsafe extern "C" fn() -> *mut dyn Extension;

    /// Loads an extension from the given shared library path.
    ///
    /// # Safety
    /// This executes arbitrary code from a shared library. Extensions run
    /// with full host privileges; only load trusted code.
    pub unsafe fn load_from_path(
        path: &Path,
    ) -> Result<(Arc<dyn Extension>, libloading::Library), AppError> {
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            AppError::extension(format!(
                "Failed to load extension library '{}': {e}",
                path.display()
            ))
        })?;

        let create_fn: libloading::Symbol<CreateExtensionFn> =
            unsafe { library.get(b"create_extension") }.map_err(|e| {
                AppError::extension(format!(
                    "Extension library '{}' missing 'create_extension' symbol: {e}",
                    path.display()
                ))
            })?;

        let raw = unsafe { create_fn() };
        let handle: Arc<dyn Extension> = Arc::from(unsafe { Box::from_raw(raw) });

        info!(path = %path.display(), "Dynamic extension loaded");
        Ok((handle, library))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{ClosureRouteHandler, ExtensionRoute};
    use axum::response::IntoResponse;
    use http::Method;

    #[derive(Debug)]
    struct RouteContributor {
        path: String,
    }

    #[async_trait::async_trait]
    impl Extension for RouteContributor {
        async fn setup(&self, ctx: &AppContext) -> Result<(), AppError> {
            ctx.routes
                .add(ExtensionRoute::new(
                    Method::GET,
                    self.path.clone(),
                    Arc::new(ClosureRouteHandler::new(|_req| async {
                        "ok".into_response()
                    })),
                ))
                .await;
            Ok(())
        }
    }

    fn loader(broadcast_setup_to_all: bool) -> (ExtensionLoader, AppContext, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(HookRegistry::new());
        let dispatcher = Arc::new(HookDispatcher::new(registry.clone()));
        let loader =
            ExtensionLoader::new(dir.path(), broadcast_setup_to_all, registry, dispatcher);
        (loader, AppContext::new(), dir)
    }

    fn contributor(path: &str) -> ExtensionFactory {
        let path = path.to_string();
        Box::new(move || {
            Arc::new(RouteContributor {
                path: path.clone(),
            })
        })
    }

    #[tokio::test]
    async fn test_load_captures_owned_routes() {
        let (loader, ctx, _dir) = loader(true);
        loader.register_builtin("a", contributor("/a")).await;

        loader.load("a", &ctx).await.unwrap();

        assert!(loader.is_loaded("a").await);
        assert_eq!(
            loader.owned_routes("a").await,
            vec![RouteKey::new(Method::GET, "/a")]
        );
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let (loader, ctx, _dir) = loader(true);
        loader.register_builtin("a", contributor("/a")).await;

        loader.load("a", &ctx).await.unwrap();
        loader.load("a", &ctx).await.unwrap();

        assert_eq!(ctx.routes.len().await, 1);
        assert_eq!(loader.registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_manifest_only_extension_loads_nothing() {
        let (loader, ctx, _dir) = loader(true);

        loader.load("assets-only", &ctx).await.unwrap();

        assert!(!loader.is_loaded("assets-only").await);
        assert!(ctx.routes.is_empty().await);
    }

    #[tokio::test]
    async fn test_unload_round_trips_route_table() {
        let (loader, ctx, _dir) = loader(true);
        loader.register_builtin("a", contributor("/a")).await;
        loader.register_builtin("b", contributor("/b")).await;

        loader.load("a", &ctx).await.unwrap();
        let before_b: Vec<RouteKey> = ctx.routes.keys().await;

        loader.load("b", &ctx).await.unwrap();
        loader.unload("b", &ctx).await.unwrap();

        assert_eq!(ctx.routes.keys().await, before_b);
        assert!(!loader.is_loaded("b").await);
    }

    #[tokio::test]
    async fn test_broadcast_attributes_only_new_routes() {
        let (loader, ctx, _dir) = loader(true);
        loader.register_builtin("a", contributor("/a")).await;
        loader.register_builtin("b", contributor("/b")).await;

        loader.load("a", &ctx).await.unwrap();
        // Loading b re-broadcasts setup to a as well; a's route is already
        // present so only /b lands in b's owned set.
        loader.load("b", &ctx).await.unwrap();

        assert_eq!(
            loader.owned_routes("b").await,
            vec![RouteKey::new(Method::GET, "/b")]
        );
    }

    #[tokio::test]
    async fn test_targeted_setup_skips_earlier_extensions() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Debug)]
        struct CountingContributor {
            setups: Arc<AtomicUsize>,
        }

        #[async_trait::async_trait]
        impl Extension for CountingContributor {
            async fn setup(&self, ctx: &AppContext) -> Result<(), AppError> {
                self.setups.fetch_add(1, Ordering::SeqCst);
                ctx.routes
                    .add(ExtensionRoute::new(
                        Method::GET,
                        "/a",
                        Arc::new(ClosureRouteHandler::new(|_req| async {
                            "ok".into_response()
                        })),
                    ))
                    .await;
                Ok(())
            }
        }

        let (loader, ctx, _dir) = loader(false);
        let setups = Arc::new(AtomicUsize::new(0));
        let counted = setups.clone();
        loader
            .register_builtin(
                "a",
                Box::new(move || {
                    Arc::new(CountingContributor {
                        setups: counted.clone(),
                    })
                }),
            )
            .await;
        loader.register_builtin("b", contributor("/b")).await;

        loader.load("a", &ctx).await.unwrap();
        loader.load("b", &ctx).await.unwrap();

        // Loading b dispatched setup to b alone; a's setup ran once.
        assert_eq!(setups.load(Ordering::SeqCst), 1);
        assert_eq!(
            loader.owned_routes("b").await,
            vec![RouteKey::new(Method::GET, "/b")]
        );
        assert_eq!(ctx.routes.len().await, 2);

        loader.unload("a", &ctx).await.unwrap();
        assert_eq!(
            ctx.routes.keys().await,
            vec![RouteKey::new(Method::GET, "/b")]
        );
    }

    #[tokio::test]
    async fn test_failed_setup_leaves_extension_not_loaded() {
        #[derive(Debug)]
        struct Failing;

        #[async_trait::async_trait]
        impl Extension for Failing {
            async fn setup(&self, _ctx: &AppContext) -> Result<(), AppError> {
                Err(AppError::internal("broken extension"))
            }
        }

        let (loader, ctx, _dir) = loader(true);
        loader
            .register_builtin("bad", Box::new(|| Arc::new(Failing)))
            .await;

        assert!(loader.load("bad", &ctx).await.is_err());
        assert!(!loader.is_loaded("bad").await);
    }
}
