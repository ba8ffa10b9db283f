//! # galleria-extension
//!
//! Runtime extension framework for Galleria. Provides:
//!
//! - Durable extension enabled/disabled state (sqlite)
//! - Descriptor discovery over an extensions directory
//! - Hook registry with registration-ordered broadcast dispatch
//! - Extension loader/unloader with route-ownership diffing
//! - Lifecycle manager tying state, loader, and route table together
//! - Optional dynamic loading via `libloading` (feature `dynamic`)

pub mod context;
pub mod discovery;
pub mod hooks;
pub mod interceptors;
pub mod loader;
pub mod manager;
pub mod prelude;
pub mod routes;
pub mod state;

pub use context::AppContext;
pub use discovery::{ExtensionDescriptor, ExtensionDiscovery, Manifest};
pub use hooks::definitions::Extension;
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::HookRegistry;
pub use interceptors::{RenderInterceptor, RenderInterceptors};
pub use loader::{ExtensionFactory, ExtensionLoader, LoadedExtension};
pub use manager::ExtensionManager;
pub use routes::{ClosureRouteHandler, ExtensionRoute, RouteHandler, RouteKey, RouteTable};
pub use state::ExtensionStateStore;
