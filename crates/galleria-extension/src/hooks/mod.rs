//! Hook system — call-out surface, registry, and broadcast dispatcher.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::Extension;
pub use dispatcher::HookDispatcher;
pub use registry::HookRegistry;
