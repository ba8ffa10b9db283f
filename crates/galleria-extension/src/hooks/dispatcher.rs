//! Hook dispatcher — broadcasts call-outs across registered extensions.
//!
//! Broadcast order is registration order. A call-out raising an error is
//! not caught here: the first error stops the broadcast and propagates to
//! the caller, so a broken extension is visible to the operator instead of
//! being silently swallowed.

use std::sync::Arc;

use tracing::debug;

use galleria_core::error::{AppError, ErrorKind};

use crate::context::AppContext;

use super::registry::HookRegistry;

/// Dispatches call-outs to registered extensions.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Invokes `setup` on every registered extension, in registration
    /// order. Errors propagate immediately, tagged with the failing id.
    pub async fn broadcast_setup(&self, ctx: &AppContext) -> Result<(), AppError> {
        let handles = self.registry.handles().await;
        debug!(extension_count = handles.len(), "Broadcasting setup");

        for (id, handle) in handles {
            handle.setup(ctx).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Extension,
                    format!("Extension '{id}' setup failed: {e}"),
                    e,
                )
            })?;
        }

        Ok(())
    }

    /// Invokes `setup` on a single registered extension. Used when the
    /// broadcast is configured to target only the newly loaded extension.
    pub async fn dispatch_setup(&self, id: &str, ctx: &AppContext) -> Result<(), AppError> {
        let Some(handle) = self.registry.get(id).await else {
            return Ok(());
        };

        handle.setup(ctx).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Extension,
                format!("Extension '{id}' setup failed: {e}"),
                e,
            )
        })
    }

    /// Invokes `teardown` on a single registered extension. Unknown ids
    /// are a no-op; extensions not implementing the call-out run the
    /// default no-op body.
    pub async fn dispatch_teardown(&self, id: &str, ctx: &AppContext) -> Result<(), AppError> {
        let Some(handle) = self.registry.get(id).await else {
            return Ok(());
        };

        handle.teardown(ctx).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Extension,
                format!("Extension '{id}' teardown failed: {e}"),
                e,
            )
        })
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}
