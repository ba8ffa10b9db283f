//! The call-out surface extensions may implement.

use async_trait::async_trait;

use galleria_core::error::AppError;

use crate::context::AppContext;

/// Trait implemented by every extension code unit.
///
/// `setup` is the only mandatory call-out; `teardown` has a default no-op
/// body, which is how "does not implement this call-out" is expressed —
/// such extensions are silently skipped by dispatch.
///
/// Call-out errors are not caught here or in the dispatcher; propagation
/// policy belongs to the caller driving the lifecycle.
#[async_trait]
pub trait Extension: Send + Sync + std::fmt::Debug {
    /// Called when the extension is loaded (and, under broadcast-to-all
    /// semantics, again on every subsequent load event). Contributions
    /// made through `ctx` are diffed into the extension's owned set.
    async fn setup(&self, ctx: &AppContext) -> Result<(), AppError>;

    /// Optional symmetric cleanup, invoked by the lifecycle manager before
    /// the extension's routes are removed.
    async fn teardown(&self, _ctx: &AppContext) -> Result<(), AppError> {
        Ok(())
    }
}
