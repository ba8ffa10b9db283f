//! # galleria-api
//!
//! HTTP surface for Galleria: the operator control endpoints for the
//! extension system, the gallery page, and dynamic dispatch of
//! extension-contributed routes.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
