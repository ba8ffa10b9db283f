//! # galleria-core
//!
//! Shared foundations for Galleria: the unified [`error::AppError`] type
//! and the TOML-backed application configuration.

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
