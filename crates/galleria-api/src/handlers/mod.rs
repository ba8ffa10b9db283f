//! HTTP request handlers, grouped by domain.

pub mod extensions;
pub mod gallery;
pub mod health;
