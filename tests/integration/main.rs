//! Integration tests for the extension lifecycle, driven through the
//! real HTTP router.

mod helpers;

mod gallery_test;
mod lifecycle_test;
