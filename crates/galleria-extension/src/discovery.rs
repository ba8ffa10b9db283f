//! Extension descriptor discovery.
//!
//! Scans the extensions root for subdirectories containing a
//! `manifest.json` and returns descriptors ordered by directory name. A
//! directory without a manifest, or with one that fails to parse, is
//! skipped so a single malformed extension never aborts discovery.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use galleria_core::error::{AppError, ErrorKind};

use crate::state::ExtensionStateStore;

/// Name of the manifest file inside every extension directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Structured metadata describing an extension, as found on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Human-readable name; falls back to the directory name.
    #[serde(default)]
    pub name: Option<String>,
    /// All remaining manifest fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An extension as seen by one discovery pass. Recreated on every scan,
/// never mutated, never persisted; the manifest on disk is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// The directory name. Always wins over any `id` field inside the
    /// manifest, so an extension cannot impersonate another.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form manifest fields.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Joined from the state store; absent ids default to disabled.
    pub enabled: bool,
}

/// Scans an extensions root and enumerates available extensions.
#[derive(Debug, Clone)]
pub struct ExtensionDiscovery {
    /// The extensions root directory.
    root: PathBuf,
    /// Used to compute the `enabled` flag on descriptors.
    state: Arc<ExtensionStateStore>,
}

impl ExtensionDiscovery {
    /// Creates a discovery instance over the given root, creating the
    /// directory if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>, state: Arc<ExtensionStateStore>) -> Result<Self, AppError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Cannot create extensions root '{}': {e}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, state })
    }

    /// Returns the extensions root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerates all discoverable extensions, ordered by directory name.
    pub async fn discover(&self) -> Result<Vec<ExtensionDescriptor>, AppError> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&self.root)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Cannot read extensions root '{}': {e}", self.root.display()),
                    e,
                )
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let states = self.state.get_all().await?;

        let mut descriptors = Vec::new();
        for dir in dirs {
            let Some(id) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let manifest_path = dir.join(MANIFEST_FILE);
            let raw = match std::fs::read_to_string(&manifest_path) {
                Ok(raw) => raw,
                Err(_) => continue,
            };

            let manifest: Manifest = match serde_json::from_str(&raw) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(
                        extension_id = %id,
                        path = %manifest_path.display(),
                        error = %e,
                        "Skipping extension with malformed manifest"
                    );
                    continue;
                }
            };

            let mut metadata = manifest.extra;
            // The directory name is the identity; a conflicting manifest
            // "id" field must not be able to impersonate another extension.
            metadata.remove("id");

            descriptors.push(ExtensionDescriptor {
                id: id.to_string(),
                name: manifest.name.unwrap_or_else(|| id.to_string()),
                metadata,
                enabled: states.get(id).copied().unwrap_or(false),
            });
        }

        Ok(descriptors)
    }
}
