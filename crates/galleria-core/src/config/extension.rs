//! Extension system configuration.

use serde::{Deserialize, Serialize};

/// Extension system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Directory containing extension folders (one subdirectory per extension).
    #[serde(default = "default_extension_directory")]
    pub directory: String,
    /// Whether to load enabled extensions automatically on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Whether a load event broadcasts `setup` to every registered
    /// extension (the historical behavior) or only to the newly loaded one.
    #[serde(default = "default_true")]
    pub broadcast_setup_to_all: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            directory: default_extension_directory(),
            auto_load: true,
            broadcast_setup_to_all: true,
        }
    }
}

fn default_extension_directory() -> String {
    "./extensions".to_string()
}

fn default_true() -> bool {
    true
}
