//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a render pass.
///
/// This struct represents the contents of `poml.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility, and the
/// camelCase spellings of each key are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Parser settings
    // =========================================================================
    /// Reject unknown section tags (true) or downgrade them to generic sections.
    #[serde(default = "default_true", alias = "strictUnknownTags")]
    pub strict_unknown_tags: bool,

    // =========================================================================
    // Binder settings
    // =========================================================================
    /// Policy for data sources that reuse a binding name.
    #[serde(default, alias = "duplicateBinding")]
    pub duplicate_binding: DuplicateBindingPolicy,

    /// Root for resolving data source `src` attributes.
    /// When unset, the directory of the markup file (or `.`) is used.
    #[serde(default, alias = "baseDir", skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    // =========================================================================
    // Renderer settings
    // =========================================================================
    /// Flat string or role-tagged messages.
    #[serde(default, alias = "outputMode")]
    pub output_mode: OutputMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_unknown_tags: default_true(),
            duplicate_binding: DuplicateBindingPolicy::default(),
            base_dir: None,
            output_mode: OutputMode::default(),
        }
    }
}
