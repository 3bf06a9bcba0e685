//! Configuration types and defaults for poml.
//!
//! This module defines the enums and default value functions used by the
//! Config struct.

use serde::{Deserialize, Serialize};

/// What to do when two data sources declare the same binding name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateBindingPolicy {
    /// Fail with a duplicate binding error (default, safest).
    #[default]
    Error,
    /// The last declaration silently replaces earlier ones.
    Overwrite,
}

impl DuplicateBindingPolicy {
    /// Parse a duplicate binding policy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "error" => Some(Self::Error),
            "overwrite" => Some(Self::Overwrite),
            _ => None,
        }
    }
}

/// Shape of the rendered prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// A single flat string (default).
    #[default]
    #[serde(rename = "string", alias = "text")]
    Text,
    /// Role-labeled message blocks.
    #[serde(rename = "messages")]
    Messages,
}

impl OutputMode {
    /// Parse an output mode from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "string" | "text" => Some(Self::Text),
            "messages" => Some(Self::Messages),
            _ => None,
        }
    }
}

/// Default name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "poml.yaml";

pub(super) fn default_true() -> bool {
    true
}
