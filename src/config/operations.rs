//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::DEFAULT_CONFIG_FILE;
use crate::error::{PomlError, Result};
use crate::parser::ParseOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the poml.yaml file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(PomlError::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            PomlError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "loaded config file");
        Self::from_yaml(&content)
    }

    /// Load an explicit config file, or `poml.yaml` from `dir` when present,
    /// or fall back to defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| PomlError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| PomlError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `base_dir`, when set, must not be empty
    pub fn validate(&self) -> Result<()> {
        if let Some(base_dir) = &self.base_dir
            && base_dir.as_os_str().is_empty()
        {
            return Err(PomlError::Config(
                "config validation failed: base_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Parser switches derived from this config.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict_unknown_tags: self.strict_unknown_tags,
        }
    }

    /// Directory that data source paths are resolved against.
    ///
    /// Uses `base_dir` when configured, else the directory containing
    /// `markup_path`, else the current directory.
    pub fn resolve_base_dir(&self, markup_path: Option<&Path>) -> PathBuf {
        if let Some(base_dir) = &self.base_dir {
            return base_dir.clone();
        }

        markup_path
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
