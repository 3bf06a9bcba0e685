//! Command implementations for poml.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the helpers they share.

mod parse;
mod render;
mod validate_cmd;

#[cfg(test)]
mod tests;

use crate::cli::Command;
use poml::config::Config;
use poml::error::{PomlError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// Loads `config_path`, or `poml.yaml` from the working directory when
/// present; command-line flags override it.
pub fn dispatch(command: Command, config_path: Option<&Path>) -> Result<()> {
    let config = Config::discover(config_path, Path::new("."))?;

    match command {
        Command::Validate(args) => validate_cmd::cmd_validate(args, &config),
        Command::Render(args) => render::cmd_render(args, config),
        Command::Parse(args) => parse::cmd_parse(args, &config),
    }
}

/// Read a markup file, reporting a missing file as a user error.
fn read_markup(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            PomlError::UserError(format!("markup file not found: {}", path.display()))
        }
        _ => PomlError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}
