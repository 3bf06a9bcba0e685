//! CLI argument parsing for poml.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Default pattern for markup files found while walking directories.
pub const DEFAULT_PATTERN: &str = "**/*.poml";

/// POML: structured prompt markup.
///
/// Parses `.poml` files, binds the data files they declare, expands
/// template expressions and prints the model-ready prompt. Never calls a
/// model itself.
#[derive(Parser, Debug)]
#[command(name = "poml")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./poml.yaml when present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for poml.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check markup files for root tags and missing data files.
    ///
    /// Directories are walked recursively and filtered by `--pattern`.
    /// Fails with the validation exit code when any problem is found.
    Validate(ValidateArgs),

    /// Render a markup file to a prompt.
    ///
    /// Runs the structural check first, then parse, bind, expand and render.
    Render(RenderArgs),

    /// Parse a markup file and print its canonical form.
    Parse(ParseArgs),
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Markup files or directories to check.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Glob selecting markup files inside directories.
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Resolve data sources here instead of next to each file.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Markup file to render.
    pub file: PathBuf,

    /// Output mode: `string` or `messages`.
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Reject unknown section tags.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "lenient")]
    pub strict: bool,

    /// Keep unknown section tags as generic sections.
    #[arg(long, action = ArgAction::SetTrue)]
    pub lenient: bool,

    /// Duplicate binding policy: `error` or `overwrite`.
    #[arg(long)]
    pub duplicate_binding: Option<String>,

    /// Resolve data sources here instead of next to the file.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Print the prompt as JSON.
    #[arg(long)]
    pub json: bool,

    /// Abort the render pass after this many milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Arguments for the `parse` command.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Markup file to parse.
    pub file: PathBuf,

    /// Keep unknown section tags as generic sections.
    #[arg(long)]
    pub lenient: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
