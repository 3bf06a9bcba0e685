//! POML: structured prompt markup.
//!
//! This is the main entry point for the `poml` CLI. It parses arguments,
//! sets up logging, dispatches to the appropriate command handler, and
//! handles errors with proper exit codes.

mod cli;
mod commands;

use cli::Cli;
use poml::exit_codes;
use std::process::ExitCode;
use tracing::debug;

/// Log to stderr so prompts on stdout stay pipeable.
///
/// `RUST_LOG` directives apply on top of the default level.
fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    debug!(verbose, "logging initialized");
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_logging(cli.verbose);

    match commands::dispatch(cli.command, cli.config.as_deref()) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
