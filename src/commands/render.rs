//! Implementation of the `poml render` command.
//!
//! # Steps
//!
//! 1. Apply command-line overrides to the loaded config
//! 2. Run the structural check; any problem fails with the validation code
//! 3. Run the render pass under an optional deadline
//! 4. Print the prompt as text or JSON

use super::read_markup;
use crate::cli::RenderArgs;
use poml::cancel::CancelToken;
use poml::config::{Config, DuplicateBindingPolicy, OutputMode};
use poml::error::{PomlError, Result};
use poml::pipeline::Pipeline;
use poml::render::RenderedPrompt;
use poml::validate::validate_file;
use std::time::{Duration, Instant};
use tracing::debug;

/// Execute the `poml render` command.
pub fn cmd_render(args: RenderArgs, config: Config) -> Result<()> {
    println!("{}", render_to_string(&args, config)?);
    Ok(())
}

/// Render the file and return what `cmd_render` prints.
pub(super) fn render_to_string(args: &RenderArgs, config: Config) -> Result<String> {
    let config = apply_overrides(config, args)?;
    let base_dir = config.resolve_base_dir(Some(&args.file));
    debug!(file = %args.file.display(), base_dir = %base_dir.display(), "rendering");

    let check = validate_file(&args.file, Some(&base_dir))?;
    if !check.ok {
        eprintln!("{}", check.format_report());
        return Err(PomlError::ValidationFailed(format!(
            "{} problem(s) in {}",
            check.problems.len(),
            args.file.display()
        )));
    }

    let source = read_markup(&args.file)?;
    let cancel = match args.timeout_ms {
        Some(ms) => CancelToken::with_deadline(Instant::now() + Duration::from_millis(ms)),
        None => CancelToken::new(),
    };

    let prompt = Pipeline::new(config)
        .with_base_dir(base_dir)
        .run_with(&source, &cancel)?;

    if args.json {
        serde_json::to_string_pretty(&prompt)
            .map_err(|e| PomlError::UserError(format!("failed to serialize prompt: {}", e)))
    } else {
        Ok(format_prompt(&prompt))
    }
}

fn apply_overrides(mut config: Config, args: &RenderArgs) -> Result<Config> {
    if let Some(mode) = &args.mode {
        config.output_mode = OutputMode::from_str(mode).ok_or_else(|| {
            PomlError::UserError(format!(
                "invalid --mode '{}' (expected string or messages)",
                mode
            ))
        })?;
    }
    if let Some(policy) = &args.duplicate_binding {
        config.duplicate_binding = DuplicateBindingPolicy::from_str(policy).ok_or_else(|| {
            PomlError::UserError(format!(
                "invalid --duplicate-binding '{}' (expected error or overwrite)",
                policy
            ))
        })?;
    }
    if args.strict {
        config.strict_unknown_tags = true;
    }
    if args.lenient {
        config.strict_unknown_tags = false;
    }
    if let Some(base_dir) = &args.base_dir {
        config.base_dir = Some(base_dir.clone());
    }
    Ok(config)
}

/// Human-readable form of a prompt.
///
/// Messages are printed under a `--- role ---` header, followed by any
/// image sources.
fn format_prompt(prompt: &RenderedPrompt) -> String {
    match prompt {
        RenderedPrompt::Text(text) => text.clone(),
        RenderedPrompt::Messages(messages) => messages
            .iter()
            .map(|message| {
                let mut block = format!("--- {} ---\n{}", message.role.as_str(), message.content);
                for src in &message.images {
                    block.push_str(&format!("\n(image: {})", src));
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
