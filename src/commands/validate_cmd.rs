//! Implementation of the `poml validate` command.
//!
//! Files given directly are always checked. Directories are walked
//! recursively and only files whose path below the directory matches
//! `--pattern` are checked.

use crate::cli::ValidateArgs;
use globset::{Glob, GlobMatcher};
use poml::config::Config;
use poml::error::{PomlError, Result};
use poml::validate::{ValidationResult, validate_file};
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the `poml validate` command.
pub fn cmd_validate(args: ValidateArgs, config: &Config) -> Result<()> {
    let files = collect_files(&args.paths, &args.pattern)?;
    let base_dir = args.base_dir.as_deref().or(config.base_dir.as_deref());

    println!("Validating POML files...\n");
    let result = validate_all(&files, base_dir, |file, ok| {
        if ok {
            println!("✓ Found {}", file.display());
        }
    })?;
    println!("\n{}", result.format_report());

    if result.ok {
        Ok(())
    } else {
        Err(PomlError::ValidationFailed(format!(
            "{} problem(s) in {} file(s)",
            result.problems.len(),
            files.len()
        )))
    }
}

/// Validate every file, reporting each one's outcome to `on_file`.
pub(super) fn validate_all(
    files: &[PathBuf],
    base_dir: Option<&Path>,
    mut on_file: impl FnMut(&Path, bool),
) -> Result<ValidationResult> {
    let mut total = ValidationResult::pass();
    for file in files {
        let result = validate_file(file, base_dir)?;
        on_file(file, result.ok);
        total.merge(result);
    }
    Ok(total)
}

/// Expand the given paths into the list of markup files to check.
pub(super) fn collect_files(paths: &[PathBuf], pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .map_err(|e| PomlError::UserError(format!("invalid --pattern '{}': {}", pattern, e)))?
        .compile_matcher();

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let before = files.len();
            walk(path, path, &matcher, &mut files)?;
            if files.len() == before {
                return Err(PomlError::UserError(format!(
                    "no files matching '{}' under {}",
                    pattern,
                    path.display()
                )));
            }
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk(root: &Path, dir: &Path, matcher: &GlobMatcher, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| PomlError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            walk(root, &path, matcher, out)?;
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let normalized = relative.to_string_lossy().replace('\\', "/");
        if matcher.is_match(&normalized) {
            out.push(path);
        }
    }
    Ok(())
}
