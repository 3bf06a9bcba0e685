//! Tests for the command implementations.

use super::parse::parse_to_markup;
use super::read_markup;
use super::render::render_to_string;
use super::validate_cmd::{collect_files, validate_all};
use crate::cli::{DEFAULT_PATTERN, ParseArgs, RenderArgs};
use poml::config::Config;
use poml::error::PomlError;
use poml::exit_codes;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Helper functions
// =========================================================================

const SUPPORT: &str = r#"<poml><role>Support agent</role><data src="h.csv" format="csv" name="hist"/><task>{{#each hist}}{{this.issue}}{{/each}}</task></poml>"#;

fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn support_dir() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "h.csv", "issue\n\"billing\"\n\"shipping\"\n");
    let markup = write(temp.path(), "support.poml", SUPPORT);
    (temp, markup)
}

fn render_args(file: PathBuf) -> RenderArgs {
    RenderArgs {
        file,
        mode: None,
        strict: false,
        lenient: false,
        duplicate_binding: None,
        base_dir: None,
        json: false,
        timeout_ms: None,
    }
}

// =========================================================================
// render
// =========================================================================

#[test]
fn test_render_string_mode() {
    let (_temp, markup) = support_dir();
    let out = render_to_string(&render_args(markup), Config::default()).unwrap();
    assert_eq!(out, "Support agent\n\nbillingshipping");
}

#[test]
fn test_render_messages_mode_and_json() {
    let (_temp, markup) = support_dir();

    let mut args = render_args(markup);
    args.mode = Some("messages".to_string());
    let out = render_to_string(&args, Config::default()).unwrap();
    assert_eq!(out, "--- system ---\nSupport agent\n\n--- user ---\nbillingshipping");

    args.json = true;
    let json: serde_json::Value =
        serde_json::from_str(&render_to_string(&args, Config::default()).unwrap()).unwrap();
    assert_eq!(json[1]["role"], "user");
    assert_eq!(json[1]["content"], "billingshipping");
}

#[test]
fn test_render_fails_validation_before_parsing() {
    let temp = TempDir::new().unwrap();
    let markup = write(temp.path(), "support.poml", SUPPORT);

    let err = render_to_string(&render_args(markup), Config::default()).unwrap_err();

    assert!(matches!(err, PomlError::ValidationFailed(_)));
    assert_eq!(err.exit_code(), exit_codes::VALIDATION_FAILURE);
}

#[test]
fn test_render_invalid_mode_is_user_error() {
    let (_temp, markup) = support_dir();
    let mut args = render_args(markup);
    args.mode = Some("html".to_string());

    let err = render_to_string(&args, Config::default()).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn test_render_lenient_flag_overrides_config() {
    let temp = TempDir::new().unwrap();
    let markup = write(temp.path(), "p.poml", "<poml><note>kept</note></poml>");

    let err = render_to_string(&render_args(markup.clone()), Config::default()).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::PARSE_FAILURE);

    let mut args = render_args(markup);
    args.lenient = true;
    assert_eq!(render_to_string(&args, Config::default()).unwrap(), "kept");
}

#[test]
fn test_render_expired_deadline_is_cancelled() {
    let (_temp, markup) = support_dir();
    let mut args = render_args(markup);
    args.timeout_ms = Some(0);

    let err = render_to_string(&args, Config::default()).unwrap_err();
    assert!(matches!(err, PomlError::DeadlineExceeded { .. }));
    assert_eq!(err.exit_code(), exit_codes::CANCELLED);
}

#[test]
fn test_render_base_dir_flag() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "data/h.csv", "issue\n\"billing\"\n");
    let markup = write(temp.path(), "prompts/support.poml", SUPPORT);

    let mut args = render_args(markup);
    args.base_dir = Some(temp.path().join("data"));
    let out = render_to_string(&args, Config::default()).unwrap();
    assert!(out.ends_with("billing"));
}

// =========================================================================
// parse
// =========================================================================

#[test]
fn test_parse_prints_canonical_markup() {
    let temp = TempDir::new().unwrap();
    let markup = write(
        temp.path(),
        "p.poml",
        "<poml>\n  <task>Hi</task>\n  <data format=\"csv\" src=\"h.csv\"></data>\n</poml>\n",
    );

    let out = parse_to_markup(
        &ParseArgs {
            file: markup,
            lenient: false,
        },
        &Config::default(),
    )
    .unwrap();
    assert_eq!(out, r#"<poml><task>Hi</task><data format="csv" src="h.csv"/></poml>"#);
}

#[test]
fn test_missing_markup_is_user_error() {
    let err = read_markup(Path::new("/definitely/not/here.poml")).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

// =========================================================================
// validate
// =========================================================================

#[test]
fn test_collect_files_walks_directories_with_pattern() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.poml", SUPPORT);
    write(temp.path(), "nested/b.poml", SUPPORT);
    write(temp.path(), "nested/notes.txt", "x");

    let files = collect_files(&[temp.path().to_path_buf()], DEFAULT_PATTERN).unwrap();
    assert_eq!(
        files,
        vec![temp.path().join("a.poml"), temp.path().join("nested/b.poml")]
    );

    let only_nested = collect_files(&[temp.path().to_path_buf()], "nested/*.poml").unwrap();
    assert_eq!(only_nested, vec![temp.path().join("nested/b.poml")]);
}

#[test]
fn test_collect_files_rejects_bad_pattern_and_empty_dirs() {
    let temp = TempDir::new().unwrap();
    assert!(collect_files(&[temp.path().to_path_buf()], "[").is_err());
    assert!(collect_files(&[temp.path().to_path_buf()], DEFAULT_PATTERN).is_err());
}

#[test]
fn test_validate_all_reports_each_file() {
    let (temp, good) = support_dir();
    let bad = write(temp.path(), "sub/bad.poml", SUPPORT);

    let mut seen = Vec::new();
    let result = validate_all(&[good.clone(), bad.clone()], None, |file, ok| {
        seen.push((file.to_path_buf(), ok));
    })
    .unwrap();

    assert_eq!(seen, vec![(good, true), (bad, false)]);
    assert!(!result.ok);
    assert_eq!(result.problems.len(), 1);
}
