//! Structural pre-check for POML markup.
//!
//! Deliberately cheap: a few regex scans, no parse. It confirms the root
//! tags are present and that every file a `<data>` or `<img>` tag points at
//! exists under the base directory. Anything subtler is left to the parser.

mod types;


pub use types::{MARKUP_LABEL, Problem, ValidationResult};

use crate::error::{PomlError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));
static ROOT_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<poml(?:\s[^>]*)?/?>").expect("root pattern is valid"));
static ROOT_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</poml\s*>").expect("root close pattern is valid"));
static SOURCE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(data|img)((?:\s[^>]*)?)/?>").expect("source tag pattern is valid")
});
static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("src pattern is valid")
});

/// Check markup text for root tags and missing referenced files.
///
/// `src` paths are resolved against `base_dir`. Each distinct missing file
/// is reported once, in order of first reference.
///
/// # Example
///
/// ```
/// use poml::validate::validate;
///
/// let result = validate("<poml><task>Hi</task></poml>", std::path::Path::new("."));
/// assert!(result.ok);
/// ```
pub fn validate(text: &str, base_dir: &Path) -> ValidationResult {
    let text = COMMENT_RE.replace_all(text, "");
    let mut problems = Vec::new();

    let root = ROOT_OPEN_RE.find(&text);
    if root.is_none() {
        problems.push(Problem::markup("missing <poml> root tag"));
    }
    // A self-closing root has nothing to close.
    let self_closing = root.is_some_and(|tag| tag.as_str().ends_with("/>"));
    if !self_closing && !ROOT_CLOSE_RE.is_match(&text) {
        problems.push(Problem::markup("missing </poml> closing tag"));
    }

    let mut seen = HashSet::new();
    for tag in SOURCE_TAG_RE.captures_iter(&text) {
        let name = tag[1].to_ascii_lowercase();
        let Some(src) = SRC_ATTR_RE
            .captures(&tag[2])
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str())
        else {
            problems.push(Problem::markup(format!("<{}> tag without a src attribute", name)));
            continue;
        };

        let path = base_dir.join(src);
        if !seen.insert(path.clone()) {
            continue;
        }
        if !path.exists() {
            let what = if name == "img" { "image" } else { "data" };
            problems.push(Problem::new(
                path.display().to_string(),
                format!("missing {} file", what),
            ));
        }
    }

    debug!(problems = problems.len(), "validated markup");
    ValidationResult::from_problems(problems)
}

/// Validate a markup file on disk.
///
/// A missing markup file is reported as a problem rather than an error.
/// When `base_dir` is `None`, sources resolve against the file's directory.
///
/// # Errors
///
/// * [`PomlError::Io`] - the file exists but could not be read
pub fn validate_file(path: &Path, base_dir: Option<&Path>) -> Result<ValidationResult> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(ValidationResult::from_problems(vec![Problem::new(
                path.display().to_string(),
                "missing markup file",
            )]));
        }
        Err(e) => {
            return Err(PomlError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let base_dir = match base_dir {
        Some(dir) => dir,
        None => path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new(".")),
    };

    let mut result = validate(&text, base_dir);
    for problem in &mut result.problems {
        if problem.file == MARKUP_LABEL {
            problem.file = path.display().to_string();
        }
    }
    Ok(result)
}
