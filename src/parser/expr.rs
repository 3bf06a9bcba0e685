//! Recognition of `{{ … }}` template expressions in text runs.
//!
//! Expressions are only recognized and classified here; the expander
//! evaluates them.

use crate::document::{ExprKind, Expression, LineIndex, TextNode, VarPath};
use crate::error::{PomlError, Result};
use regex::Regex;
use std::sync::LazyLock;

const PATH: &str = r"[A-Za-z_@][A-Za-z0-9_\-]*(?:\.[A-Za-z_@][A-Za-z0-9_\-]*)*";
const IDENT: &str = r"[A-Za-z_][A-Za-z0-9_\-]*";

static EACH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^#each\s+({IDENT})(?:\s+as\s+({IDENT}))?$"))
        .expect("each pattern is valid")
});
static IF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^#if\s+({PATH})$")).expect("if pattern is valid"));
static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{PATH}$")).expect("variable pattern is valid"));

/// Default loop alias when `#each` has no `as` clause.
pub const DEFAULT_ALIAS: &str = "this";

/// Scan a raw text run starting at `offset` in the source.
pub(crate) fn scan_text(raw: &str, offset: usize, index: &LineIndex<'_>) -> Result<TextNode> {
    let mut expressions = Vec::new();
    let mut search = 0;

    while let Some(rel) = raw[search..].find("{{") {
        let start = search + rel;

        if start > 0 && raw.as_bytes()[start - 1] == b'\\' {
            expressions.push(Expression {
                kind: ExprKind::Escape,
                span: start - 1..start + 2,
                position: index.position(offset + start - 1),
            });
            search = start + 2;
            continue;
        }

        let Some(close_rel) = raw[start + 2..].find("}}") else {
            return Err(PomlError::UnterminatedExpression {
                detail: "'{{' is never closed by '}}'".to_string(),
                position: index.position(offset + start),
            });
        };
        let end = start + 2 + close_rel + 2;
        let inner = raw[start + 2..end - 2].trim();

        let kind = classify(inner).ok_or_else(|| PomlError::MalformedMarkup {
            reason: format!("invalid template expression '{{{{{}}}}}'", inner),
            position: index.position(offset + start),
        })?;

        expressions.push(Expression {
            kind,
            span: start..end,
            position: index.position(offset + start),
        });
        search = end;
    }

    Ok(TextNode {
        raw: raw.to_string(),
        expressions,
        position: index.position(offset),
    })
}

/// Classify the trimmed inside of a `{{ … }}` pair.
pub(crate) fn classify(inner: &str) -> Option<ExprKind> {
    match inner {
        "else" => return Some(ExprKind::Else),
        "/each" => return Some(ExprKind::EachEnd),
        "/if" => return Some(ExprKind::IfEnd),
        _ => {}
    }

    if let Some(caps) = EACH_RE.captures(inner) {
        return Some(ExprKind::EachStart {
            target: caps[1].to_string(),
            alias: caps
                .get(2)
                .map_or(DEFAULT_ALIAS, |m| m.as_str())
                .to_string(),
        });
    }
    if let Some(caps) = IF_RE.captures(inner) {
        return Some(ExprKind::IfStart {
            path: VarPath::parse(&caps[1])?,
        });
    }
    if VAR_RE.is_match(inner) {
        return Some(ExprKind::Variable {
            path: VarPath::parse(inner)?,
        });
    }
    None
}
