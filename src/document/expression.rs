//! Template expressions recognized inside section text.
//!
//! # Syntax
//!
//! - `{{name}}`, `{{name.field}}`, `{{this.field}}` - substitute a value
//! - `{{#each name}}…{{/each}}` - repeat once per record, alias `this`
//! - `{{#each name as row}}…{{/each}}` - repeat with an explicit alias
//! - `{{#if path}}…{{else}}…{{/if}}` - include on a truthy value
//! - `{{@index}}` - zero-based row of the innermost loop
//! - `\{{` - renders as a literal `{{`

use super::Position;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Dot-separated reference such as `hist`, `this.issue` or `@index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarPath {
    segments: Vec<String>,
}

impl VarPath {
    /// Build a path from its dotted form. Returns `None` for empty segments.
    pub fn parse(dotted: &str) -> Option<Self> {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// The first segment: a loop alias, a binding name, or `@index`.
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Segments after the head.
    pub fn rest(&self) -> &[String] {
        &self.segments[1..]
    }
}

impl fmt::Display for VarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// What a single `{{ … }}` span means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExprKind {
    Variable { path: VarPath },
    EachStart { target: String, alias: String },
    EachEnd,
    IfStart { path: VarPath },
    Else,
    IfEnd,
    /// `\{{`, rendered as a literal `{{`.
    Escape,
}

impl ExprKind {
    /// Short form used in error messages.
    pub fn describe(&self) -> String {
        match self {
            ExprKind::Variable { path } => format!("{{{{{path}}}}}"),
            ExprKind::EachStart { target, .. } => format!("{{{{#each {target}}}}}"),
            ExprKind::EachEnd => "{{/each}}".to_string(),
            ExprKind::IfStart { path } => format!("{{{{#if {path}}}}}"),
            ExprKind::Else => "{{else}}".to_string(),
            ExprKind::IfEnd => "{{/if}}".to_string(),
            ExprKind::Escape => "\\{{".to_string(),
        }
    }
}

/// A recognized expression span inside a text node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expression {
    pub kind: ExprKind,
    /// Byte range within the owning text node's `raw`, delimiters included.
    pub span: Range<usize>,
    /// Where the expression starts in the markup source.
    pub position: Position,
}
