//! Document tree produced by the parser.
//!
//! A [`Document`] owns its top-level [`Section`]s, and each section owns its
//! content exclusively: an ordered mix of text runs and nested sections.
//! Section kinds form a closed set, so rendering and expansion match on
//! [`SectionKind`] exhaustively.

mod expression;
mod markup;
mod position;

pub use expression::{ExprKind, Expression, VarPath};
pub use position::{LineIndex, Position};

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Attribute map of a tag. Duplicate keys: last occurrence wins.
pub type Attributes = BTreeMap<String, String>;

/// The recognized section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Role,
    Task,
    DataSource,
    Constraint,
    Example,
    OutputFormat,
    Image,
    /// Any tag outside the recognized set, kept in lenient mode.
    Generic,
}

impl SectionKind {
    /// Look up the kind for a tag name (ASCII case-insensitive).
    ///
    /// Returns `None` for tags outside the recognized set; the root tag
    /// `poml` is not a section.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "role" => Some(Self::Role),
            "task" => Some(Self::Task),
            "data" => Some(Self::DataSource),
            "constraint" | "constraints" => Some(Self::Constraint),
            "example" | "examples" => Some(Self::Example),
            "output-format" | "output_format" => Some(Self::OutputFormat),
            "img" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Root of a parsed prompt.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    /// Attributes on the `<poml>` root tag.
    pub attributes: Attributes,
    /// Top-level sections in source order.
    pub sections: Vec<Section>,
}

/// One tagged structural unit of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    /// The tag name as written in the source.
    pub tag: String,
    pub attributes: Attributes,
    pub content: Vec<Node>,
    /// Where the opening tag starts.
    pub position: Position,
}

/// A content item inside a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Text(TextNode),
    Section(Section),
}

/// A verbatim text run and the template expressions found in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub raw: String,
    /// Expressions in source order, spans relative to `raw`.
    pub expressions: Vec<Expression>,
    pub position: Position,
}

impl TextNode {
    /// A text run with no template expressions.
    pub fn literal(raw: impl Into<String>, position: Position) -> Self {
        Self {
            raw: raw.into(),
            expressions: Vec::new(),
            position,
        }
    }

    /// Join a following run onto this one, keeping `position`.
    ///
    /// The appended expressions are shifted so their spans stay relative
    /// to the joined `raw`.
    pub fn append(&mut self, next: TextNode) {
        let shift = self.raw.len();
        self.raw.push_str(&next.raw);
        self.expressions
            .extend(next.expressions.into_iter().map(|mut expression| {
                expression.span = expression.span.start + shift..expression.span.end + shift;
                expression
            }));
    }
}

/// Data source declaration viewed from a `<data>` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceRef {
    /// Path relative to the base directory.
    pub src: String,
    /// Declared format, checked by the binder.
    pub format: String,
    /// Binding name; defaults to the file stem of `src`.
    pub name: String,
    pub position: Position,
}

impl Section {
    /// Attribute value by key.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Concatenation of this section's own text runs (children excluded).
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.raw.as_str()),
                Node::Section(_) => None,
            })
            .collect()
    }

    /// Nested sections in order.
    pub fn children(&self) -> impl Iterator<Item = &Section> {
        self.content.iter().filter_map(|node| match node {
            Node::Section(section) => Some(section),
            Node::Text(_) => None,
        })
    }

    /// The data source this section declares, if it is a `<data>` section
    /// with a `src` attribute.
    pub fn data_source(&self) -> Option<DataSourceRef> {
        if self.kind != SectionKind::DataSource {
            return None;
        }
        let src = self.attr("src")?;
        let name = match self.attr("name") {
            Some(name) => name.to_string(),
            None => Path::new(src)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| src.to_string()),
        };

        Some(DataSourceRef {
            src: src.to_string(),
            format: self.attr("format").unwrap_or_default().to_string(),
            name,
            position: self.position,
        })
    }
}

impl Document {
    /// All data source declarations in document order, nested ones included.
    pub fn data_sources(&self) -> Vec<DataSourceRef> {
        fn collect(section: &Section, out: &mut Vec<DataSourceRef>) {
            if let Some(source) = section.data_source() {
                out.push(source);
            }
            for child in section.children() {
                collect(child, out);
            }
        }

        let mut out = Vec::new();
        for section in &self.sections {
            collect(section, &mut out);
        }
        out
    }

    /// Whether any text run in the tree contains a template expression.
    pub fn has_expressions(&self) -> bool {
        fn section_has(section: &Section) -> bool {
            section.content.iter().any(|node| match node {
                Node::Text(text) => !text.expressions.is_empty(),
                Node::Section(child) => section_has(child),
            })
        }
        self.sections.iter().any(section_has)
    }
}
