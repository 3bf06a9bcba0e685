//! POML parser.
//!
//! Converts markup text into a [`Document`]: the lexer produces a flat
//! tag/text token stream, then a stack-based builder turns it into the
//! section tree (an open tag pushes a frame, a close tag pops it and
//! attaches it to its parent).
//!
//! Whitespace-only text runs are discarded; all other text is kept verbatim
//! with its template expressions recognized but not evaluated.

mod expr;
mod lexer;


pub use expr::DEFAULT_ALIAS;

use crate::document::{
    Attributes, Document, ExprKind, LineIndex, Node, Position, Section, SectionKind,
};
use crate::error::{PomlError, Result};
use lexer::Token;
use tracing::debug;

/// The root element name.
pub const ROOT_TAG: &str = "poml";

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject unrecognized tags instead of downgrading them to Generic.
    pub strict_unknown_tags: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_unknown_tags: true,
        }
    }
}

/// Parse POML markup into a document tree.
///
/// # Errors
///
/// * [`PomlError::MalformedMarkup`] - root absent or mismatched, unbalanced
///   tags, bad attributes, invalid expressions
/// * [`PomlError::UnknownSectionTag`] - unrecognized tag in strict mode
/// * [`PomlError::UnterminatedExpression`] - `{{` without `}}`, or a block
///   left open at the end of its section
///
/// # Example
///
/// ```
/// use poml::parser::{ParseOptions, parse};
/// use poml::document::SectionKind;
///
/// let doc = parse("<poml><role>Support agent</role></poml>", &ParseOptions::default()).unwrap();
/// assert_eq!(doc.sections[0].kind, SectionKind::Role);
/// assert_eq!(doc.sections[0].text(), "Support agent");
/// ```
pub fn parse(source: &str, options: &ParseOptions) -> Result<Document> {
    let index = LineIndex::new(source);
    let tokens = lexer::tokenize(source, &index)?;
    let mut builder = TreeBuilder {
        index: &index,
        options,
        root: RootState::Before,
        document: Document::default(),
        stack: Vec::new(),
    };

    for token in tokens {
        builder.push(token)?;
    }
    let document = builder.finish(source.len())?;

    debug!(
        sections = document.sections.len(),
        data_sources = document.data_sources().len(),
        "parsed document"
    );
    Ok(document)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootState {
    Before,
    Inside { offset: usize },
    After,
}

struct TreeBuilder<'i, 'o> {
    index: &'i LineIndex<'i>,
    options: &'o ParseOptions,
    root: RootState,
    document: Document,
    stack: Vec<Section>,
}

impl TreeBuilder<'_, '_> {
    fn push(&mut self, token: Token<'_>) -> Result<()> {
        match token {
            Token::Text { raw, offset } => self.text(raw, offset),
            Token::Open {
                name,
                attributes,
                self_closing,
                offset,
            } => self.open(name, attributes, self_closing, offset),
            Token::Close { name, offset } => self.close(name, offset),
        }
    }

    /// Runs split only by a comment or processing instruction join the
    /// preceding text node, so the tree matches its own serialization.
    fn text(&mut self, raw: &str, offset: usize) -> Result<()> {
        let continues_text = matches!(
            self.stack.last().and_then(|frame| frame.content.last()),
            Some(Node::Text(_))
        );
        if raw.trim().is_empty() && !continues_text {
            return Ok(());
        }
        let Some(frame) = self.stack.last_mut() else {
            let reason = match self.root {
                RootState::Inside { .. } => "text must be inside a section",
                _ => "text outside the <poml> root",
            };
            return Err(self.malformed(offset, reason.to_string()));
        };

        let node = expr::scan_text(raw, offset, self.index)?;
        match frame.content.last_mut() {
            Some(Node::Text(previous)) => previous.append(node),
            _ => frame.content.push(Node::Text(node)),
        }
        Ok(())
    }

    fn open(
        &mut self,
        name: &str,
        attributes: Attributes,
        self_closing: bool,
        offset: usize,
    ) -> Result<()> {
        if name == ROOT_TAG {
            if self.root != RootState::Before {
                return Err(self.malformed(offset, "more than one <poml> root".to_string()));
            }
            self.document.attributes = attributes;
            self.root = if self_closing {
                RootState::After
            } else {
                RootState::Inside { offset }
            };
            return Ok(());
        }

        if !matches!(self.root, RootState::Inside { .. }) {
            return Err(self.malformed(offset, format!("<{}> outside the <poml> root", name)));
        }

        let position = self.index.position(offset);
        let kind = match SectionKind::from_tag(name) {
            Some(kind) => kind,
            None if self.options.strict_unknown_tags => {
                return Err(PomlError::UnknownSectionTag {
                    tag: name.to_string(),
                    position,
                });
            }
            None => SectionKind::Generic,
        };
        self.check_required_attributes(kind, name, &attributes, offset)?;

        let section = Section {
            kind,
            tag: name.to_string(),
            attributes,
            content: Vec::new(),
            position,
        };

        if self_closing {
            self.attach(section);
        } else {
            self.stack.push(section);
        }
        Ok(())
    }

    fn close(&mut self, name: &str, offset: usize) -> Result<()> {
        if name == ROOT_TAG {
            if let Some(open) = self.stack.last() {
                return Err(self.malformed(
                    offset,
                    format!("expected </{}>, found </{}>", open.tag, ROOT_TAG),
                ));
            }
            if !matches!(self.root, RootState::Inside { .. }) {
                return Err(self.malformed(offset, "</poml> without an open root".to_string()));
            }
            self.root = RootState::After;
            return Ok(());
        }

        let Some(section) = self.stack.pop() else {
            return Err(self.malformed(offset, format!("unexpected </{}>", name)));
        };
        if section.tag != name {
            return Err(self.malformed(
                offset,
                format!("expected </{}>, found </{}>", section.tag, name),
            ));
        }

        check_blocks(&section)?;
        self.attach(section);
        Ok(())
    }

    fn attach(&mut self, section: Section) {
        match self.stack.last_mut() {
            Some(parent) => parent.content.push(Node::Section(section)),
            None => self.document.sections.push(section),
        }
    }

    fn finish(self, end: usize) -> Result<Document> {
        if let Some(open) = self.stack.last() {
            return Err(PomlError::MalformedMarkup {
                reason: format!("<{}> is never closed", open.tag),
                position: open.position,
            });
        }
        match self.root {
            RootState::Before => Err(self.malformed(end, "missing <poml> root".to_string())),
            RootState::Inside { offset } => {
                Err(self.malformed(offset, "<poml> is never closed".to_string()))
            }
            RootState::After => Ok(self.document),
        }
    }

    fn check_required_attributes(
        &self,
        kind: SectionKind,
        tag: &str,
        attributes: &Attributes,
        offset: usize,
    ) -> Result<()> {
        let required: &[&str] = match kind {
            SectionKind::DataSource => &["src", "format"],
            SectionKind::Image => &["src"],
            _ => &[],
        };
        for key in required {
            if !attributes.contains_key(*key) {
                return Err(self.malformed(
                    offset,
                    format!("<{}> requires a '{}' attribute", tag, key),
                ));
            }
        }

        if kind == SectionKind::Role
            && let Some(speaker) = attributes.get("speaker")
            && crate::render::MessageRole::parse(speaker).is_none()
        {
            return Err(self.malformed(
                offset,
                format!(
                    "unknown speaker '{}' (expected system, user or assistant)",
                    speaker
                ),
            ));
        }
        Ok(())
    }

    fn malformed(&self, offset: usize, reason: String) -> PomlError {
        PomlError::MalformedMarkup {
            reason,
            position: self.index.position(offset),
        }
    }
}

/// Check that `#each`/`#if` blocks in a section's own text are balanced.
///
/// Blocks may enclose nested sections but cannot cross the section's own
/// open or close tag.
fn check_blocks(section: &Section) -> Result<()> {
    struct Open<'a> {
        kind: &'a ExprKind,
        position: Position,
        seen_else: bool,
    }

    let mut open: Vec<Open<'_>> = Vec::new();
    let expressions = section.content.iter().filter_map(|node| match node {
        Node::Text(text) => Some(text.expressions.iter()),
        Node::Section(_) => None,
    });

    for expression in expressions.flatten() {
        let stray = |what: &str| PomlError::MalformedMarkup {
            reason: format!("{} without a matching opening block", what),
            position: expression.position,
        };
        match &expression.kind {
            ExprKind::EachStart { .. } | ExprKind::IfStart { .. } => open.push(Open {
                kind: &expression.kind,
                position: expression.position,
                seen_else: false,
            }),
            ExprKind::EachEnd => match open.pop() {
                Some(Open {
                    kind: ExprKind::EachStart { .. },
                    ..
                }) => {}
                _ => return Err(stray("{{/each}}")),
            },
            ExprKind::IfEnd => match open.pop() {
                Some(Open {
                    kind: ExprKind::IfStart { .. },
                    ..
                }) => {}
                _ => return Err(stray("{{/if}}")),
            },
            ExprKind::Else => match open.last_mut() {
                Some(block) if matches!(block.kind, ExprKind::IfStart { .. }) && !block.seen_else => {
                    block.seen_else = true;
                }
                _ => return Err(stray("{{else}}")),
            },
            ExprKind::Variable { .. } | ExprKind::Escape => {}
        }
    }

    match open.pop() {
        Some(block) => Err(PomlError::UnterminatedExpression {
            detail: format!("{} is never closed in <{}>", block.kind.describe(), section.tag),
            position: block.position,
        }),
        None => Ok(()),
    }
}
