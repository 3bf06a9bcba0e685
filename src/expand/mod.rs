//! Template expander.
//!
//! Evaluates the expressions recognized by the parser against bound data and
//! returns a new document whose text runs are plain literals. The input
//! document is left untouched.
//!
//! A section's own text runs and nested sections are folded into one
//! fragment tree first, so `{{#each}}` and `{{#if}}` blocks may enclose
//! nested sections; enclosed sections are duplicated per record and
//! expanded in that record's scope.

mod scope;

#[cfg(test)]
mod tests;

use crate::binder::{Bindings, BoundValue};
use crate::document::{Document, ExprKind, Expression, Node, Section, TextNode, VarPath};
use crate::error::{PomlError, Result};
use scope::{Resolved, Scope};
use tracing::debug;

/// Expand every template expression in `doc` using `bindings`.
///
/// # Errors
///
/// * [`PomlError::UnresolvedBinding`] - a reference or `#each` names
///   something that is neither a loop alias nor a binding
/// * [`PomlError::InvalidIterationTarget`] - `#each` over a value that is not
///   a sequence of records
/// * [`PomlError::MalformedMarkup`] - unbalanced blocks in a tree that did
///   not come from the parser
pub fn expand(doc: &Document, bindings: &Bindings) -> Result<Document> {
    let expander = Expander { bindings };
    let mut scope = Scope::new();

    let sections = doc
        .sections
        .iter()
        .map(|section| expander.section(section, &mut scope))
        .collect::<Result<Vec<_>>>()?;

    debug!(sections = sections.len(), "expanded document");
    Ok(Document {
        attributes: doc.attributes.clone(),
        sections,
    })
}

/// A section's content folded into a block tree.
enum Fragment<'a> {
    Literal(&'a str),
    Variable(&'a Expression, &'a VarPath),
    Child(&'a Section),
    Each {
        expression: &'a Expression,
        target: &'a str,
        alias: &'a str,
        body: Vec<Fragment<'a>>,
    },
    If {
        path: &'a VarPath,
        then: Vec<Fragment<'a>>,
        otherwise: Vec<Fragment<'a>>,
    },
}

/// Flat item stream over a section's content.
enum Item<'a> {
    Literal(&'a str),
    Expr(&'a Expression),
    Child(&'a Section),
}

struct Expander<'b> {
    bindings: &'b Bindings,
}

impl<'b> Expander<'b> {
    fn section<'a>(&self, section: &'a Section, scope: &mut Scope<'a>) -> Result<Section>
    where
        'b: 'a,
    {
        let fragments = fold(items(section))?;
        let mut out = Output::new(section);
        self.fragments(&fragments, scope, &mut out)?;

        Ok(Section {
            kind: section.kind,
            tag: section.tag.clone(),
            attributes: section.attributes.clone(),
            content: out.finish(),
            position: section.position,
        })
    }

    fn fragments<'a>(
        &self,
        fragments: &[Fragment<'a>],
        scope: &mut Scope<'a>,
        out: &mut Output,
    ) -> Result<()>
    where
        'b: 'a,
    {
        for fragment in fragments {
            match fragment {
                Fragment::Literal(text) => out.text(text),
                Fragment::Variable(expression, path) => {
                    match scope.resolve(path, self.bindings) {
                        Resolved::Value(value) => out.text(&value.to_text()),
                        Resolved::Record(record) => out.text(&crate::binder::record_json(record)),
                        Resolved::Field(field) => out.text(field),
                        Resolved::Index(index) => out.text(&index.to_string()),
                        Resolved::Missing => {}
                        Resolved::Unbound => {
                            return Err(PomlError::UnresolvedBinding {
                                name: path.to_string(),
                                position: expression.position,
                            });
                        }
                    }
                }
                Fragment::Child(child) => {
                    let expanded = self.section(*child, scope)?;
                    out.section(expanded);
                }
                Fragment::Each {
                    expression,
                    target,
                    alias,
                    body,
                } => {
                    let rows = match scope.lookup_iterable(target, self.bindings) {
                        Resolved::Value(BoundValue::Records(rows)) => rows,
                        Resolved::Unbound => {
                            return Err(PomlError::UnresolvedBinding {
                                name: target.to_string(),
                                position: expression.position,
                            });
                        }
                        other => {
                            return Err(PomlError::InvalidIterationTarget {
                                name: target.to_string(),
                                found: other.describe(),
                                position: expression.position,
                            });
                        }
                    };

                    for (index, record) in rows.iter().enumerate() {
                        scope.push(*alias, record, index);
                        let result = self.fragments(body, scope, out);
                        scope.pop();
                        result?;
                    }
                }
                Fragment::If {
                    path,
                    then,
                    otherwise,
                } => {
                    let branch = if scope.resolve(path, self.bindings).is_truthy() {
                        then
                    } else {
                        otherwise
                    };
                    self.fragments(branch, scope, out)?;
                }
            }
        }
        Ok(())
    }
}

/// Flatten a section's content into literals, expressions and children.
fn items(section: &Section) -> Vec<Item<'_>> {
    let mut items = Vec::new();
    for node in &section.content {
        match node {
            Node::Section(child) => items.push(Item::Child(child)),
            Node::Text(text) => {
                let mut cursor = 0;
                for expression in &text.expressions {
                    if expression.span.start > cursor {
                        items.push(Item::Literal(&text.raw[cursor..expression.span.start]));
                    }
                    items.push(Item::Expr(expression));
                    cursor = expression.span.end;
                }
                if cursor < text.raw.len() {
                    items.push(Item::Literal(&text.raw[cursor..]));
                }
            }
        }
    }
    items
}

/// Fold the flat item stream into nested blocks.
fn fold(items: Vec<Item<'_>>) -> Result<Vec<Fragment<'_>>> {
    enum Frame<'a> {
        Each {
            expression: &'a Expression,
            target: &'a str,
            alias: &'a str,
            outer: Vec<Fragment<'a>>,
        },
        If {
            expression: &'a Expression,
            path: &'a VarPath,
            then: Option<Vec<Fragment<'a>>>,
            outer: Vec<Fragment<'a>>,
        },
    }

    let unbalanced = |expression: &Expression| PomlError::MalformedMarkup {
        reason: format!("unbalanced block at {}", expression.kind.describe()),
        position: expression.position,
    };

    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut current: Vec<Fragment<'_>> = Vec::new();

    for item in items {
        let expression = match item {
            Item::Literal(text) => {
                current.push(Fragment::Literal(text));
                continue;
            }
            Item::Child(child) => {
                current.push(Fragment::Child(child));
                continue;
            }
            Item::Expr(expression) => expression,
        };

        match &expression.kind {
            ExprKind::Variable { path } => current.push(Fragment::Variable(expression, path)),
            ExprKind::Escape => current.push(Fragment::Literal("{{")),
            ExprKind::EachStart { target, alias } => stack.push(Frame::Each {
                expression,
                target,
                alias,
                outer: std::mem::take(&mut current),
            }),
            ExprKind::IfStart { path } => stack.push(Frame::If {
                expression,
                path,
                then: None,
                outer: std::mem::take(&mut current),
            }),
            ExprKind::Else => match stack.last_mut() {
                Some(Frame::If { then, .. }) if then.is_none() => {
                    *then = Some(std::mem::take(&mut current));
                }
                _ => return Err(unbalanced(expression)),
            },
            ExprKind::EachEnd => match stack.pop() {
                Some(Frame::Each {
                    expression,
                    target,
                    alias,
                    outer,
                }) => {
                    let body = std::mem::replace(&mut current, outer);
                    current.push(Fragment::Each {
                        expression,
                        target,
                        alias,
                        body,
                    });
                }
                _ => return Err(unbalanced(expression)),
            },
            ExprKind::IfEnd => match stack.pop() {
                Some(Frame::If {
                    path, then, outer, ..
                }) => {
                    let tail = std::mem::replace(&mut current, outer);
                    let (then, otherwise) = match then {
                        Some(then) => (then, tail),
                        None => (tail, Vec::new()),
                    };
                    current.push(Fragment::If {
                        path,
                        then,
                        otherwise,
                    });
                }
                _ => return Err(unbalanced(expression)),
            },
        }
    }

    match stack.pop() {
        Some(Frame::Each { expression, .. } | Frame::If { expression, .. }) => {
            Err(unbalanced(expression))
        }
        None => Ok(current),
    }
}

/// Accumulates expanded content, merging adjacent text.
struct Output {
    nodes: Vec<Node>,
    buffer: String,
    position: crate::document::Position,
}

impl Output {
    fn new(section: &Section) -> Self {
        Self {
            nodes: Vec::new(),
            buffer: String::new(),
            position: section.position,
        }
    }

    fn text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn section(&mut self, section: Section) {
        self.flush();
        self.nodes.push(Node::Section(section));
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            self.nodes.push(Node::Text(TextNode::literal(raw, self.position)));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush();
        self.nodes
    }
}
