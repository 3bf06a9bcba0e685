//! Renderer.
//!
//! Turns an expanded document into the prompt handed to a model call. Both
//! output modes share one pass that builds top-level blocks; the mode only
//! decides how the blocks are folded into the result.


use crate::config::OutputMode;
use crate::document::{Document, Node, Section, SectionKind};
use serde::Serialize;

/// Separator between top-level blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Role label of a message block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    #[default]
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Parse a `speaker` attribute value (ASCII case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One role-labeled block of a rendered prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// `src` of every image that falls inside this message.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Final output of a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RenderedPrompt {
    Text(String),
    Messages(Vec<Message>),
}

impl RenderedPrompt {
    /// The flat string, when rendered in string mode.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Messages(_) => None,
        }
    }

    /// The message list, when rendered in messages mode.
    pub fn messages(&self) -> Option<&[Message]> {
        match self {
            Self::Text(_) => None,
            Self::Messages(messages) => Some(messages),
        }
    }
}

/// A rendered top-level section.
struct Block {
    /// Set for Role sections only.
    role: Option<MessageRole>,
    text: String,
    images: Vec<String>,
}

/// Render an expanded document.
///
/// Text runs are emitted verbatim, so a document that still contains
/// template expressions renders them as written.
pub fn render(doc: &Document, mode: OutputMode) -> RenderedPrompt {
    let blocks = blocks(doc);
    match mode {
        OutputMode::Text => RenderedPrompt::Text(
            blocks
                .iter()
                .map(|block| block.text.as_str())
                .collect::<Vec<_>>()
                .join(BLOCK_SEPARATOR),
        ),
        OutputMode::Messages => RenderedPrompt::Messages(messages(blocks)),
    }
}

fn blocks(doc: &Document) -> Vec<Block> {
    let mut blocks = Vec::new();
    for section in &doc.sections {
        let mut text = String::new();
        let mut images = Vec::new();
        write_section(section, &mut text, &mut images);

        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let role = match section.kind {
            SectionKind::Role => Some(
                section
                    .attr("speaker")
                    .and_then(MessageRole::parse)
                    .unwrap_or_default(),
            ),
            _ => None,
        };
        blocks.push(Block {
            role,
            text: text.to_string(),
            images,
        });
    }
    blocks
}

/// Append a section's text with nested sections inline.
fn write_section(section: &Section, out: &mut String, images: &mut Vec<String>) {
    match section.kind {
        SectionKind::DataSource => {}
        SectionKind::Image => {
            let src = section.attr("src").unwrap_or_default();
            let alt = section.attr("alt").unwrap_or(src);
            out.push_str(&format!("[image: {}]", alt));
            if !src.is_empty() {
                images.push(src.to_string());
            }
        }
        SectionKind::Role
        | SectionKind::Task
        | SectionKind::Constraint
        | SectionKind::Example
        | SectionKind::OutputFormat
        | SectionKind::Generic => {
            for node in &section.content {
                match node {
                    Node::Text(text) => out.push_str(&text.raw),
                    Node::Section(child) => write_section(child, out, images),
                }
            }
        }
    }
}

/// Fold blocks into messages: one per Role block, and one `user` message
/// for each run of consecutive non-role blocks.
fn messages(blocks: Vec<Block>) -> Vec<Message> {
    let mut messages: Vec<Message> = Vec::new();
    let mut folding = false;

    for block in blocks {
        match block.role {
            Some(role) => {
                messages.push(Message {
                    role,
                    content: block.text,
                    images: block.images,
                });
                folding = false;
            }
            None => match messages.last_mut() {
                Some(last) if folding => {
                    last.content.push_str(BLOCK_SEPARATOR);
                    last.content.push_str(&block.text);
                    last.images.extend(block.images);
                }
                _ => {
                    messages.push(Message {
                        role: MessageRole::User,
                        content: block.text,
                        images: block.images,
                    });
                    folding = true;
                }
            },
        }
    }
    messages
}
