//! Tag/text tokenizer.
//!
//! A single left-to-right scan. `<` opens a tag only when followed by a
//! letter (open tag), `/` (close tag), `!--` (comment) or `?` (processing
//! instruction); anywhere else it is literal text. Comments and processing
//! instructions are dropped.

use crate::document::{Attributes, LineIndex};
use crate::error::{PomlError, Result};

/// A lexical token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    Open {
        name: &'a str,
        attributes: Attributes,
        self_closing: bool,
        offset: usize,
    },
    Close {
        name: &'a str,
        offset: usize,
    },
    Text {
        raw: &'a str,
        offset: usize,
    },
}

pub(crate) fn tokenize<'a>(source: &'a str, index: &LineIndex<'_>) -> Result<Vec<Token<'a>>> {
    let mut lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        index,
    };
    lexer.run()
}

struct Lexer<'a, 'i> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    index: &'i LineIndex<'i>,
}

impl<'a> Lexer<'a, '_> {
    fn run(&mut self) -> Result<Vec<Token<'a>>> {
        let mut tokens = Vec::new();
        let mut text_start = 0;

        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] != b'<' {
                self.pos += 1;
                continue;
            }

            let tag_start = self.pos;
            let next = self.bytes.get(self.pos + 1).copied();
            let token = if self.source[self.pos..].starts_with("<!--") {
                self.skip_until("-->", "comment")?;
                None
            } else if next == Some(b'?') {
                self.skip_until("?>", "processing instruction")?;
                None
            } else if next.is_some_and(|b| b.is_ascii_alphabetic()) {
                Some(self.open_tag()?)
            } else if next == Some(b'/') {
                Some(self.close_tag()?)
            } else {
                // Literal '<' in text.
                self.pos += 1;
                continue;
            };

            if tag_start > text_start {
                tokens.push(Token::Text {
                    raw: &self.source[text_start..tag_start],
                    offset: text_start,
                });
            }
            if let Some(token) = token {
                tokens.push(token);
            }
            text_start = self.pos;
        }

        if self.bytes.len() > text_start {
            tokens.push(Token::Text {
                raw: &self.source[text_start..],
                offset: text_start,
            });
        }

        Ok(tokens)
    }

    fn skip_until(&mut self, terminator: &str, what: &str) -> Result<()> {
        let start = self.pos;
        match self.source[start..].find(terminator) {
            Some(rel) => {
                self.pos = start + rel + terminator.len();
                Ok(())
            }
            None => Err(self.malformed(start, format!("unterminated {}", what))),
        }
    }

    fn open_tag(&mut self) -> Result<Token<'a>> {
        let offset = self.pos;
        self.pos += 1;
        let name = self.name();
        let mut attributes = Attributes::new();

        loop {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => {
                    return Err(self.malformed(offset, format!("unterminated tag <{}>", name)));
                }
                Some(b'>') => {
                    self.pos += 1;
                    return Ok(Token::Open {
                        name,
                        attributes,
                        self_closing: false,
                        offset,
                    });
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'>') => {
                    self.pos += 2;
                    return Ok(Token::Open {
                        name,
                        attributes,
                        self_closing: true,
                        offset,
                    });
                }
                Some(b) if is_name_start(*b) => {
                    let (key, value) = self.attribute(name)?;
                    attributes.insert(key.to_string(), value.to_string());
                }
                Some(_) => {
                    let found = self.source[self.pos..].chars().next().unwrap_or('?');
                    return Err(self.malformed(
                        self.pos,
                        format!("unexpected character '{}' in tag <{}>", found, name),
                    ));
                }
            }
        }
    }

    fn attribute(&mut self, tag: &str) -> Result<(&'a str, &'a str)> {
        let key = self.name();
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'=') {
            // Valueless attribute.
            return Ok((key, ""));
        }
        self.pos += 1;
        self.skip_whitespace();

        let quote = match self.bytes.get(self.pos) {
            Some(q @ (b'"' | b'\'')) => *q as char,
            _ => {
                return Err(self.malformed(
                    self.pos,
                    format!("attribute '{}' on <{}> must be quoted", key, tag),
                ));
            }
        };
        let value_start = self.pos + 1;
        match self.source[value_start..].find(quote) {
            Some(rel) => {
                self.pos = value_start + rel + 1;
                Ok((key, &self.source[value_start..value_start + rel]))
            }
            None => Err(self.malformed(
                value_start - 1,
                format!("unterminated value for attribute '{}' on <{}>", key, tag),
            )),
        }
    }

    fn close_tag(&mut self) -> Result<Token<'a>> {
        let offset = self.pos;
        self.pos += 2;
        if !self.bytes.get(self.pos).is_some_and(|b| is_name_start(*b)) {
            return Err(self.malformed(offset, "close tag without a name".to_string()));
        }
        let name = self.name();
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'>') {
            return Err(self.malformed(offset, format!("unterminated close tag </{}>", name)));
        }
        self.pos += 1;
        Ok(Token::Close { name, offset })
    }

    fn name(&mut self) -> &'a str {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(|b| is_name_char(*b)) {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn malformed(&self, offset: usize, reason: String) -> PomlError {
        PomlError::MalformedMarkup {
            reason,
            position: self.index.position(offset),
        }
    }
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
}
