//! POML: structured prompt markup.
//!
//! A render pass turns markup text into a model-ready prompt:
//!
//! raw text → [`parser`] → [`document::Document`] → [`binder`] →
//! [`binder::Bindings`] → [`expand`] → expanded document → [`render`] →
//! [`render::RenderedPrompt`]
//!
//! [`validate`] is a cheap structural pre-check in front of the parser, and
//! [`pipeline::Pipeline`] runs one whole pass with cancellation checks at
//! each stage boundary. Only the binder touches the filesystem.

pub mod binder;
pub mod cancel;
pub mod config;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod expand;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use error::{PomlError, Result};
pub use pipeline::Pipeline;
pub use render::{Message, MessageRole, RenderedPrompt};
