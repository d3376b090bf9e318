//! Mail-markup compiler.
//!
//! Turns a responsive mail-markup document (`<mjml>` dialect) into a single
//! email-client compatible HTML string. Compilation is a pure function of the
//! source and [`CompileOptions`]: the same input always produces the same
//! output, and `{{...}}` placeholders inside content pass through untouched so
//! the injector can fill them afterwards.
//!
//! The pipeline is:
//!
//! - `parser`: quick-xml based reader that validates tags, nesting and
//!   attributes and records source offsets for error reporting
//! - `attributes`: resolution of inline attributes, `mj-class`,
//!   `mj-attributes` defaults and built-in defaults
//! - `render`: table-based HTML generation with Outlook conditionals and
//!   responsive column classes

mod attributes;
mod components;
mod css;
mod parser;
mod render;
mod writer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use components::DEFAULT_FONT_FAMILY;

/// Options accepted by [`MarkupCompiler::compile`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Strip indentation and collapse whitespace in the output.
    /// `<pre>` blocks inside verbatim content keep their whitespace.
    pub minify: bool,
}

impl CompileOptions {
    pub fn minified() -> Self {
        Self { minify: true }
    }
}

/// A markup error with its 1-based source position
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("line {line}, column {column}: {message}")]
pub struct CompileError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl CompileError {
    /// Build an error positioned at byte `offset` of `source`
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };

        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Stateless compiler from mail markup to HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupCompiler;

impl MarkupCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile a markup document to HTML.
    ///
    /// Fails with a [`CompileError`] on malformed markup, unknown or misplaced
    /// tags, unknown attributes and missing required attributes.
    pub fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError> {
        let root = parser::parse(source)?;
        Ok(render::render(&root, options))
    }
}
