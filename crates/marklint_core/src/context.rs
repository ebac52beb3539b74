//! Per-pass document context shared by every rule.
//!
//! A [`LintContext`] is built once per token stream and handed to rules by
//! reference. Line metadata is derived lazily on first request.

use std::cell::OnceCell;

use marklint_ast::Token;
use marklint_parser::{ParserKind, TokenStream, physical_lines};

use crate::line_metadata::LineMetadata;

/// Splits `source` into the text of its physical lines.
///
/// `\r\n`, `\r` and `\n` all end a line. A final terminator opens one
/// more, empty line; an empty document has no lines.
pub fn split_lines(source: &str) -> Vec<&str> {
    physical_lines(source).map(|line| line.text).collect()
}

/// Read-only view of one parsed document.
pub struct LintContext<'a> {
    name: &'a str,
    line_texts: Vec<&'a str>,
    stream: TokenStream<'a>,
    metadata: OnceCell<LineMetadata<'a>>,
}

impl<'a> LintContext<'a> {
    /// Creates a context for `source` and the token stream parsed from it.
    pub fn new(name: &'a str, source: &'a str, stream: TokenStream<'a>) -> Self {
        Self {
            name,
            line_texts: split_lines(source),
            stream,
            metadata: OnceCell::new(),
        }
    }

    /// Returns the document name (usually its path).
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the parser that produced the token stream.
    pub fn parser(&self) -> ParserKind {
        self.stream.parser
    }

    /// Returns the top-level tokens.
    pub fn tokens(&self) -> &'a [Token<'a>] {
        self.stream.tokens
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.line_texts.len()
    }

    /// Returns the text of every line, without terminators.
    pub fn line_texts(&self) -> &[&'a str] {
        &self.line_texts
    }

    /// Returns the text of a specific line (1-indexed).
    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1)
            .and_then(|idx| self.line_texts.get(idx))
            .copied()
    }

    /// Returns the line metadata, computing it on first use.
    pub fn line_metadata(&self) -> &LineMetadata<'a> {
        self.metadata
            .get_or_init(|| LineMetadata::build(&self.line_texts, self.stream.tokens))
    }
}
