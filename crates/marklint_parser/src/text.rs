//! Plain text parser.
//!
//! This parser treats plain text as a sequence of paragraphs separated by
//! blank lines.

use marklint_ast::{Span, Token, TokenArena, TokenType};

use crate::error::check_source;
use crate::lines::physical_lines;
use crate::{ParseError, Parser, ParserKind, TokenStream};

/// Plain text parser implementation.
///
/// Each paragraph becomes a `paragraph` token holding a single `text`
/// token with the paragraph's content.
pub struct PlainTextParser;

impl PlainTextParser {
    /// Creates a new plain text parser.
    pub fn new() -> Self {
        Self
    }

    fn paragraph<'a>(
        arena: &'a TokenArena,
        source: &str,
        start: usize,
        end: usize,
        first_line: u32,
        last_line: u32,
    ) -> Token<'a> {
        let span = Span::new(start as u32, end as u32);
        let content = arena.alloc_str(&source[start..end]);
        let text = Token::leaf(TokenType::Text, first_line, last_line, span, content);
        Token::container(
            TokenType::Paragraph,
            first_line,
            last_line,
            span,
            content,
            arena.alloc_slice_copy(&[text]),
        )
    }
}

impl Default for PlainTextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PlainTextParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Text
    }

    fn extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn parse<'a>(
        &self,
        arena: &'a TokenArena,
        source: &str,
    ) -> Result<TokenStream<'a>, ParseError> {
        check_source(source)?;

        let mut paragraphs: Vec<Token<'a>> = Vec::new();
        // (start offset, first line) of the paragraph being collected
        let mut current: Option<(usize, u32)> = None;
        let mut last_end = 0usize;
        let mut last_line = 0u32;

        for (idx, line) in physical_lines(source).enumerate() {
            let line_number = idx as u32 + 1;

            if line.text.trim().is_empty() {
                if let Some((start, first_line)) = current.take() {
                    paragraphs.push(Self::paragraph(
                        arena, source, start, last_end, first_line, last_line,
                    ));
                }
            } else {
                if current.is_none() {
                    current = Some((line.start, line_number));
                }
                last_end = line.end();
                last_line = line_number;
            }
        }

        if let Some((start, first_line)) = current {
            paragraphs.push(Self::paragraph(
                arena, source, start, last_end, first_line, last_line,
            ));
        }

        Ok(TokenStream::new(
            ParserKind::Text,
            arena.alloc_slice_copy(&paragraphs),
        ))
    }
}
