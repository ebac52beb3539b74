//! Token definition.

use serde::Serialize;

use crate::{Span, TokenType};

/// A token in a parsed document.
///
/// Tokens are allocated in a [`TokenArena`](crate::TokenArena) and tied to it
/// by the `'a` lifetime. They are immutable once produced by a parser.
///
/// # Example
///
/// ```rust
/// use marklint_ast::{Span, Token, TokenType};
///
/// let fence = Token::leaf(TokenType::Fence, 3, 5, Span::new(10, 30), "let a = 1;")
///     .with_info("js");
///
/// assert_eq!(fence.line_number, 3);
/// assert_eq!(fence.language(), Some("js"));
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Token<'a> {
    /// The type of this token.
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// 1-based line the token starts on.
    pub line_number: u32,

    /// 1-based line the token ends on (inclusive).
    pub end_line: u32,

    /// Byte span in the source text.
    pub span: Span,

    /// Literal content for code and text tokens, source slice otherwise.
    ///
    /// For fences this is the text between the delimiters.
    pub content: &'a str,

    /// Info-string of a fence (language and meta), empty for other tokens.
    pub info: &'a str,

    /// Nested tokens in document order.
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub children: &'a [Token<'a>],
}

impl<'a> Token<'a> {
    /// Creates a token without children.
    #[inline]
    pub const fn leaf(
        token_type: TokenType,
        line_number: u32,
        end_line: u32,
        span: Span,
        content: &'a str,
    ) -> Self {
        Self {
            token_type,
            line_number,
            end_line,
            span,
            content,
            info: "",
            children: &[],
        }
    }

    /// Creates a token holding nested tokens.
    #[inline]
    pub const fn container(
        token_type: TokenType,
        line_number: u32,
        end_line: u32,
        span: Span,
        content: &'a str,
        children: &'a [Token<'a>],
    ) -> Self {
        Self {
            token_type,
            line_number,
            end_line,
            span,
            content,
            info: "",
            children,
        }
    }

    /// Sets the info-string.
    #[inline]
    pub const fn with_info(mut self, info: &'a str) -> Self {
        self.info = info;
        self
    }

    /// Returns true if this token has children.
    #[inline]
    pub const fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns true if the given 1-based line falls inside this token.
    #[inline]
    pub const fn covers_line(&self, line_number: u32) -> bool {
        self.line_number <= line_number && line_number <= self.end_line
    }

    /// Returns the first word of the info-string, conventionally the
    /// embedded content's language.
    pub fn language(&self) -> Option<&'a str> {
        self.info.split_whitespace().next()
    }
}
