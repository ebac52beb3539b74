//! Parser trait definition.

use std::fmt;
use std::str::FromStr;

use marklint_ast::{Token, TokenArena};
use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Identifies a parser.
///
/// Rules declare the parser whose token stream they expect; the engine
/// routes each rule to the stream produced by that parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// CommonMark + GFM markdown parser.
    #[serde(alias = "markdownit")]
    Markdown,
    /// Plain text parser (paragraphs separated by blank lines).
    Text,
}

impl ParserKind {
    /// Returns the canonical name of this parser kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ParserKind::Markdown => "markdown",
            ParserKind::Text => "text",
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParserKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "markdownit" => Ok(ParserKind::Markdown),
            "text" => Ok(ParserKind::Text),
            other => Err(ParseError::internal(format!("unknown parser '{}'", other))),
        }
    }
}

/// An ordered, already-parsed sequence of top-level tokens.
#[derive(Debug, Clone, Copy)]
pub struct TokenStream<'a> {
    /// The parser that produced this stream.
    pub parser: ParserKind,
    /// Top-level tokens in document order.
    pub tokens: &'a [Token<'a>],
}

impl<'a> TokenStream<'a> {
    /// Creates a token stream.
    pub const fn new(parser: ParserKind, tokens: &'a [Token<'a>]) -> Self {
        Self { parser, tokens }
    }

    /// Returns true if the stream holds no tokens.
    pub const fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Trait for parsing source text into a token stream.
///
/// # Example
///
/// ```rust
/// use marklint_ast::TokenArena;
/// use marklint_parser::{ParseError, Parser, ParserKind, TokenStream};
///
/// struct EmptyParser;
///
/// impl Parser for EmptyParser {
///     fn kind(&self) -> ParserKind {
///         ParserKind::Text
///     }
///
///     fn extensions(&self) -> &[&str] {
///         &["empty"]
///     }
///
///     fn parse<'a>(
///         &self,
///         _arena: &'a TokenArena,
///         _source: &str,
///     ) -> Result<TokenStream<'a>, ParseError> {
///         Ok(TokenStream::new(ParserKind::Text, &[]))
///     }
/// }
///
/// assert_eq!(EmptyParser.name(), "text");
/// ```
pub trait Parser: Send + Sync {
    /// Returns the kind of this parser.
    fn kind(&self) -> ParserKind;

    /// Returns the name of this parser.
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Returns the file extensions this parser handles.
    ///
    /// Extensions should not include the leading dot (e.g., `["md", "markdown"]`).
    fn extensions(&self) -> &[&str];

    /// Parses the source text into a token stream allocated in `arena`.
    fn parse<'a>(&self, arena: &'a TokenArena, source: &str)
    -> Result<TokenStream<'a>, ParseError>;

    /// Returns true if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
