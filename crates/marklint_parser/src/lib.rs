//! # marklint_parser
//!
//! Parser abstraction layer for marklint.
//!
//! This crate provides:
//! - A `Parser` trait producing token streams
//! - `ParserKind`, the name a rule uses to declare which parser it needs
//! - Built-in Markdown parser using `markdown-rs`
//! - Built-in plain text parser
//! - The physical line splitter shared with the rule engine
//!
//! ## Example
//!
//! ```rust
//! use marklint_ast::{TokenArena, TokenType};
//! use marklint_parser::{MarkdownParser, Parser};
//!
//! let arena = TokenArena::new();
//! let parser = MarkdownParser::new();
//! let source = "# Hello\n\n```js\nvar a;\n```";
//!
//! let stream = parser.parse(&arena, source).unwrap();
//! assert_eq!(stream.tokens[1].token_type, TokenType::Fence);
//! assert_eq!(stream.tokens[1].line_number, 3);
//! ```

mod error;
mod lines;
mod markdown;
mod text;
mod traits;

pub use error::ParseError;
pub use lines::{PhysicalLine, PhysicalLines, physical_lines};
pub use markdown::MarkdownParser;
pub use text::PlainTextParser;
pub use traits::{Parser, ParserKind, TokenStream};
