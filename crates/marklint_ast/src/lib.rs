//! # marklint_ast
//!
//! Token stream definitions for marklint.
//!
//! A parsed document is an ordered sequence of block tokens, each carrying
//! its token type, the 1-based source line it starts on, its text content,
//! an info-string (for fences) and nested child tokens.
//!
//! ## Architecture
//!
//! - Uses `bumpalo` for arena allocation of tokens
//! - All tokens of one lint pass live in a single arena
//! - Tokens are `Copy` and immutable once produced by a parser
//!
//! ## Example
//!
//! ```rust
//! use marklint_ast::{Span, Token, TokenArena, TokenType};
//!
//! let arena = TokenArena::new();
//! let text = arena.alloc(Token::leaf(TokenType::Text, 1, 1, Span::new(0, 5), "Hello"));
//! let children = arena.alloc_slice_copy(&[*text]);
//! let paragraph = Token::container(TokenType::Paragraph, 1, 1, Span::new(0, 5), "Hello", children);
//!
//! assert_eq!(paragraph.children.len(), 1);
//! ```

mod arena;
mod span;
mod token;
mod token_type;
pub mod walk;

pub use arena::TokenArena;
pub use span::Span;
pub use token::Token;
pub use token_type::TokenType;
pub use walk::{TokenIter, walk_tokens};
