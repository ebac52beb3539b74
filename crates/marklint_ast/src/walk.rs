//! Depth-first traversal of token streams.
//!
//! Both [`walk_tokens`] and [`TokenIter`] visit tokens in pre-order, which
//! is the order tokens appear in the source document. A container token is
//! visited before its children and every token is visited exactly once.

use std::ops::ControlFlow;

use crate::Token;

/// Walks `tokens` depth-first in document order.
///
/// The callback may return `ControlFlow::Break(())` to stop the traversal.
///
/// # Example
///
/// ```rust
/// use std::ops::ControlFlow;
/// use marklint_ast::{Span, Token, TokenArena, TokenType, walk_tokens};
///
/// let arena = TokenArena::new();
/// let text = Token::leaf(TokenType::Text, 1, 1, Span::new(0, 2), "hi");
/// let para = Token::container(
///     TokenType::Paragraph, 1, 1, Span::new(0, 2), "hi", arena.alloc_slice_copy(&[text]),
/// );
///
/// let mut seen = Vec::new();
/// let _ = walk_tokens(&[para], &mut |token| {
///     seen.push(token.token_type);
///     ControlFlow::Continue(())
/// });
/// assert_eq!(seen, vec![TokenType::Paragraph, TokenType::Text]);
/// ```
pub fn walk_tokens<'a, F>(tokens: &'a [Token<'a>], f: &mut F) -> ControlFlow<()>
where
    F: FnMut(&'a Token<'a>) -> ControlFlow<()>,
{
    for token in tokens {
        f(token)?;
        walk_tokens(token.children, f)?;
    }
    ControlFlow::Continue(())
}

/// Lazy pre-order iterator over a token stream.
///
/// Uses an explicit stack so deeply nested documents cannot overflow the
/// call stack.
pub struct TokenIter<'a> {
    stack: Vec<std::slice::Iter<'a, Token<'a>>>,
}

impl<'a> TokenIter<'a> {
    /// Creates an iterator over `tokens` and all of their descendants.
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            stack: vec![tokens.iter()],
        }
    }
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = &'a Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(token) => {
                    if token.has_children() {
                        self.stack.push(token.children.iter());
                    }
                    return Some(token);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Span, TokenArena, TokenType};
    use pretty_assertions::assert_eq;

    fn sample<'a>(arena: &'a TokenArena) -> &'a [Token<'a>] {
        let code = Token::leaf(TokenType::CodeInline, 1, 1, Span::new(8, 11), "x");
        let text = Token::leaf(TokenType::Text, 1, 1, Span::new(0, 7), "Inline ");
        let para = Token::container(
            TokenType::Paragraph,
            1,
            1,
            Span::new(0, 11),
            "Inline `x`",
            arena.alloc_slice_copy(&[text, code]),
        );
        let fence = Token::leaf(TokenType::Fence, 3, 5, Span::new(13, 30), "var a;")
            .with_info("js");
        arena.alloc_slice_copy(&[para, fence])
    }

    #[test]
    fn test_iter_pre_order() {
        let arena = TokenArena::new();
        let tokens = sample(&arena);

        let types: Vec<_> = TokenIter::new(tokens).map(|t| t.token_type).collect();
        assert_eq!(
            types,
            vec![
                TokenType::Paragraph,
                TokenType::Text,
                TokenType::CodeInline,
                TokenType::Fence
            ]
        );
    }

    #[test]
    fn test_walk_matches_iter() {
        let arena = TokenArena::new();
        let tokens = sample(&arena);

        let mut walked = Vec::new();
        let _ = walk_tokens(tokens, &mut |t| {
            walked.push(t.span);
            ControlFlow::Continue(())
        });
        let iterated: Vec<_> = TokenIter::new(tokens).map(|t| t.span).collect();
        assert_eq!(walked, iterated);
    }

    #[test]
    fn test_walk_break_stops_traversal() {
        let arena = TokenArena::new();
        let tokens = sample(&arena);

        let mut count = 0;
        let flow = walk_tokens(tokens, &mut |t| {
            count += 1;
            if t.token_type == TokenType::Text {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_iter_empty() {
        assert_eq!(TokenIter::new(&[]).count(), 0);
    }
}
