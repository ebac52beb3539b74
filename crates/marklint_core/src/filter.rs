//! Token filtering helpers for rules.

use marklint_ast::{Token, TokenIter, TokenType};

use crate::rule::RuleParams;

/// Iterates depth-first over every token of the document, in document
/// order.
pub fn iter_tokens<'a>(params: &RuleParams<'a>) -> TokenIter<'a> {
    TokenIter::new(params.context.tokens())
}

/// Calls `visit` for each token of `token_type`, in document order, and
/// collects what it returns.
///
/// The visitor may return futures; the filter never awaits them, so the
/// caller decides how to combine them:
///
/// ```rust,ignore
/// let pending = filter_tokens(&params, TokenType::Fence, |fence| check(fence));
/// let outcomes = futures_util::future::join_all(pending).await;
/// ```
pub fn filter_tokens<'a, T, F>(params: &RuleParams<'a>, token_type: TokenType, visit: F) -> Vec<T>
where
    F: FnMut(&'a Token<'a>) -> T,
{
    iter_tokens(params)
        .filter(|token| token.token_type == token_type)
        .map(visit)
        .collect()
}
