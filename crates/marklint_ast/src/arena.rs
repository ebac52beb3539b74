//! Arena allocator for tokens.
//!
//! Uses `bumpalo` for bump allocation. Every token produced while linting a
//! single document is allocated in the same arena and freed together once
//! the pass is complete.

use bumpalo::Bump;

/// Arena allocator for tokens.
///
/// # Example
///
/// ```rust
/// use marklint_ast::TokenArena;
///
/// let arena = TokenArena::new();
///
/// let value = arena.alloc(42u32);
/// assert_eq!(*value, 42);
///
/// let s = arena.alloc_str("js");
/// assert_eq!(s, "js");
/// ```
pub struct TokenArena {
    bump: Bump,
}

impl TokenArena {
    /// Creates a new arena allocator.
    #[inline]
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Creates a new arena with `capacity` bytes preallocated.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// Allocates a value in the arena and returns a reference to it.
    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    /// Allocates a string slice in the arena.
    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Allocates a slice in the arena by copying from the input slice.
    #[inline]
    pub fn alloc_slice_copy<T: Copy>(&self, slice: &[T]) -> &[T] {
        self.bump.alloc_slice_copy(slice)
    }

    /// Allocates a slice in the arena from an exact-size iterator.
    #[inline]
    pub fn alloc_slice_fill_iter<T, I>(&self, iter: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.bump.alloc_slice_fill_iter(iter)
    }

    /// Returns the total bytes allocated in this arena.
    #[inline]
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for TokenArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_alloc_str() {
        let arena = TokenArena::new();
        let s = arena.alloc_str("javascript");
        assert_eq!(s, "javascript");
    }

    #[test]
    fn test_arena_alloc_slice_fill_iter() {
        let arena = TokenArena::new();
        let slice = arena.alloc_slice_fill_iter((1..4).map(|n| n * 10));
        assert_eq!(slice, &[10, 20, 30]);
    }

    #[test]
    fn test_arena_with_capacity_reports_allocation() {
        let arena = TokenArena::with_capacity(1024);
        let _ = arena.alloc(7u64);
        assert!(arena.allocated_bytes() > 0);
    }
}
