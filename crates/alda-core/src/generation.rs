use serde::{Deserialize, Serialize};
use std::fmt;

/// Which generation of the Alda language to emit.
///
/// The two generations disagree on how collections, symbols, and
/// chord/octave spacing are written, so every render call has to know
/// which one it is targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    /// Alda 1 syntax: `[a b]` lists, `{k v}` maps, `:symbol`.
    V1,
    /// Alda 2 syntax: quoted lisp lists `'(a b)` and bare symbols inside them.
    V2,
}

impl Generation {
    pub fn is_v1(self) -> bool {
        self == Generation::V1
    }

    pub fn is_v2(self) -> bool {
        self == Generation::V2
    }
}

impl Default for Generation {
    fn default() -> Self {
        Generation::V2
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::V1 => write!(f, "v1"),
            Generation::V2 => write!(f, "v2"),
        }
    }
}

/// State for one render call chain.
///
/// `nested` tracks whether we are already inside a collection being
/// rendered in the same chain; generation-2 quoting depends on it. It is
/// threaded through render calls explicitly so concurrent renders of
/// independent trees can never observe each other's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    pub generation: Generation,
    pub nested: bool,
}

impl RenderContext {
    pub fn new(generation: Generation) -> Self {
        RenderContext {
            generation,
            nested: false,
        }
    }

    /// The context for elements inside a collection.
    pub fn nested(self) -> Self {
        RenderContext {
            nested: true,
            ..self
        }
    }

    /// The context at the start of a fresh call chain.
    pub fn top_level(self) -> Self {
        RenderContext {
            nested: false,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_preserves_generation() {
        let ctx = RenderContext::new(Generation::V1);
        assert!(!ctx.nested);
        let inner = ctx.nested();
        assert!(inner.nested);
        assert_eq!(inner.generation, Generation::V1);
        assert!(!inner.top_level().nested);
    }

    #[test]
    fn test_default_generation() {
        assert_eq!(Generation::default(), Generation::V2);
    }
}
