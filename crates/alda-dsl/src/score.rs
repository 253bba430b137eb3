//! The score: owner of the event arena and the top-level event list.

use crate::arena::{eq_across, Arena};
use crate::builder::Builder;
use crate::error::Result;
use crate::event::{EventKind, ListData};
use crate::formatter;
use alda_core::{EventId, Generation, RenderContext};
use serde::{Deserialize, Serialize};

/// A score under construction, and the entry point of the builder DSL.
///
/// The arena rooted here exclusively owns every event of the tree;
/// builder blocks mutate it through [`Builder`] views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    arena: Arena,
    root: EventId,
}

impl Score {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(EventKind::Root(ListData::default()));
        Score { arena, root }
    }

    /// Build a score by running `block` against the top-level list.
    ///
    /// The block runs immediately, exactly once. On failure the partial
    /// tree is dropped with the error; use [`Score::extend`] when the
    /// tree built so far should stay inspectable.
    pub fn build<F>(block: F) -> Result<Self>
    where
        F: FnOnce(&mut Builder<'_>) -> Result<()>,
    {
        let mut score = Score::new();
        score.extend(block)?;
        Ok(score)
    }

    /// Run a builder block against the top-level list.
    ///
    /// On error, everything appended before the failure point remains in
    /// the score.
    pub fn extend<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut Builder<'_>) -> Result<()>,
    {
        let mut builder = Builder::new(&mut self.arena, self.root);
        block(&mut builder)
    }

    /// Render the whole score, top-level events joined by single spaces.
    pub fn render(&self, generation: Generation) -> String {
        formatter::event_code(&self.arena, self.root, RenderContext::new(generation))
    }

    /// Render one event of this score.
    pub fn event_code(&self, id: EventId, generation: Generation) -> String {
        formatter::event_code(&self.arena, id, RenderContext::new(generation))
    }

    /// The top-level containers, in notation order.
    pub fn events(&self) -> &[EventId] {
        match self.arena[self.root].kind.list() {
            Some(list) => &list.events,
            None => &[],
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Structural equality with another score, ignoring arena layout and
    /// tree links.
    pub fn tree_eq(&self, other: &Score) -> bool {
        eq_across(&self.arena, self.root, &other.arena, other.root)
    }
}

impl Default for Score {
    fn default() -> Self {
        Score::new()
    }
}
