//! The event arena: single owner of every node in a score tree.
//!
//! Parent and container links are plain ids rather than references, so
//! the cyclic event ↔ list navigation of the notation model costs no
//! shared ownership. Ids are never freed; a detached event simply loses
//! its parent link until it is re-embedded.

use crate::event::{Container, EventKind, ListData};
use alda_core::{EventId, Value};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One arena slot: an event plus its tree links.
///
/// Invariant: `parent` is the list-carrying node whose `events` sequence
/// transitively contains this one (directly or via its container);
/// `container` is the nearest enclosing container, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventNode {
    pub kind: EventKind,
    pub parent: Option<EventId>,
    pub container: Option<EventId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    nodes: Vec<EventNode>,
}

impl Index<EventId> for Arena {
    type Output = EventNode;

    fn index(&self, id: EventId) -> &EventNode {
        &self.nodes[id.index()]
    }
}

impl IndexMut<EventId> for Arena {
    fn index_mut(&mut self, id: EventId) -> &mut EventNode {
        &mut self.nodes[id.index()]
    }
}

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, kind: EventKind) -> EventId {
        let id = EventId::new(self.nodes.len());
        self.nodes.push(EventNode {
            kind,
            parent: None,
            container: None,
        });
        id
    }

    /// Wrap an event in a fresh plain container.
    pub fn wrap(&mut self, event: EventId) -> EventId {
        let container = self.alloc(EventKind::Container(Container::new(event)));
        self[event].container = Some(container);
        container
    }

    /// Append a container to a list node's events, claiming ownership.
    pub fn append(&mut self, list: EventId, child: EventId) {
        self.set_parent_chain(list, child);
        if let Some(data) = self[list].kind.list_mut() {
            data.events.push(child);
        } else {
            debug_assert!(false, "append target is not a list event");
        }
    }

    /// Point `child` (and the events wrapped inside its containers) at
    /// `list` as their owning event list.
    pub fn set_parent_chain(&mut self, list: EventId, child: EventId) {
        self[child].parent = Some(list);
        let mut current = child;
        loop {
            let inner = match &self[current].kind {
                EventKind::Container(container) => container.event,
                _ => break,
            };
            self[inner].parent = Some(list);
            current = inner;
        }
    }

    /// Follow container links downward to the innermost wrapped event.
    pub fn innermost(&self, id: EventId) -> EventId {
        let mut current = id;
        while let EventKind::Container(container) = &self[current].kind {
            current = container.event;
        }
        current
    }

    /// Walk container links upward to the topmost enclosing container.
    /// An event with no container resolves to itself.
    pub fn topmost_container(&self, id: EventId) -> EventId {
        let mut current = id;
        while let Some(outer) = self[current].container {
            current = outer;
        }
        current
    }

    /// The list data of a list-carrying node, if it is one.
    pub fn list(&self, id: EventId) -> Option<&ListData> {
        self[id].kind.list()
    }

    /// Structural equality between two subtrees of this arena.
    ///
    /// Compares semantic fields only; parent and container links never
    /// participate, so equality does not depend on tree position.
    pub fn events_eq(&self, a: EventId, b: EventId) -> bool {
        eq_across(self, a, self, b)
    }
}

/// Structural equality across arenas, resolving ids on each side.
pub(crate) fn eq_across(ar_a: &Arena, a: EventId, ar_b: &Arena, b: EventId) -> bool {
    use EventKind::*;
    match (&ar_a[a].kind, &ar_b[b].kind) {
        (Note(x), Note(y)) => x == y,
        (Rest(x), Rest(y)) => x == y,
        (Octave(x), Octave(y)) => x == y,
        (Voice(x), Voice(y)) => x == y,
        (Marker(x), Marker(y)) => x == y,
        (AtMarker(x), AtMarker(y)) => x == y,
        (Part(x), Part(y)) => x == y,
        (GetVariable(x), GetVariable(y)) => x == y,
        (Identifier(x), Identifier(y)) => x == y,
        (RawText(x), RawText(y)) => x == y,
        (Root(x), Root(y)) | (Chord(x), Chord(y)) | (Sequence(x), Sequence(y)) => {
            lists_eq(ar_a, x, ar_b, y)
        }
        (Cram(x), Cram(y)) => x.duration == y.duration && lists_eq(ar_a, &x.list, ar_b, &y.list),
        (SetVariable(x), SetVariable(y)) => {
            x.name == y.name && lists_eq(ar_a, &x.list, ar_b, &y.list)
        }
        (InlineCall(x), InlineCall(y)) => {
            x.head == y.head
                && x.args.len() == y.args.len()
                && x.args
                    .iter()
                    .zip(&y.args)
                    .all(|(va, vb)| values_eq(ar_a, va, ar_b, vb))
        }
        (Container(x), Container(y)) => {
            x.count == y.count && x.labels == y.labels && eq_across(ar_a, x.event, ar_b, y.event)
        }
        _ => false,
    }
}

fn lists_eq(ar_a: &Arena, a: &ListData, ar_b: &Arena, b: &ListData) -> bool {
    a.events.len() == b.events.len()
        && a.events
            .iter()
            .zip(&b.events)
            .all(|(&ea, &eb)| eq_across(ar_a, ea, ar_b, eb))
}

fn values_eq(ar_a: &Arena, a: &Value, ar_b: &Arena, b: &Value) -> bool {
    match (a, b) {
        (Value::Event(ea), Value::Event(eb)) => eq_across(ar_a, *ea, ar_b, *eb),
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|(va, vb)| values_eq(ar_a, va, ar_b, vb))
        }
        (Value::Map(xs), Value::Map(ys)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys).all(|((ka, va), (kb, vb))| {
                    values_eq(ar_a, ka, ar_b, kb) && values_eq(ar_a, va, ar_b, vb)
                })
        }
        _ => a == b,
    }
}
