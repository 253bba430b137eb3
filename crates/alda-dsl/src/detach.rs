//! The detach protocol: pulling a just-built event back out of its
//! owner's list so it can be re-embedded somewhere else.
//!
//! Removal is strictly LIFO. Restructuring operations (chord merges,
//! sequence joins, variable bodies, inline-call arguments) only ever
//! concern the most recently appended sibling; detaching anything else is
//! an ordering violation and fails with [`BuildError::OrderError`].

use crate::arena::Arena;
use crate::error::{BuildError, Result};
use crate::event::ListKind;
use crate::formatter;
use alda_core::{EventId, Generation, RenderContext, Value};

/// Detach a value from the tree.
///
/// Event values resolve to their topmost enclosing container and are
/// popped from their owner's list; collections detach their elements in
/// reverse declaration order, so the physical pops unwind left-to-right
/// construction; primitives are no-ops. If the owning list's kind is in
/// `except`, the event is deliberately left where it is.
pub fn detach(arena: &mut Arena, value: &Value, except: &[ListKind]) -> Result<()> {
    match value {
        Value::Event(id) => detach_event(arena, *id, except),
        Value::List(items) => {
            for item in items.iter().rev() {
                detach(arena, item, except)?;
            }
            Ok(())
        }
        Value::Map(pairs) => {
            for (key, val) in pairs.iter().rev() {
                detach(arena, val, except)?;
                detach(arena, key, except)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Detach a single event, enforcing the last-sibling invariant.
pub fn detach_event(arena: &mut Arena, id: EventId, except: &[ListKind]) -> Result<()> {
    let top = arena.topmost_container(id);
    let owner = match arena[top].parent {
        Some(owner) => owner,
        // Already detached; nothing to undo.
        None => return Ok(()),
    };
    if let Some(kind) = arena[owner].kind.list_kind() {
        if except.contains(&kind) {
            return Ok(());
        }
    }

    let popped = match arena[owner].kind.list_mut() {
        Some(list) => list.events.pop(),
        None => None,
    };
    match popped {
        Some(last) if last == top => {
            arena[top].parent = None;
            Ok(())
        }
        Some(last) => {
            // Put the sibling back so the tree stays consistent for
            // inspection, then report the violation.
            if let Some(list) = arena[owner].kind.list_mut() {
                list.events.push(last);
            }
            Err(order_error(arena, top, last))
        }
        None => {
            debug_assert!(false, "parent link points at an empty or non-list event");
            Ok(())
        }
    }
}

fn order_error(arena: &Arena, expected: EventId, got: EventId) -> BuildError {
    let ctx = RenderContext::new(Generation::default());
    BuildError::OrderError {
        expected,
        got,
        expected_code: formatter::event_code(arena, expected, ctx),
        got_code: formatter::event_code(arena, got, ctx),
    }
}
