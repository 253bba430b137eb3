//! The builder front end: classifies call names into event constructions.
//!
//! A call is `(name, args, optional block)`. The name is matched against
//! an ordered list of rules, first match wins; the constructed event is
//! wrapped in a container, appended to the current list, and the
//! container id is returned so callers can keep operating on it
//! (repeat, endings, chord merges).

use crate::arena::Arena;
use crate::detach::{detach, detach_event};
use crate::error::{BuildError, Result};
use crate::event::{
    Cram, EventKind, GetVariable, Identifier, InlineCall, Label, ListData, Marker, Note, Octave,
    Part, RawText, Rest, SetVariable, Voice,
};
use crate::formatter;
use alda_core::{EventId, Generation, RenderContext, Value};

/// A deferred builder block, run against a nested event list during the
/// on-contained phase.
pub type Block<'f> = Box<dyn FnOnce(&mut Builder<'_>) -> Result<()> + 'f>;

/// Mutable view over one event list of a score under construction.
pub struct Builder<'a> {
    arena: &'a mut Arena,
    list: EventId,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(arena: &'a mut Arena, list: EventId) -> Self {
        Builder { arena, list }
    }

    /// The event list this builder appends to.
    pub fn list(&self) -> EventId {
        self.list
    }

    pub fn arena(&self) -> &Arena {
        self.arena
    }

    /// Dispatch a builder call without a block.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<EventId> {
        self.dispatch(name, args, None)
    }

    /// Dispatch a builder call with a block.
    pub fn call_block<F>(&mut self, name: &str, args: Vec<Value>, block: F) -> Result<EventId>
    where
        F: FnOnce(&mut Builder<'_>) -> Result<()>,
    {
        self.dispatch(name, args, Some(Box::new(block)))
    }

    /// Chained single-argument application, the shape a run of juxtaposed
    /// calls takes: `chain(&["c", "d", "e"])` is `c(d(e()))`, which the
    /// sequence sugar folds into one `[c d e]`.
    pub fn chain(&mut self, names: &[&str]) -> Result<EventId> {
        let mut previous: Option<EventId> = None;
        for name in names.iter().rev() {
            let args: Vec<Value> = previous.take().map(Value::Event).into_iter().collect();
            previous = Some(self.call(name, args)?);
        }
        previous.ok_or_else(|| BuildError::UnhandledCall {
            name: String::new(),
        })
    }

    /// Append verbatim notation text.
    pub fn raw(&mut self, text: impl Into<String>) -> EventId {
        let ev = self.arena.alloc(EventKind::RawText(RawText {
            text: text.into(),
        }));
        self.wrap_append(ev)
    }

    /// Whether `name` is declared in this scope or any ancestor scope.
    pub fn has_variable(&self, name: &str) -> bool {
        let mut current = Some(self.list);
        while let Some(id) = current {
            if let Some(list) = self.arena[id].kind.list() {
                if list.variables.contains(name) {
                    return true;
                }
            }
            current = self.arena[id].parent;
        }
        false
    }

    // ---- ordered dispatch rules ----

    fn dispatch(&mut self, name: &str, args: Vec<Value>, block: Option<Block<'_>>) -> Result<EventId> {
        // 1. `word__` defines a variable.
        if let Some(word) = set_variable_name(name) {
            let word = word.to_string();
            return self.build_set_variable(word, args, block);
        }
        // 2. `word_` opens an instrument part.
        if let Some(word) = part_name(name) {
            return self.build_part(&word, args);
        }
        // 3. A plain lowercase word is a variable definition, a variable
        //    reference, or an inline lisp call.
        if is_plain_word(name) {
            return self.build_plain(name, args, block);
        }
        // 4. `t<duration>` crams its block into one duration.
        if let Some(duration) = name.strip_prefix('t') {
            let duration = duration.to_string();
            return self.build_cram(name, duration, args, block);
        }
        // 5. A pitch letter with a fused duration tail is a note.
        let mut chars = name.chars();
        if let Some(letter) = chars.next() {
            if ('a'..='g').contains(&letter) {
                let event = self.arena.alloc(EventKind::Note(Note::from_token(
                    letter,
                    chars.as_str(),
                )));
                return self.sugar(event, args);
            }
        }
        // 6. `r<duration>` is a rest.
        if let Some(duration) = name.strip_prefix('r') {
            let event = self.arena.alloc(EventKind::Rest(Rest {
                duration: duration.to_string(),
            }));
            return self.sugar(event, args);
        }
        // 7. `x` builds a chord from its block.
        if name == "x" {
            return self.build_chord(block);
        }
        // 8. `s` builds a sequence from args and/or block.
        if name == "s" {
            return self.build_sequence(args, block);
        }
        // 9. Octave shifts and jumps.
        if name == "o!" {
            let event = self.arena.alloc(EventKind::Octave(Octave::up()));
            return self.sugar(event, args);
        }
        if name == "o?" {
            let event = self.arena.alloc(EventKind::Octave(Octave::down()));
            return self.sugar(event, args);
        }
        if let Some(num) = strip_digits(name, 'o') {
            let event = self.arena.alloc(EventKind::Octave(Octave::absolute(num)));
            return self.sugar(event, args);
        }
        // 10. `v<digits>` switches voices.
        if let Some(num) = strip_digits(name, 'v') {
            let event = self.arena.alloc(EventKind::Voice(Voice { num: num as u32 }));
            return Ok(self.wrap_append(event));
        }
        // 11. `__name` jumps to a marker.
        if let Some(rest) = name.strip_prefix("__") {
            if !rest.is_empty() {
                let event = self.arena.alloc(EventKind::AtMarker(crate::event::AtMarker {
                    name: rest.to_string(),
                }));
                return self.sugar(event, args);
            }
        }
        // 12. `_name_` is a bare lisp identifier.
        if name.len() >= 3 && name.starts_with('_') && name.ends_with('_') {
            let inner = &name[1..name.len() - 1];
            let event = self.arena.alloc(EventKind::Identifier(Identifier {
                name: inner.replace('_', "-"),
            }));
            return Ok(self.wrap_append(event));
        }
        // 13. `_name` places a marker.
        if let Some(rest) = name.strip_prefix('_') {
            if !rest.is_empty() {
                let event = self.arena.alloc(EventKind::Marker(Marker {
                    name: rest.to_string(),
                }));
                return self.sugar(event, args);
            }
        }
        // 14. Nothing matched.
        Err(BuildError::UnhandledCall {
            name: name.to_string(),
        })
    }

    fn build_plain(
        &mut self,
        name: &str,
        args: Vec<Value>,
        block: Option<Block<'_>>,
    ) -> Result<EventId> {
        let declared = self.has_variable(name);
        let lone_event = if args.len() == 1 {
            args[0].as_event()
        } else {
            None
        };
        let assignable_arg = lone_event
            .map(|id| !self.is_call_or_identifier(id))
            .unwrap_or(false);

        if block.is_some() || (!declared && assignable_arg) {
            return self.build_set_variable(name.to_string(), args, block);
        }
        if declared && (args.is_empty() || lone_event.is_some()) {
            let event = self.arena.alloc(EventKind::GetVariable(GetVariable {
                name: name.to_string(),
            }));
            return self.sugar(event, args);
        }
        self.build_inline_call(name, args)
    }

    fn build_set_variable(
        &mut self,
        name: String,
        args: Vec<Value>,
        block: Option<Block<'_>>,
    ) -> Result<EventId> {
        let body = self.reclaim_arguments(&args)?;
        let var = self.arena.alloc(EventKind::SetVariable(SetVariable {
            name: name.clone(),
            list: ListData {
                events: body.clone(),
                ..Default::default()
            },
        }));
        for &child in &body {
            self.arena.set_parent_chain(var, child);
        }
        let container = self.wrap_append(var);
        // On-contained: the name is declared in the enclosing scope, not
        // in the definition's own scope.
        self.declare_variable(&name);
        if let Some(block) = block {
            self.run_block(var, block)?;
        }
        Ok(container)
    }

    fn build_part(&mut self, name: &str, args: Vec<Value>) -> Result<EventId> {
        if args.len() == 1 {
            if let Value::Str(nickname) = &args[0] {
                let event = self.arena.alloc(EventKind::Part(
                    Part::new(name).with_nickname(nickname.clone()),
                ));
                return Ok(self.wrap_append(event));
            }
            if let Some(arg) = args[0].as_event() {
                // Positional sugar: the part slots in front of the phrase
                // it applies to.
                let top = self.arena.topmost_container(arg);
                detach_event(self.arena, arg, &[])?;
                let event = self.arena.alloc(EventKind::Part(Part::new(name)));
                let container = self.wrap_append(event);
                self.arena.append(self.list, top);
                return Ok(container);
            }
        }
        let event = self.arena.alloc(EventKind::Part(Part::new(name)));
        Ok(self.wrap_append(event))
    }

    fn build_cram(
        &mut self,
        name: &str,
        duration: String,
        args: Vec<Value>,
        block: Option<Block<'_>>,
    ) -> Result<EventId> {
        let block = block.ok_or_else(|| BuildError::BlockRequired {
            name: name.to_string(),
        })?;
        let body = self.reclaim_arguments(&args)?;
        let cram = self.arena.alloc(EventKind::Cram(Cram {
            duration,
            list: ListData {
                events: body.clone(),
                ..Default::default()
            },
        }));
        for &child in &body {
            self.arena.set_parent_chain(cram, child);
        }
        let container = self.wrap_append(cram);
        self.run_block(cram, block)?;
        Ok(container)
    }

    fn build_chord(&mut self, block: Option<Block<'_>>) -> Result<EventId> {
        let chord = self.arena.alloc(EventKind::Chord(ListData::default()));
        let container = self.wrap_append(chord);
        if let Some(block) = block {
            self.run_block(chord, block)?;
        }
        Ok(container)
    }

    fn build_sequence(&mut self, args: Vec<Value>, block: Option<Block<'_>>) -> Result<EventId> {
        let body = self.reclaim_arguments(&args)?;
        let seq = self.arena.alloc(EventKind::Sequence(ListData {
            events: body.clone(),
            ..Default::default()
        }));
        for &child in &body {
            self.arena.set_parent_chain(seq, child);
        }
        let container = self.wrap_append(seq);
        if let Some(block) = block {
            self.run_block(seq, block)?;
        }
        Ok(container)
    }

    fn build_inline_call(&mut self, name: &str, args: Vec<Value>) -> Result<EventId> {
        for value in args.iter().rev() {
            detach(self.arena, value, &[])?;
        }
        let event = self.arena.alloc(EventKind::InlineCall(InlineCall {
            head: name.replace('_', "-"),
            args,
        }));
        Ok(self.wrap_append(event))
    }

    // ---- container operations ----

    /// Multiply the repetition count of an event's container.
    pub fn repeat(&mut self, event: EventId, count: u32) -> EventId {
        let top = self.arena.topmost_container(event);
        if let EventKind::Container(container) = &mut self.arena[top].kind {
            container.count *= count;
        } else {
            debug_assert!(false, "repeat target has no container");
        }
        top
    }

    /// Add alternate-ending labels to an event's container, preserving
    /// order and skipping duplicates.
    pub fn endings(&mut self, event: EventId, labels: &[Label]) -> EventId {
        let top = self.arena.topmost_container(event);
        if let EventKind::Container(container) = &mut self.arena[top].kind {
            for &label in labels {
                if !container.labels.contains(&label) {
                    container.labels.push(label);
                }
            }
        } else {
            debug_assert!(false, "endings target has no container");
        }
        top
    }

    /// Merge `right` into `left` as chord operands, the `/` operator.
    ///
    /// `right` must be the most recently appended sibling. `left` keeps
    /// its container (and therefore its count and labels); its inner
    /// event is folded into a chord together with `right`.
    pub fn merge_chord(&mut self, left: EventId, right: EventId) -> Result<EventId> {
        let right_top = self.arena.topmost_container(right);
        detach_event(self.arena, right, &[])?;
        let left_top = self.arena.topmost_container(left);
        let inner = self.arena.innermost(left_top);

        if matches!(self.arena[inner].kind, EventKind::Chord(_)) {
            self.arena.append(inner, right_top);
            return Ok(left_top);
        }

        let inner_container = self.arena.wrap(inner);
        let chord = self.arena.alloc(EventKind::Chord(ListData::default()));
        let owner = self.arena[left_top].parent;
        if let EventKind::Container(container) = &mut self.arena[left_top].kind {
            container.event = chord;
        } else {
            debug_assert!(false, "chord merge target has no container");
        }
        self.arena[chord].container = Some(left_top);
        self.arena[chord].parent = owner;
        self.arena.append(chord, inner_container);
        self.arena.append(chord, right_top);
        Ok(left_top)
    }

    /// Add another instrument name to a just-built part, the dot
    /// accessor. The part must still be the most recently appended
    /// sibling; it is detached, extended, and re-appended.
    pub fn extend_part(&mut self, part: EventId, name: &str) -> Result<EventId> {
        let top = self.arena.topmost_container(part);
        detach_event(self.arena, part, &[])?;
        let inner = self.arena.innermost(top);
        match &mut self.arena[inner].kind {
            EventKind::Part(part) => part.names.push(name.replace('_', "-")),
            _ => {
                self.arena.append(self.list, top);
                let ctx = RenderContext::new(Generation::default());
                return Err(BuildError::NotAPart {
                    code: formatter::event_code(self.arena, top, ctx),
                });
            }
        }
        self.arena.append(self.list, top);
        Ok(top)
    }

    // ---- internals ----

    /// Wrap an event, append it to the current list, and hand back the
    /// container.
    fn wrap_append(&mut self, event: EventId) -> EventId {
        let container = self.arena.wrap(event);
        self.arena.append(self.list, container);
        container
    }

    /// Detach argument events (in reverse declaration order) and collect
    /// their containers, left to right, as a list body.
    fn reclaim_arguments(&mut self, args: &[Value]) -> Result<Vec<EventId>> {
        for value in args.iter().rev() {
            detach(self.arena, value, &[])?;
        }
        Ok(args
            .iter()
            .filter_map(|value| value.as_event())
            .map(|id| self.arena.topmost_container(id))
            .collect())
    }

    fn declare_variable(&mut self, name: &str) {
        if let Some(list) = self.arena[self.list].kind.list_mut() {
            list.variables.insert(name.to_string());
        } else {
            debug_assert!(false, "builder scope is not a list event");
        }
    }

    fn run_block(&mut self, list: EventId, block: Block<'_>) -> Result<()> {
        let mut nested = Builder::new(self.arena, list);
        block(&mut nested)
    }

    fn is_call_or_identifier(&self, id: EventId) -> bool {
        matches!(
            self.arena[self.arena.innermost(id)].kind,
            EventKind::InlineCall(_) | EventKind::Identifier(_)
        )
    }

    /// Single-argument sugar: a sugar-eligible event given exactly one
    /// event argument merges with it into one flattened sequence. The
    /// argument must be the most recently appended sibling.
    fn sugar(&mut self, event: EventId, args: Vec<Value>) -> Result<EventId> {
        if args.len() == 1 {
            if let Some(arg) = args[0].as_event() {
                let top = self.arena.topmost_container(arg);
                detach_event(self.arena, arg, &[])?;
                let seq = self.join_sequence(event, top);
                return Ok(self.wrap_append(seq));
            }
        }
        Ok(self.wrap_append(event))
    }

    /// Build the flattened sequence `[first, ..second]`.
    ///
    /// Plain containers wrapping sequences are unwrapped and spliced;
    /// a container carrying a count or labels is kept whole.
    fn join_sequence(&mut self, first: EventId, second: EventId) -> EventId {
        let first_container = self.arena.wrap(first);
        let mut children = Vec::new();
        self.flatten_into(first_container, &mut children);
        self.flatten_into(second, &mut children);
        let seq = self.arena.alloc(EventKind::Sequence(ListData {
            events: children.clone(),
            ..Default::default()
        }));
        for &child in &children {
            self.arena.set_parent_chain(seq, child);
        }
        seq
    }

    fn flatten_into(&self, container: EventId, out: &mut Vec<EventId>) {
        if let EventKind::Container(c) = &self.arena[container].kind {
            if c.is_plain() {
                if let EventKind::Sequence(list) = &self.arena[c.event].kind {
                    for &child in &list.events {
                        self.flatten_into(child, out);
                    }
                    return;
                }
            }
        }
        out.push(container);
    }
}

// ---- name classification helpers ----

/// `word__` where the word is a valid variable name: two leading
/// lowercase letters, then lowercase/digits/underscores, ending
/// alphanumeric. The trailing-character restriction keeps note tokens
/// like `d___` out of this rule.
fn set_variable_name(name: &str) -> Option<&str> {
    let word = name.strip_suffix("__")?;
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second))
            if first.is_ascii_lowercase() && second.is_ascii_lowercase() => {}
        _ => return None,
    }
    let valid = word
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && word.ends_with(|c: char| c.is_ascii_alphanumeric());
    valid.then_some(word)
}

/// `word_` where the word is at least two lowercase letters (inner
/// underscores allowed, emitted as hyphens).
fn part_name(name: &str) -> Option<String> {
    let word = name.strip_suffix('_')?;
    is_plain_word(word).then(|| word.replace('_', "-"))
}

fn is_plain_word(name: &str) -> bool {
    name.len() >= 2
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.ends_with(|c: char| c.is_ascii_lowercase())
}

/// `<prefix><digits>`, e.g. `o4` or `v2`.
fn strip_digits(name: &str, prefix: char) -> Option<i32> {
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}
