//! Serialization of event trees to Alda notation text.
//!
//! Every function here is a pure function of the node's fields plus the
//! explicit [`RenderContext`]; the generation/nesting state is never
//! global, so independent renders cannot interfere.

use crate::arena::Arena;
use crate::event::{Container, Cram, EventKind, ListData, Note, Octave, Part, SetVariable};
use alda_core::{quote, EventId, Generation, RenderContext, RenderEvent, Value};

impl RenderEvent for Arena {
    fn event_code(&self, id: EventId, ctx: RenderContext) -> String {
        event_code(self, id, ctx)
    }
}

/// Render any event (or container) as notation text.
pub fn event_code(arena: &Arena, id: EventId, ctx: RenderContext) -> String {
    match &arena[id].kind {
        EventKind::Root(list) => join_codes(arena, list, ctx),
        EventKind::Note(note) => note_code(note),
        EventKind::Rest(rest) => format!("r{}", rest.duration),
        EventKind::Octave(octave) => octave_code(octave),
        EventKind::Voice(voice) => format!("V{}:", voice.num),
        EventKind::Marker(marker) => format!("%{}", marker.name),
        EventKind::AtMarker(marker) => format!("@{}", marker.name),
        EventKind::Part(part) => part_code(part),
        EventKind::Chord(list) => chord_code(arena, list, ctx),
        EventKind::Sequence(list) => format!("[{}]", join_codes(arena, list, ctx)),
        EventKind::Cram(cram) => cram_code(arena, cram, ctx),
        EventKind::SetVariable(var) => set_variable_code(arena, var, ctx),
        EventKind::GetVariable(var) => var.name.clone(),
        EventKind::InlineCall(call) => {
            let mut code = format!("({}", call.head);
            for arg in &call.args {
                code.push(' ');
                // Each argument starts a fresh nesting chain.
                code.push_str(&arg.code(ctx.top_level(), arena));
            }
            code.push(')');
            code
        }
        EventKind::Identifier(identifier) => identifier.name.clone(),
        EventKind::RawText(raw) => raw.text.clone(),
        EventKind::Container(container) => container_code(arena, container, ctx),
    }
}

fn join_codes(arena: &Arena, list: &ListData, ctx: RenderContext) -> String {
    list.events
        .iter()
        .map(|&child| event_code(arena, child, ctx))
        .collect::<Vec<_>>()
        .join(" ")
}

fn note_code(note: &Note) -> String {
    let mut code = format!("{}{}", note.pitch, note.duration);
    if let Some(count) = note.count {
        code.push_str(&format!("*{}", count));
    }
    code
}

fn octave_code(octave: &Octave) -> String {
    if octave.up_or_down > 0 {
        ">".repeat(octave.up_or_down as usize)
    } else if octave.up_or_down < 0 {
        "<".repeat(-octave.up_or_down as usize)
    } else {
        match octave.num {
            Some(num) => format!("o{}", num),
            None => String::new(),
        }
    }
}

fn part_code(part: &Part) -> String {
    let mut code = part.names.join("/");
    if let Some(nickname) = &part.nickname {
        code.push(' ');
        code.push_str(&quote(nickname));
    }
    code.push(':');
    code
}

/// Chord operands are slash-joined, except that generation 2 disallows
/// `/` directly adjacent to an octave-shift token: there a plain space
/// joins the operands instead.
fn chord_code(arena: &Arena, list: &ListData, ctx: RenderContext) -> String {
    let mut code = String::new();
    let mut previous_octave = false;
    for (i, &child) in list.events.iter().enumerate() {
        let is_octave = renders_as_octave(arena, child);
        if i > 0 {
            if ctx.generation.is_v2() && (previous_octave || is_octave) {
                code.push(' ');
            } else {
                code.push('/');
            }
        }
        code.push_str(&event_code(arena, child, ctx));
        previous_octave = is_octave;
    }
    code
}

/// Whether an operand is an octave change with non-empty rendered code.
fn renders_as_octave(arena: &Arena, id: EventId) -> bool {
    match &arena[arena.innermost(id)].kind {
        EventKind::Octave(octave) => !octave_code(octave).is_empty(),
        _ => false,
    }
}

fn cram_code(arena: &Arena, cram: &Cram, ctx: RenderContext) -> String {
    format!("{{{}}}{}", join_codes(arena, &cram.list, ctx), cram.duration)
}

/// Variable definitions end in a newline; the newline is part of the
/// grammar, not formatting.
fn set_variable_code(arena: &Arena, var: &SetVariable, ctx: RenderContext) -> String {
    format!("{} = {}\n", var.name, join_codes(arena, &var.list, ctx))
}

fn container_code(arena: &Arena, container: &Container, ctx: RenderContext) -> String {
    let mut code = event_code(arena, container.event, ctx);
    if !container.labels.is_empty() {
        code.push('\'');
        code.push_str(
            &container
                .labels
                .iter()
                .map(|label| label.code())
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    if container.count != 1 {
        code.push_str(&format!("*{}", container.count));
    }
    code
}

/// Render a standalone value with a fresh context, as inline-call
/// arguments are rendered.
pub fn value_code(arena: &Arena, value: &Value, generation: Generation) -> String {
    value.code(RenderContext::new(generation), arena)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Label, ListData, Octave, Rest};

    fn v1() -> RenderContext {
        RenderContext::new(Generation::V1)
    }

    fn v2() -> RenderContext {
        RenderContext::new(Generation::V2)
    }

    fn append_note(arena: &mut Arena, list: EventId, pitch: &str, duration: &str) -> EventId {
        let ev = arena.alloc(EventKind::Note(Note::new(pitch, duration)));
        let container = arena.wrap(ev);
        arena.append(list, container);
        container
    }

    #[test]
    fn test_note_and_rest() {
        let mut arena = Arena::new();
        let note = arena.alloc(EventKind::Note(Note::new("c+", "4~")));
        assert_eq!(event_code(&arena, note, v2()), "c+4~");
        let counted = arena.alloc(EventKind::Note(Note::new("d", "8").with_count(3)));
        assert_eq!(event_code(&arena, counted, v2()), "d8*3");
        let rest = arena.alloc(EventKind::Rest(Rest {
            duration: "2".into(),
        }));
        assert_eq!(event_code(&arena, rest, v1()), "r2");
    }

    #[test]
    fn test_octave_forms() {
        let mut arena = Arena::new();
        let up = arena.alloc(EventKind::Octave(Octave {
            num: None,
            up_or_down: 2,
        }));
        assert_eq!(event_code(&arena, up, v2()), ">>");
        let down = arena.alloc(EventKind::Octave(Octave::down()));
        assert_eq!(event_code(&arena, down, v2()), "<");
        let abs = arena.alloc(EventKind::Octave(Octave::absolute(4)));
        assert_eq!(event_code(&arena, abs, v1()), "o4");
    }

    #[test]
    fn test_markers_and_voice() {
        let mut arena = Arena::new();
        let marker = arena.alloc(EventKind::Marker(crate::event::Marker {
            name: "verse".into(),
        }));
        assert_eq!(event_code(&arena, marker, v2()), "%verse");
        let at = arena.alloc(EventKind::AtMarker(crate::event::AtMarker {
            name: "verse".into(),
        }));
        assert_eq!(event_code(&arena, at, v2()), "@verse");
        let voice = arena.alloc(EventKind::Voice(crate::event::Voice { num: 2 }));
        assert_eq!(event_code(&arena, voice, v2()), "V2:");
    }

    #[test]
    fn test_part_with_nickname() {
        let mut arena = Arena::new();
        let part = arena.alloc(EventKind::Part(
            Part::new("piano").with_nickname("lead"),
        ));
        assert_eq!(event_code(&arena, part, v2()), "piano \"lead\":");
        let grouped = arena.alloc(EventKind::Part(Part {
            names: vec!["violin".into(), "viola".into()],
            nickname: None,
        }));
        assert_eq!(event_code(&arena, grouped, v2()), "violin/viola:");
    }

    #[test]
    fn test_sequence_brackets() {
        let mut arena = Arena::new();
        let seq = arena.alloc(EventKind::Sequence(ListData::default()));
        append_note(&mut arena, seq, "c", "");
        append_note(&mut arena, seq, "d", "");
        append_note(&mut arena, seq, "e", "");
        assert_eq!(event_code(&arena, seq, v2()), "[c d e]");
    }

    #[test]
    fn test_chord_v1_always_slashes() {
        let mut arena = Arena::new();
        let chord = arena.alloc(EventKind::Chord(ListData::default()));
        append_note(&mut arena, chord, "c", "");
        let oct = arena.alloc(EventKind::Octave(Octave::up()));
        let oct_c = arena.wrap(oct);
        arena.append(chord, oct_c);
        append_note(&mut arena, chord, "e", "");
        assert_eq!(event_code(&arena, chord, v1()), "c/>/e");
    }

    #[test]
    fn test_chord_v2_spaces_around_octaves() {
        let mut arena = Arena::new();
        let chord = arena.alloc(EventKind::Chord(ListData::default()));
        append_note(&mut arena, chord, "c", "");
        let oct = arena.alloc(EventKind::Octave(Octave::up()));
        let oct_c = arena.wrap(oct);
        arena.append(chord, oct_c);
        append_note(&mut arena, chord, "e", "");
        append_note(&mut arena, chord, "g", "");
        assert_eq!(event_code(&arena, chord, v2()), "c > e/g");
    }

    #[test]
    fn test_cram() {
        let mut arena = Arena::new();
        let cram = arena.alloc(EventKind::Cram(Cram {
            duration: "2".into(),
            list: ListData::default(),
        }));
        append_note(&mut arena, cram, "c", "");
        append_note(&mut arena, cram, "d", "");
        assert_eq!(event_code(&arena, cram, v2()), "{c d}2");
    }

    #[test]
    fn test_set_variable_trailing_newline() {
        let mut arena = Arena::new();
        let var = arena.alloc(EventKind::SetVariable(SetVariable {
            name: "riff".into(),
            list: ListData::default(),
        }));
        append_note(&mut arena, var, "c", "");
        append_note(&mut arena, var, "d", "");
        assert_eq!(event_code(&arena, var, v2()), "riff = c d\n");
    }

    #[test]
    fn test_container_suffix_order() {
        let mut arena = Arena::new();
        let note = arena.alloc(EventKind::Note(Note::new("a", "")));
        let container = arena.wrap(note);
        if let EventKind::Container(c) = &mut arena[container].kind {
            c.labels.push(Label::Num(1));
            c.labels.push(Label::Range(2, 3));
            c.count = 2;
        }
        assert_eq!(event_code(&arena, container, v2()), "a'1,2-3*2");
    }

    #[test]
    fn test_inline_call_args_restart_nesting() {
        let mut arena = Arena::new();
        let call = arena.alloc(EventKind::InlineCall(crate::event::InlineCall {
            head: "key-signature".into(),
            args: vec![Value::from(vec![
                Value::symbol("f"),
                Value::symbol("major"),
            ])],
        }));
        assert_eq!(event_code(&arena, call, v1()), "(key-signature [:f :major])");
        assert_eq!(event_code(&arena, call, v2()), "(key-signature '(f major))");
        // Even from a nested context, arguments start a fresh chain.
        assert_eq!(
            event_code(&arena, call, v2().nested()),
            "(key-signature '(f major))"
        );
    }
}
