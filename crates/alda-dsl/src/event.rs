//! The event model: every kind of node a score tree can hold.
//!
//! Events are plain data. Tree structure (parent and container links,
//! child lists) lives in the arena; the payload structs here carry only
//! the semantic fields that serialization and equality care about.

use crate::note;
use alda_core::{EventId, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One semantic unit of notation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// The top-level event list owned by a score.
    Root(ListData),
    Note(Note),
    Rest(Rest),
    Octave(Octave),
    Voice(Voice),
    Marker(Marker),
    AtMarker(AtMarker),
    Part(Part),
    Chord(ListData),
    Sequence(ListData),
    Cram(Cram),
    SetVariable(SetVariable),
    GetVariable(GetVariable),
    InlineCall(InlineCall),
    Identifier(Identifier),
    RawText(RawText),
    Container(Container),
}

/// The kinds of event that carry a list capability, for detach
/// exception filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    Root,
    Chord,
    Sequence,
    Cram,
    SetVariable,
}

impl EventKind {
    pub fn list(&self) -> Option<&ListData> {
        match self {
            EventKind::Root(list)
            | EventKind::Chord(list)
            | EventKind::Sequence(list) => Some(list),
            EventKind::Cram(cram) => Some(&cram.list),
            EventKind::SetVariable(var) => Some(&var.list),
            _ => None,
        }
    }

    pub fn list_mut(&mut self) -> Option<&mut ListData> {
        match self {
            EventKind::Root(list)
            | EventKind::Chord(list)
            | EventKind::Sequence(list) => Some(list),
            EventKind::Cram(cram) => Some(&mut cram.list),
            EventKind::SetVariable(var) => Some(&mut var.list),
            _ => None,
        }
    }

    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            EventKind::Root(_) => Some(ListKind::Root),
            EventKind::Chord(_) => Some(ListKind::Chord),
            EventKind::Sequence(_) => Some(ListKind::Sequence),
            EventKind::Cram(_) => Some(ListKind::Cram),
            EventKind::SetVariable(_) => Some(ListKind::SetVariable),
            _ => None,
        }
    }
}

/// Ordered child list plus the variable names declared at this scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListData {
    pub events: Vec<EventId>,
    pub variables: HashSet<String>,
}

/// A pitched note.
///
/// `pitch` is the letter plus accidental markers (`+` sharp, `-` flat,
/// `_` natural); `duration` is kept as a token and may end in `~` for a
/// slur. `count` is an optional repetition carried on the note itself,
/// distinct from its container's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: String,
    pub duration: String,
    pub count: Option<u32>,
}

impl Note {
    pub fn new(pitch: impl Into<String>, duration: impl Into<String>) -> Self {
        Note {
            pitch: pitch.into(),
            duration: duration.into(),
            count: None,
        }
    }

    /// Build a note from its fused builder token, e.g. `c`, `d4`, `e!`,
    /// `f2__` (see [`note::parse_suffix`] for the tail grammar).
    pub fn from_token(letter: char, suffix: &str) -> Self {
        let (accidentals, duration) = note::parse_suffix(suffix);
        Note {
            pitch: format!("{}{}", letter, accidentals),
            duration,
            count: None,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub duration: String,
}

/// An octave change.
///
/// `up_or_down == 0` is an absolute jump to `num`; positive N renders as
/// N `>` tokens, negative as `<` tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    pub num: Option<i32>,
    pub up_or_down: i32,
}

impl Octave {
    pub fn up() -> Self {
        Octave {
            num: None,
            up_or_down: 1,
        }
    }

    pub fn down() -> Self {
        Octave {
            num: None,
            up_or_down: -1,
        }
    }

    pub fn absolute(num: i32) -> Self {
        Octave {
            num: Some(num),
            up_or_down: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub num: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtMarker {
    pub name: String,
}

/// An instrument part: one or more instrument names, slash-joined, with
/// an optional quoted nickname.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub names: Vec<String>,
    pub nickname: Option<String>,
}

impl Part {
    pub fn new(name: impl Into<String>) -> Self {
        Part {
            names: vec![name.into()],
            nickname: None,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

/// A cram: braced events squeezed into one duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cram {
    pub duration: String,
    pub list: ListData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVariable {
    pub name: String,
    pub list: ListData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetVariable {
    pub name: String,
}

/// An inline lisp call: an opaque island of attribute-setting code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineCall {
    pub head: String,
    pub args: Vec<Value>,
}

/// A bare lisp symbol appearing as an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
}

/// Verbatim notation text, for anything the builder rules cannot express.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawText {
    pub text: String,
}

/// An alternate-ending label on a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Num(u32),
    Range(u32, u32),
}

impl Label {
    pub fn code(self) -> String {
        match self {
            Label::Num(n) => n.to_string(),
            Label::Range(first, last) => format!("{}-{}", first, last),
        }
    }
}

/// Wrapper giving one event a repetition count and ending labels.
///
/// `count` composes multiplicatively across repeated `repeat` calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub event: EventId,
    pub count: u32,
    pub labels: Vec<Label>,
}

impl Container {
    pub fn new(event: EventId) -> Self {
        Container {
            event,
            count: 1,
            labels: Vec::new(),
        }
    }

    pub fn is_plain(&self) -> bool {
        self.count == 1 && self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_from_token() {
        let n = Note::from_token('c', "4!");
        assert_eq!(n.pitch, "c+");
        assert_eq!(n.duration, "4");
        assert_eq!(n.count, None);
    }

    #[test]
    fn test_octave_constructors() {
        assert_eq!(Octave::up().up_or_down, 1);
        assert_eq!(Octave::down().up_or_down, -1);
        let abs = Octave::absolute(4);
        assert_eq!(abs.num, Some(4));
        assert_eq!(abs.up_or_down, 0);
    }

    #[test]
    fn test_label_code() {
        assert_eq!(Label::Num(2).code(), "2");
        assert_eq!(Label::Range(1, 3).code(), "1-3");
    }

    #[test]
    fn test_container_is_plain() {
        let mut c = Container::new(EventId::new(0));
        assert!(c.is_plain());
        c.count = 2;
        assert!(!c.is_plain());
    }

    #[test]
    fn test_list_kind() {
        let kind = EventKind::Chord(ListData::default());
        assert_eq!(kind.list_kind(), Some(ListKind::Chord));
        let leaf = EventKind::GetVariable(GetVariable {
            name: "riff".into(),
        });
        assert_eq!(leaf.list_kind(), None);
        assert!(leaf.list().is_none());
    }
}
