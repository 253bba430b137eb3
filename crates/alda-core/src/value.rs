use crate::generation::{Generation, RenderContext};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to an event in a score's arena.
///
/// Ids are only meaningful for the arena that issued them; navigating a
/// foreign arena with one is a caller bug and panics on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(usize);

impl EventId {
    pub fn new(index: usize) -> Self {
        EventId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Renders the event side of a [`Value`].
///
/// The value codec below is total over primitives; event arguments are
/// resolved through this trait so the codec stays independent of any
/// particular tree representation.
pub trait RenderEvent {
    fn event_code(&self, id: EventId, ctx: RenderContext) -> String;
}

/// Renderer for values known to contain no events.
impl RenderEvent for () {
    fn event_code(&self, _id: EventId, _ctx: RenderContext) -> String {
        String::new()
    }
}

/// A value that can appear as an inline-call argument or collection
/// element in a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Number value; integral floats print without a decimal point.
    Number(f64),
    /// Text, rendered as a quoted and escaped literal.
    Str(String),
    /// Lisp symbol; generation-sensitive rendering.
    Symbol(String),
    Bool(bool),
    Nil,
    /// Inclusive range, rendered `first-last`.
    Range(i64, i64),
    /// Ordered collection; generation-sensitive rendering.
    List(Vec<Value>),
    /// Keyed collection with insertion order preserved.
    Map(Vec<(Value, Value)>),
    /// A score event, referenced by id.
    Event(EventId),
}

impl Value {
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn as_event(&self) -> Option<EventId> {
        match self {
            Value::Event(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Value::Event(_))
    }

    /// Render this value as Alda notation.
    ///
    /// The nesting flag in `ctx` decides generation-2 quoting: the
    /// outermost collection or symbol gets a leading `'`, anything already
    /// inside a collection is written bare.
    pub fn code<R: RenderEvent>(&self, ctx: RenderContext, events: &R) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Str(s) => quote(s),
            Value::Bool(b) => b.to_string(),
            Value::Nil => "nil".to_string(),
            Value::Range(first, last) => format!("{}-{}", first, last),
            Value::Symbol(name) => match ctx.generation {
                Generation::V1 => format!(":{}", name),
                Generation::V2 if ctx.nested => name.clone(),
                Generation::V2 => format!("'{}", name),
            },
            Value::List(items) => {
                let body = items
                    .iter()
                    .map(|item| item.code(ctx.nested(), events))
                    .collect::<Vec<_>>()
                    .join(" ");
                wrap_collection(ctx, '[', ']', &body)
            }
            Value::Map(pairs) => {
                let body = pairs
                    .iter()
                    .flat_map(|(k, v)| [k, v])
                    .map(|item| item.code(ctx.nested(), events))
                    .collect::<Vec<_>>()
                    .join(" ");
                wrap_collection(ctx, '{', '}', &body)
            }
            Value::Event(id) => events.event_code(*id, ctx),
        }
    }
}

/// Generation-1 keeps its literal delimiters; generation-2 turns every
/// collection into a lisp list, quoted only at the outermost nesting.
fn wrap_collection(ctx: RenderContext, open: char, close: char, body: &str) -> String {
    match ctx.generation {
        Generation::V1 => format!("{}{}{}", open, body, close),
        Generation::V2 if ctx.nested => format!("({})", body),
        Generation::V2 => format!("'({})", body),
    }
}

/// Quote and escape a text literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<EventId> for Value {
    fn from(id: EventId) -> Self {
        Value::Event(id)
    }
}
