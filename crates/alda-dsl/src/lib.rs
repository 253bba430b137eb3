//! Builder DSL for Alda scores
//!
//! This crate constructs Alda scores from imperative builder calls and
//! serializes the resulting event tree to notation text. Call names carry
//! a terse micro-syntax — `c4!` is a sharpened quarter note, `piano_`
//! opens a part, `riff__` defines a variable — and single-argument call
//! chains fold into flat sequences the way juxtaposed words do in the
//! notation itself.
//!
//! # Examples
//!
//! ```
//! use alda_dsl::{Generation, Score, Value};
//!
//! let score = Score::build(|b| {
//!     let phrase = b.chain(&["c", "d", "e"])?;
//!     b.call("piano_", vec![Value::Event(phrase)])?;
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(score.render(Generation::V2), "piano: [c d e]");
//! ```
//!
//! # Main Components
//!
//! - [`Score`]: owns the event arena and the top-level event list
//! - [`Builder`]: the call dispatcher; one instance per event-list scope
//! - [`formatter`]: renders events to notation text for either
//!   [`Generation`]
//! - [`BuildError`]: ordering violations and unhandled calls

pub mod arena;
pub mod builder;
pub mod detach;
pub mod error;
pub mod event;
pub mod formatter;
pub mod note;
pub mod score;


pub use alda_core::{EventId, Generation, RenderContext, Value};
pub use arena::{Arena, EventNode};
pub use builder::{Block, Builder};
pub use detach::{detach, detach_event};
pub use error::{BuildError, Result};
pub use event::{EventKind, Label, ListKind};
pub use formatter::event_code;
pub use score::Score;
