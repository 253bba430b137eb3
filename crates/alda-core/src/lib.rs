//! Core types for emitting Alda notation
//!
//! This crate provides the foundational pieces shared by any tool that
//! writes Alda code: the output [`Generation`] (Alda 1 vs Alda 2 syntax),
//! the [`RenderContext`] threaded through render calls, and the [`Value`]
//! union covering every primitive that can appear as an inline lisp-call
//! argument.
//!
//! # Examples
//!
//! ```
//! use alda_core::{Generation, RenderContext, Value};
//!
//! let sig = Value::from(vec![Value::symbol("f"), Value::symbol("major")]);
//! assert_eq!(sig.code(RenderContext::new(Generation::V1), &()), "[:f :major]");
//! assert_eq!(sig.code(RenderContext::new(Generation::V2), &()), "'(f major)");
//! ```
//!
//! # Main Components
//!
//! - **Generation**: which of the two incompatible Alda syntaxes to emit
//! - **RenderContext**: per-call render state (generation + nesting)
//! - **Value**: primitive values and event references, with the codec
//!   that turns them into notation tokens
//! - **EventId**: stable handle into a score's event arena

pub mod generation;
pub mod value;

pub use generation::{Generation, RenderContext};
pub use value::{quote, EventId, RenderEvent, Value};
