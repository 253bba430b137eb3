use alda_core::EventId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors raised while building a score.
///
/// Construction is plain sequential mutation, so there is no recovery
/// protocol: whatever was appended before the failure stays in the tree
/// and remains inspectable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// A restructuring operation expected an event to be the most
    /// recently appended sibling, and it was not. Carries both sides,
    /// with their rendered code for diagnostics.
    #[error("out-of-order event: expected {expected_code} ({expected}), found {got_code} ({got})")]
    OrderError {
        expected: EventId,
        got: EventId,
        expected_code: String,
        got_code: String,
    },

    /// A builder call matched none of the dispatch rules.
    #[error("unhandled builder call `{name}`")]
    UnhandledCall { name: String },

    /// A cram call (`t…`) was made without a block.
    #[error("builder call `{name}` requires a block")]
    BlockRequired { name: String },

    /// A part operation was applied to something that is not a part.
    #[error("expected a part, found {code}")]
    NotAPart { code: String },
}
