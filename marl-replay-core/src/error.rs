//! Errors in the library.
use thiserror::Error;

/// Errors raised by [`TransitionStore`](crate::TransitionStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// `capacity` or `agent_num` was zero at construction.
    #[error("Invalid configuration: capacity={capacity}, agent_num={agent_num} (both must be positive)")]
    InvalidConfiguration {
        /// Requested capacity.
        capacity: usize,

        /// Requested number of agents.
        agent_num: usize,
    },

    /// A per-agent sequence passed to `add` does not have `agent_num` elements.
    #[error("Shape mismatch in {field}: expected length {expected}, got {actual}")]
    ShapeMismatch {
        /// Name of the offending sequence (`actions` or `alive`).
        field: &'static str,

        /// Expected length, i.e., `agent_num`.
        expected: usize,

        /// Actual length.
        actual: usize,
    },

    /// Sampling was requested from a store holding no transitions.
    #[error("Cannot sample from an empty buffer")]
    EmptyBuffer,

    /// An index does not address a stored transition.
    #[error("Index {index} out of range for buffer of size {size}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,

        /// Number of stored transitions.
        size: usize,
    },
}
