#![warn(missing_docs)]
//! Experience replay for multi-agent reinforcement learning.
//!
//! The buffer keeps the most recent transitions of all agents and hands out
//! batches in which per-agent data is grouped by agent.
mod error;
pub use error::ReplayError;

mod base;
pub use base::{ExperienceBufferBase, ReplayBufferBase};

pub mod transition_store;
pub use transition_store::{
    CursorState, IndexSampler, LatestSampler, MultiAgentBatch, SharedTransitionStore,
    Transition, TransitionStore, TransitionStoreConfig, UniformSampler,
};
