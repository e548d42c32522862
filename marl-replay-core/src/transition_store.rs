//! Replay buffer of multi-agent transitions.
//!
//! # Key Components
//!
//! - [`TransitionStore`]: the fixed-capacity circular buffer
//! - [`MultiAgentBatch`]: a batch with per-agent data grouped by agent
//! - [`IndexSampler`]: index generation, separated from batch encoding
//! - [`SharedTransitionStore`]: the buffer behind a lock
//!
//! # Examples
//!
//! ```rust
//! use marl_replay_core::{TransitionStore, TransitionStoreConfig};
//!
//! let config = TransitionStoreConfig::default()
//!     .capacity(3)
//!     .agent_num(2)
//!     .seed(42);
//! let mut store = TransitionStore::<u32, u32>::from_config(&config).unwrap();
//!
//! for t in 0..4 {
//!     store.add(t, vec![t, t], 0.0, t + 1, false, vec![true, true]).unwrap();
//! }
//! assert_eq!(store.size(), 3);
//! assert_eq!(store.write_cursor(), 1);
//!
//! let mut ixs = store.make_latest_indices(2).unwrap();
//! ixs.sort();
//! assert_eq!(ixs, vec![0, 2]);
//! ```
mod base;
mod batch;
mod config;
mod sampler;
mod shared;
pub use base::TransitionStore;
pub use batch::{MultiAgentBatch, Transition};
pub use config::TransitionStoreConfig;
pub use sampler::{CursorState, IndexSampler, LatestSampler, UniformSampler};
pub use shared::SharedTransitionStore;
