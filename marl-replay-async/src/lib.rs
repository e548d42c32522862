#![warn(missing_docs)]
//! Replay buffer server for multi-agent reinforcement learning.
//!
//! A [`StoreServer`] owns a [`TransitionStore`](marl_replay_core::TransitionStore)
//! on its own thread. Rollout threads push transitions through
//! [`TransitionProxy`]s, learners sample through [`StoreClient`]s, and all
//! of them talk to the server over channels.
//!
//! # Messages
//! * From producers ([`TransitionProxy`]) to the server
//!   - [`PushedItemMessage`]
//! * From learners ([`StoreClient`]) to the server
//!   - [`StoreMessage`]
mod client;
mod config;
mod error;
mod messages;
mod proxy;
mod server;
pub use client::StoreClient;
pub use config::StoreServerConfig;
pub use error::AsyncReplayError;
pub use messages::{BatchReply, PushedItemMessage, StoreMessage, TransitionMessage};
pub use proxy::TransitionProxy;
pub use server::StoreServer;
