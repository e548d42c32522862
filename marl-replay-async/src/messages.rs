use crossbeam_channel::Sender;
use marl_replay_core::{MultiAgentBatch, ReplayError, Transition};

/// Reply to a request carrying a batch.
pub type BatchReply<O, A> = Sender<Result<MultiAgentBatch<O, A>, ReplayError>>;

/// Transitions pushed from a [`TransitionProxy`](crate::TransitionProxy) to the store server.
pub struct PushedItemMessage<T> {
    /// Id of the sender.
    pub id: usize,

    /// Pushed items.
    pub pushed_items: Vec<T>,
}

/// Transitions of a multi-agent buffer.
pub type TransitionMessage<O, A> = PushedItemMessage<Transition<O, A>>;

/// Requests that the store server receives.
pub enum StoreMessage<O, A> {
    /// Call [`TransitionStore::size`](marl_replay_core::TransitionStore::size).
    Len(Sender<usize>),

    /// Call [`TransitionStore::sample`](marl_replay_core::TransitionStore::sample).
    Sample(usize, BatchReply<O, A>),

    /// Call [`TransitionStore::sample_latest`](marl_replay_core::TransitionStore::sample_latest).
    Latest(usize, BatchReply<O, A>),

    /// Call [`TransitionStore::encode_batch`](marl_replay_core::TransitionStore::encode_batch).
    EncodeBatch(Vec<usize>, BatchReply<O, A>),

    /// Stop the server.
    Stop,
}
