use crate::{AsyncReplayError, BatchReply, StoreMessage};
use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, Sender};
use marl_replay_core::{MultiAgentBatch, ReplayError};

/// Learner-side handle of a [`StoreServer`](crate::StoreServer).
///
/// Each call sends a request and blocks until the server replies. Errors of
/// the buffer itself, e.g., [`ReplayError::EmptyBuffer`], are returned as-is
/// and can be recovered with `downcast_ref`.
pub struct StoreClient<O, A> {
    sender: Sender<StoreMessage<O, A>>,
}

impl<O, A> Clone for StoreClient<O, A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<O, A> StoreClient<O, A> {
    pub(crate) fn new(sender: Sender<StoreMessage<O, A>>) -> Self {
        Self { sender }
    }

    fn request<T>(&self, msg: StoreMessage<O, A>, reply: Receiver<T>) -> Result<T> {
        self.sender
            .send(msg)
            .map_err(|_| AsyncReplayError::Disconnected)?;
        Ok(reply.recv().map_err(|_| AsyncReplayError::Disconnected)?)
    }

    fn request_batch(
        &self,
        msg: impl FnOnce(BatchReply<O, A>) -> StoreMessage<O, A>,
    ) -> Result<MultiAgentBatch<O, A>> {
        let (s, r) = bounded::<Result<MultiAgentBatch<O, A>, ReplayError>>(1);
        Ok(self.request(msg(s), r)??)
    }

    /// Returns the number of stored transitions.
    pub fn len(&self) -> Result<usize> {
        let (s, r) = bounded(1);
        self.request(StoreMessage::Len(s), r)
    }

    /// Samples a batch uniformly at random.
    pub fn sample(&self, batch_size: usize) -> Result<MultiAgentBatch<O, A>> {
        self.request_batch(|s| StoreMessage::Sample(batch_size, s))
    }

    /// Samples a batch of the most recently written slots.
    pub fn latest(&self, batch_size: usize) -> Result<MultiAgentBatch<O, A>> {
        self.request_batch(|s| StoreMessage::Latest(batch_size, s))
    }

    /// Encodes a batch from the given slot indices.
    pub fn encode_batch(&self, ixs: Vec<usize>) -> Result<MultiAgentBatch<O, A>> {
        self.request_batch(|s| StoreMessage::EncodeBatch(ixs, s))
    }
}
