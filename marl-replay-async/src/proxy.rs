use crate::{AsyncReplayError, PushedItemMessage};
use anyhow::Result;
use crossbeam_channel::Sender;
use log::trace;
use marl_replay_core::{ExperienceBufferBase, Transition};

/// Producer-side handle of a [`StoreServer`](crate::StoreServer).
///
/// Transitions are buffered and sent to the server `n_buffer` at a time.
/// Call [`flush`](Self::flush) to send a partially filled buffer.
pub struct TransitionProxy<O, A> {
    id: usize,

    /// Sender of [`PushedItemMessage`].
    sender: Sender<PushedItemMessage<Transition<O, A>>>,

    /// Number of transitions buffered until sent to the server.
    n_buffer: usize,

    buffer: Vec<Transition<O, A>>,
}

impl<O, A> TransitionProxy<O, A> {
    /// Creates a proxy sending transitions with `sender`.
    ///
    /// `n_buffer` is clamped to at least 1.
    pub fn new(
        id: usize,
        n_buffer: usize,
        sender: Sender<PushedItemMessage<Transition<O, A>>>,
    ) -> Self {
        let n_buffer = n_buffer.max(1);
        Self {
            id,
            sender,
            n_buffer,
            buffer: Vec::with_capacity(n_buffer),
        }
    }

    /// Id of the proxy, attached to every message it sends.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Sends buffered transitions, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AsyncReplayError::SendMsgForPush`] if the channel is full or
    /// closed. The transitions stay buffered in that case, so `flush` can be
    /// retried.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut buffer = Vec::with_capacity(self.n_buffer);
        std::mem::swap(&mut self.buffer, &mut buffer);
        trace!("Proxy {} sends {} transitions", self.id, buffer.len());

        let msg = PushedItemMessage {
            id: self.id,
            pushed_items: buffer,
        };

        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(e) => {
                let mut pushed_items = e.into_inner().pushed_items;
                std::mem::swap(&mut self.buffer, &mut pushed_items);
                Err(AsyncReplayError::SendMsgForPush.into())
            }
        }
    }
}

impl<O, A> ExperienceBufferBase for TransitionProxy<O, A> {
    type Item = Transition<O, A>;

    /// Buffers `tr` and sends the buffer once it holds `n_buffer` transitions.
    ///
    /// If sending fails, `tr` and the rest of the buffer are kept for a later
    /// [`flush`](TransitionProxy::flush).
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.buffer.push(tr);
        if self.buffer.len() >= self.n_buffer {
            self.flush()?;
        }
        Ok(())
    }

    /// Number of transitions waiting to be sent.
    fn len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn tr(t: u32) -> Transition<u32, u8> {
        Transition {
            observation: t,
            actions: vec![0],
            reward: 0.0,
            next_observation: t + 1,
            done: false,
            alive: vec![true],
        }
    }

    #[test]
    fn test_proxy_sends_full_buffers() -> Result<()> {
        let (s, r) = bounded(10);
        let mut proxy = TransitionProxy::new(3, 2, s);

        proxy.push(tr(0))?;
        assert!(r.try_recv().is_err());
        proxy.push(tr(1))?;
        proxy.push(tr(2))?;

        let msg = r.try_recv()?;
        assert_eq!(msg.id, 3);
        assert_eq!(
            msg.pushed_items.iter().map(|t| t.observation).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(proxy.len(), 1);

        proxy.flush()?;
        assert_eq!(r.try_recv()?.pushed_items.len(), 1);
        assert_eq!(proxy.len(), 0);
        Ok(())
    }

    #[test]
    fn test_proxy_fails_on_full_channel() {
        let (s, _r) = bounded(1);
        let mut proxy = TransitionProxy::new(0, 1, s);

        proxy.push(tr(0)).unwrap();
        let err = proxy.push(tr(1)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AsyncReplayError>(),
            Some(&AsyncReplayError::SendMsgForPush)
        );
    }

    #[test]
    fn test_proxy_keeps_transitions_after_failed_send() -> Result<()> {
        let (s, r) = bounded(1);
        let mut proxy = TransitionProxy::new(0, 3, s);

        // The third push fills the channel, the sixth finds it full.
        for t in 0..5 {
            proxy.push(tr(t))?;
        }
        let err = proxy.push(tr(5)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AsyncReplayError>(),
            Some(&AsyncReplayError::SendMsgForPush)
        );
        assert_eq!(proxy.len(), 3);

        let first = r.try_recv()?;
        assert_eq!(first.pushed_items.len(), 3);

        proxy.flush()?;
        assert_eq!(proxy.len(), 0);
        assert_eq!(
            r.try_recv()?
                .pushed_items
                .iter()
                .map(|t| t.observation)
                .collect::<Vec<_>>(),
            vec![3, 4, 5]
        );
        Ok(())
    }
}
