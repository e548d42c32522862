//! A [`TransitionStore`] shared between threads.
use super::{IndexSampler, MultiAgentBatch, Transition, TransitionStore};
use crate::ReplayError;
use std::sync::{Arc, Mutex, MutexGuard};

/// A cloneable handle to a [`TransitionStore`] behind a single lock.
///
/// The lock is held for the whole of each call, so a producer thread calling
/// [`add`](Self::add) and a learner thread calling [`sample`](Self::sample)
/// never observe a half-written store.
pub struct SharedTransitionStore<O, A> {
    inner: Arc<Mutex<TransitionStore<O, A>>>,
}

impl<O, A> Clone for SharedTransitionStore<O, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O, A> From<TransitionStore<O, A>> for SharedTransitionStore<O, A> {
    fn from(store: TransitionStore<O, A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }
}

impl<O, A> SharedTransitionStore<O, A> {
    /// Creates an empty shared store. See [`TransitionStore::new`].
    pub fn new(agent_num: usize, capacity: usize) -> Result<Self, ReplayError> {
        Ok(TransitionStore::new(agent_num, capacity)?.into())
    }

    fn lock(&self) -> MutexGuard<'_, TransitionStore<O, A>> {
        // Store operations either complete or fail before mutating, so the
        // store is consistent even if another holder panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with<T>(&self, f: impl FnOnce(&mut TransitionStore<O, A>) -> T) -> T {
        f(&mut self.lock())
    }

    /// See [`TransitionStore::size`].
    pub fn size(&self) -> usize {
        self.lock().size()
    }

    /// See [`TransitionStore::add`].
    pub fn add(
        &self,
        observation: O,
        actions: Vec<A>,
        reward: f32,
        next_observation: O,
        done: bool,
        alive: Vec<bool>,
    ) -> Result<(), ReplayError> {
        self.lock()
            .add(observation, actions, reward, next_observation, done, alive)
    }

    /// See [`TransitionStore::add_transition`].
    pub fn add_transition(&self, tr: Transition<O, A>) -> Result<(), ReplayError> {
        self.lock().add_transition(tr)
    }

    /// See [`TransitionStore::make_uniform_indices`].
    pub fn make_uniform_indices(&self, batch_size: usize) -> Result<Vec<usize>, ReplayError> {
        self.lock().make_uniform_indices(batch_size)
    }

    /// See [`TransitionStore::make_latest_indices`].
    pub fn make_latest_indices(&self, batch_size: usize) -> Result<Vec<usize>, ReplayError> {
        self.lock().make_latest_indices(batch_size)
    }
}

impl<O: Clone, A: Clone> SharedTransitionStore<O, A> {
    /// See [`TransitionStore::encode_batch`].
    pub fn encode_batch(&self, ixs: &[usize]) -> Result<MultiAgentBatch<O, A>, ReplayError> {
        self.lock().encode_batch(ixs)
    }

    /// See [`TransitionStore::sample`].
    pub fn sample(&self, batch_size: usize) -> Result<MultiAgentBatch<O, A>, ReplayError> {
        self.lock().sample(batch_size)
    }

    /// See [`TransitionStore::sample_latest`].
    pub fn sample_latest(&self, batch_size: usize) -> Result<MultiAgentBatch<O, A>, ReplayError> {
        self.lock().sample_latest(batch_size)
    }

    /// See [`TransitionStore::sample_with`].
    pub fn sample_with<S: IndexSampler>(
        &self,
        sampler: &S,
        batch_size: usize,
    ) -> Result<MultiAgentBatch<O, A>, ReplayError> {
        self.lock().sample_with(sampler, batch_size)
    }
}
