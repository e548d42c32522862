//! Fixed-capacity circular store of multi-agent transitions.
use super::{
    CursorState, IndexSampler, LatestSampler, MultiAgentBatch, Transition,
    TransitionStoreConfig, UniformSampler,
};
use crate::{ExperienceBufferBase, ReplayBufferBase, ReplayError};
use anyhow::Result;
use log::{debug, trace};
use rand::{rngs::StdRng, SeedableRng};

/// A replay buffer of multi-agent transitions.
///
/// The buffer holds at most `capacity` transitions. Once full, each new
/// transition overwrites the oldest one. Slots are allocated up front and
/// `write_cursor` points to the slot the next transition goes to.
///
/// A batch is made in two stages: an [`IndexSampler`] picks slot indices,
/// then [`encode_batch`](Self::encode_batch) gathers the transitions at
/// those slots. [`sample`](Self::sample) and
/// [`sample_latest`](Self::sample_latest) combine both stages.
///
/// The store has no internal locking. See
/// [`SharedTransitionStore`](super::SharedTransitionStore) to share it
/// between threads.
///
/// # Examples
///
/// ```rust
/// use marl_replay_core::TransitionStore;
///
/// let mut store = TransitionStore::<[f32; 2], u8>::new(2, 100).unwrap();
/// store
///     .add([0.0, 1.0], vec![0, 1], 1.0, [1.0, 1.0], false, vec![true, true])
///     .unwrap();
///
/// let batch = store.sample(4).unwrap();
/// assert_eq!(batch.len(), 4);
/// assert_eq!(batch.actions_by_agent.len(), 2);
/// ```
pub struct TransitionStore<O, A> {
    capacity: usize,
    agent_num: usize,

    /// Slots `[0, size)` hold transitions, the rest are `None`.
    slots: Vec<Option<Transition<O, A>>>,
    size: usize,
    write_cursor: usize,
    rng: StdRng,
}

impl<O, A> TransitionStore<O, A> {
    /// Creates an empty store for `agent_num` agents holding up to `capacity` transitions.
    ///
    /// The random source is seeded from the OS. Use
    /// [`from_config`](Self::from_config) for reproducible sampling.
    pub fn new(agent_num: usize, capacity: usize) -> Result<Self, ReplayError> {
        Self::with_rng(agent_num, capacity, StdRng::from_entropy())
    }

    /// Creates an empty store from a configuration, seeding the random source with `config.seed`.
    pub fn from_config(config: &TransitionStoreConfig) -> Result<Self, ReplayError> {
        Self::with_rng(
            config.agent_num,
            config.capacity,
            StdRng::seed_from_u64(config.seed),
        )
    }

    fn with_rng(agent_num: usize, capacity: usize, rng: StdRng) -> Result<Self, ReplayError> {
        if capacity == 0 || agent_num == 0 {
            return Err(ReplayError::InvalidConfiguration {
                capacity,
                agent_num,
            });
        }

        debug!(
            "Build TransitionStore: capacity={}, agent_num={}",
            capacity, agent_num
        );

        Ok(Self {
            capacity,
            agent_num,
            slots: (0..capacity).map(|_| None).collect(),
            size: 0,
            write_cursor: 0,
            rng,
        })
    }

    /// Returns the number of stored transitions.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Same as [`size`](Self::size).
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no transition has been added yet.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of agents.
    pub fn agent_num(&self) -> usize {
        self.agent_num
    }

    /// Slot where the next transition will be written.
    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    /// Returns the bookkeeping state consumed by [`IndexSampler`]s.
    pub fn cursor_state(&self) -> CursorState {
        CursorState {
            size: self.size,
            capacity: self.capacity,
            write_cursor: self.write_cursor,
        }
    }

    /// Adds a transition.
    ///
    /// The transition goes to slot [`write_cursor`](Self::write_cursor),
    /// overwriting the oldest one once the store is full.
    ///
    /// # Arguments
    ///
    /// * `observation` - Observation at time `t`
    /// * `actions` - One action per agent
    /// * `reward` - Reward shared by all agents
    /// * `next_observation` - Observation at time `t + 1`
    /// * `done` - Whether the episode ended at this step
    /// * `alive` - One liveness flag per agent
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::ShapeMismatch`] if `actions` or `alive` does not
    /// have `agent_num` elements. The store is left untouched in that case.
    pub fn add(
        &mut self,
        observation: O,
        actions: Vec<A>,
        reward: f32,
        next_observation: O,
        done: bool,
        alive: Vec<bool>,
    ) -> Result<(), ReplayError> {
        self.add_transition(Transition {
            observation,
            actions,
            reward,
            next_observation,
            done,
            alive,
        })
    }

    /// Adds a prebuilt [`Transition`]. See [`add`](Self::add).
    pub fn add_transition(&mut self, tr: Transition<O, A>) -> Result<(), ReplayError> {
        self.check_shape("actions", tr.actions.len())?;
        self.check_shape("alive", tr.alive.len())?;

        self.slots[self.write_cursor] = Some(tr);
        trace!("Wrote transition at slot {}", self.write_cursor);

        self.write_cursor = (self.write_cursor + 1) % self.capacity;
        if self.size < self.capacity {
            self.size += 1;
        }

        Ok(())
    }

    #[inline]
    fn check_shape(&self, field: &'static str, actual: usize) -> Result<(), ReplayError> {
        if actual != self.agent_num {
            return Err(ReplayError::ShapeMismatch {
                field,
                expected: self.agent_num,
                actual,
            });
        }
        Ok(())
    }

    /// Returns the transition at slot `ix`.
    pub fn get(&self, ix: usize) -> Result<&Transition<O, A>, ReplayError> {
        let out_of_range = ReplayError::IndexOutOfRange {
            index: ix,
            size: self.size,
        };
        if ix >= self.size {
            return Err(out_of_range);
        }
        self.slots[ix].as_ref().ok_or(out_of_range)
    }

    /// Iterates over the stored transitions in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Transition<O, A>> {
        self.slots[..self.size].iter().flatten()
    }

    /// Draws `batch_size` indices uniformly at random from `[0, size())`, with replacement.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::EmptyBuffer`] if the store is empty.
    pub fn make_uniform_indices(&mut self, batch_size: usize) -> Result<Vec<usize>, ReplayError> {
        self.make_indices(&UniformSampler, batch_size)
    }

    /// Returns the `batch_size` most recently written slots in shuffled order.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Number of indices
    ///
    /// # Returns
    ///
    /// The slots `(write_cursor - 1 - i) mod capacity` for `i` in
    /// `0..batch_size`, shuffled. The window wraps around when `batch_size`
    /// exceeds the capacity, so indices repeat. Before the store is full it
    /// may contain slots never written, which [`encode_batch`](Self::encode_batch)
    /// rejects. See [`LatestSampler`].
    pub fn make_latest_indices(&mut self, batch_size: usize) -> Result<Vec<usize>, ReplayError> {
        self.make_indices(&LatestSampler, batch_size)
    }

    /// Generates indices with an arbitrary [`IndexSampler`].
    pub fn make_indices<S: IndexSampler>(
        &mut self,
        sampler: &S,
        batch_size: usize,
    ) -> Result<Vec<usize>, ReplayError> {
        let cursor = self.cursor_state();
        sampler.make_indices(&cursor, batch_size, &mut self.rng)
    }

    /// Returns the number of stored transitions with `done == true`.
    pub fn num_done_flags(&self) -> usize {
        self.iter().filter(|tr| tr.done).count()
    }

    /// Returns the sum of rewards of the stored transitions.
    pub fn sum_rewards(&self) -> f32 {
        self.iter().map(|tr| tr.reward).sum()
    }
}

impl<O: Clone, A: Clone> TransitionStore<O, A> {
    /// Gathers the transitions at `ixs` into a batch.
    ///
    /// # Arguments
    ///
    /// * `ixs` - Slot indices, possibly repeated
    ///
    /// # Returns
    ///
    /// A [`MultiAgentBatch`] whose sequences follow the order of `ixs`,
    /// repetitions included. Actions and liveness flags are agent-major,
    /// everything else is sample-major.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::IndexOutOfRange`] if any index is not below
    /// [`size`](Self::size). Nothing is built in that case.
    pub fn encode_batch(&self, ixs: &[usize]) -> Result<MultiAgentBatch<O, A>, ReplayError> {
        let trs = ixs
            .iter()
            .map(|&ix| self.get(ix))
            .collect::<Result<Vec<_>, _>>()?;

        let mut batch = MultiAgentBatch::with_capacity(self.agent_num, ixs.len());
        for tr in trs {
            batch.observations.push(tr.observation.clone());
            for (a, act) in tr.actions.iter().enumerate() {
                batch.actions_by_agent[a].push(act.clone());
            }
            batch.rewards.push([tr.reward]);
            batch.next_observations.push(tr.next_observation.clone());
            batch.dones.push([tr.done]);
            for (a, &alive) in tr.alive.iter().enumerate() {
                batch.alive_by_agent[a].push(alive);
            }
        }
        batch.ix_sample.extend_from_slice(ixs);

        Ok(batch)
    }

    /// Samples a batch uniformly at random, with replacement.
    pub fn sample(&mut self, batch_size: usize) -> Result<MultiAgentBatch<O, A>, ReplayError> {
        let ixs = self.make_uniform_indices(batch_size)?;
        self.encode_batch(&ixs)
    }

    /// Samples a batch of the most recently written slots.
    pub fn sample_latest(
        &mut self,
        batch_size: usize,
    ) -> Result<MultiAgentBatch<O, A>, ReplayError> {
        let ixs = self.make_latest_indices(batch_size)?;
        self.encode_batch(&ixs)
    }

    /// Samples a batch with an arbitrary [`IndexSampler`].
    pub fn sample_with<S: IndexSampler>(
        &mut self,
        sampler: &S,
        batch_size: usize,
    ) -> Result<MultiAgentBatch<O, A>, ReplayError> {
        let ixs = self.make_indices(sampler, batch_size)?;
        self.encode_batch(&ixs)
    }
}

impl<O, A> ExperienceBufferBase for TransitionStore<O, A> {
    type Item = Transition<O, A>;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        Ok(self.add_transition(tr)?)
    }

    fn len(&self) -> usize {
        self.size
    }
}

impl<O: Clone, A: Clone> ReplayBufferBase for TransitionStore<O, A> {
    type Config = TransitionStoreConfig;
    type Batch = MultiAgentBatch<O, A>;

    fn build(config: &Self::Config) -> Result<Self> {
        Ok(Self::from_config(config)?)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        Ok(self.sample(size)?)
    }
}
