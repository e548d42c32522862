//! Transitions and the batches encoded from them.

/// One recorded environment step of all agents.
///
/// `actions` and `alive` hold one element per agent, in agent order.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O, A> {
    /// Observation at time `t`.
    pub observation: O,

    /// Actions taken by the agents at time `t`.
    pub actions: Vec<A>,

    /// Reward shared by all agents.
    pub reward: f32,

    /// Observation at time `t+1`.
    pub next_observation: O,

    /// `true` if the episode terminated at this step.
    pub done: bool,

    /// Liveness of the agents at time `t`.
    pub alive: Vec<bool>,
}

/// A batch of transitions for training.
///
/// `actions_by_agent` and `alive_by_agent` are agent-major:
/// `actions_by_agent[a][i]` is the action of agent `a` in the `i`-th sample.
/// The other fields are sample-major and follow the order of `ix_sample`.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiAgentBatch<O, A> {
    /// Observations.
    pub observations: Vec<O>,

    /// Actions, grouped by agent.
    pub actions_by_agent: Vec<Vec<A>>,

    /// Rewards, one length-1 row per sample.
    pub rewards: Vec<[f32; 1]>,

    /// Next observations.
    pub next_observations: Vec<O>,

    /// Done flags, one length-1 row per sample.
    pub dones: Vec<[bool; 1]>,

    /// Liveness flags, grouped by agent.
    pub alive_by_agent: Vec<Vec<bool>>,

    /// Indices of the samples in the buffer.
    pub ix_sample: Vec<usize>,
}

impl<O, A> MultiAgentBatch<O, A> {
    /// Creates an empty batch with room for `batch_size` samples of `agent_num` agents.
    pub(super) fn with_capacity(agent_num: usize, batch_size: usize) -> Self {
        Self {
            observations: Vec::with_capacity(batch_size),
            actions_by_agent: (0..agent_num)
                .map(|_| Vec::with_capacity(batch_size))
                .collect(),
            rewards: Vec::with_capacity(batch_size),
            next_observations: Vec::with_capacity(batch_size),
            dones: Vec::with_capacity(batch_size),
            alive_by_agent: (0..agent_num)
                .map(|_| Vec::with_capacity(batch_size))
                .collect(),
            ix_sample: Vec::with_capacity(batch_size),
        }
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.ix_sample.len()
    }

    /// Returns `true` if the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.ix_sample.is_empty()
    }

    /// Number of agents.
    pub fn agent_num(&self) -> usize {
        self.actions_by_agent.len()
    }

    /// Unpacks the data
    /// `(o_t, a_t, r_t, o_t+1, done_t, alive_t, ix_sample)`.
    #[allow(clippy::type_complexity)]
    pub fn unpack(
        self,
    ) -> (
        Vec<O>,
        Vec<Vec<A>>,
        Vec<[f32; 1]>,
        Vec<O>,
        Vec<[bool; 1]>,
        Vec<Vec<bool>>,
        Vec<usize>,
    ) {
        (
            self.observations,
            self.actions_by_agent,
            self.rewards,
            self.next_observations,
            self.dones,
            self.alive_by_agent,
            self.ix_sample,
        )
    }
}
