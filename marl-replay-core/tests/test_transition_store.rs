use anyhow::Result;
use marl_replay_core::{
    ExperienceBufferBase, IndexSampler, ReplayBufferBase, ReplayError, Transition,
    TransitionStore, TransitionStoreConfig,
};
use test_log::test;

type Obs = Vec<f32>;
type Store = TransitionStore<Obs, u8>;

const AGENT_NUM: usize = 3;

fn transition(t: usize) -> Transition<Obs, u8> {
    Transition {
        observation: vec![t as f32, 0.0],
        actions: (0..AGENT_NUM).map(|a| (t * 10 + a) as u8).collect(),
        reward: t as f32 * 0.5,
        next_observation: vec![t as f32 + 1.0, 0.0],
        done: t % 4 == 3,
        alive: (0..AGENT_NUM).map(|a| (t + a) % 2 == 0).collect(),
    }
}

fn store(capacity: usize, seed: u64) -> Store {
    let config = TransitionStoreConfig::default()
        .capacity(capacity)
        .agent_num(AGENT_NUM)
        .seed(seed);
    Store::from_config(&config).unwrap()
}

#[test]
fn test_size_never_exceeds_capacity() {
    let mut store = store(7, 0);
    for t in 0..50 {
        store.add_transition(transition(t)).unwrap();
        assert_eq!(store.size(), (t + 1).min(7));
        assert_eq!(store.write_cursor(), (t + 1) % 7);
    }
}

#[test]
fn test_keeps_most_recent_transitions() {
    let capacity = 5;
    for k in 0..12 {
        let mut store = store(capacity, 0);
        let n = capacity + k;
        for t in 0..n {
            store.add_transition(transition(t)).unwrap();
        }

        // The last added transition sits just before the cursor.
        let last = (n - 1) % capacity;
        assert_eq!(store.get(last).unwrap(), &transition(n - 1));

        // The oldest survivor sits at the cursor, about to be overwritten.
        let oldest = store.write_cursor();
        assert_eq!(store.get(oldest).unwrap(), &transition(n - capacity));

        let mut stored = store
            .iter()
            .map(|tr| tr.observation[0] as usize)
            .collect::<Vec<_>>();
        stored.sort_unstable();
        assert_eq!(stored, (n - capacity..n).collect::<Vec<_>>());
    }
}

#[test]
fn test_capacity_three_two_agents() -> Result<()> {
    let config = TransitionStoreConfig::default().capacity(3).agent_num(2);
    let mut store = TransitionStore::<&str, u8>::build(&config)?;
    for (t, &name) in ["T0", "T1", "T2", "T3"].iter().enumerate() {
        store.add(name, vec![t as u8, t as u8], 0.0, name, false, vec![true, true])?;
    }

    assert_eq!(store.size(), 3);
    assert_eq!(store.write_cursor(), 1);
    let mut names = store.iter().map(|tr| tr.observation).collect::<Vec<_>>();
    names.sort_unstable();
    assert_eq!(names, vec!["T1", "T2", "T3"]);

    let ixs = store.make_latest_indices(2)?;
    assert!(ixs == vec![0, 2] || ixs == vec![2, 0]);
    let batch = store.encode_batch(&ixs)?;
    let mut latest = batch.observations.clone();
    latest.sort_unstable();
    assert_eq!(latest, vec!["T2", "T3"]);
    Ok(())
}

#[test]
fn test_capacity_one_overwrites_single_slot() -> Result<()> {
    let mut store = store(1, 0);
    for t in 0..5 {
        store.add_transition(transition(t))?;
        assert_eq!(store.size(), 1);
        assert_eq!(store.write_cursor(), 0);
        assert_eq!(store.get(0)?, &transition(t));
    }

    let ixs = store.make_latest_indices(4)?;
    assert_eq!(ixs, vec![0, 0, 0, 0]);

    let batch = store.encode_batch(&ixs)?;
    assert_eq!(batch.observations, vec![transition(4).observation; 4]);
    assert!(batch.actions_by_agent.iter().all(|row| row.len() == 4));
    assert_eq!(store.make_uniform_indices(3)?, vec![0, 0, 0]);
    Ok(())
}

#[test]
fn test_uniform_indices_converge_to_uniform() {
    let capacity = 10;
    let mut store = store(capacity, 1234);
    for t in 0..capacity {
        store.add_transition(transition(t)).unwrap();
    }

    let n = 100_000;
    let ixs = store.make_uniform_indices(n).unwrap();
    assert_eq!(ixs.len(), n);

    let mut counts = vec![0usize; capacity];
    for ix in ixs {
        counts[ix] += 1;
    }
    let expected = (n / capacity) as f64;
    for c in counts {
        assert!(((c as f64) - expected).abs() / expected < 0.05, "{}", c);
    }
}

#[test]
fn test_uniform_indices_cover_partial_buffer_only() {
    let mut store = store(100, 5);
    for t in 0..3 {
        store.add_transition(transition(t)).unwrap();
    }
    let ixs = store.make_uniform_indices(500).unwrap();
    assert!(ixs.iter().all(|&ix| ix < 3));
    // Draws are with replacement.
    assert!(ixs.iter().filter(|&&ix| ix == 0).count() > 1);
}

#[test]
fn test_encode_batch_order_and_transposition() {
    let mut store = store(16, 0);
    for t in 0..20 {
        store.add_transition(transition(t)).unwrap();
    }

    let ixs = store.make_uniform_indices(64).unwrap();
    let batch = store.encode_batch(&ixs).unwrap();
    assert_eq!(batch.len(), 64);
    assert_eq!(batch.agent_num(), AGENT_NUM);

    for (i, &ix) in ixs.iter().enumerate() {
        let tr = store.get(ix).unwrap();
        assert_eq!(batch.observations[i], tr.observation);
        assert_eq!(batch.next_observations[i], tr.next_observation);
        assert_eq!(batch.rewards[i], [tr.reward]);
        assert_eq!(batch.dones[i], [tr.done]);
        for a in 0..AGENT_NUM {
            assert_eq!(batch.actions_by_agent[a][i], tr.actions[a]);
            assert_eq!(batch.alive_by_agent[a][i], tr.alive[a]);
        }
    }
}

#[test]
fn test_encode_batch_is_idempotent() {
    let mut store = store(8, 0);
    for t in 0..11 {
        store.add_transition(transition(t)).unwrap();
    }
    let ixs = vec![7, 7, 0, 3, 5];
    assert_eq!(
        store.encode_batch(&ixs).unwrap(),
        store.encode_batch(&ixs).unwrap()
    );
}

#[test]
fn test_latest_before_full_rejected_by_encoder() {
    let mut store = store(10, 0);
    for t in 0..4 {
        store.add_transition(transition(t)).unwrap();
    }

    // Slots 0..4 are the whole history.
    let batch = store.sample_latest(4).unwrap();
    let mut obs = batch
        .observations
        .iter()
        .map(|o| o[0] as usize)
        .collect::<Vec<_>>();
    obs.sort_unstable();
    assert_eq!(obs, vec![0, 1, 2, 3]);

    // A wider window reaches slot 9, which was never written.
    let ixs = store.make_latest_indices(5).unwrap();
    assert!(ixs.contains(&9));
    assert_eq!(
        store.encode_batch(&ixs).err(),
        Some(ReplayError::IndexOutOfRange { index: 9, size: 4 })
    );
}

#[test]
fn test_sample_empty_buffer_fails() {
    let mut store = store(4, 0);
    assert_eq!(store.sample(1).err(), Some(ReplayError::EmptyBuffer));
    assert_eq!(
        store.make_uniform_indices(1).err(),
        Some(ReplayError::EmptyBuffer)
    );

    let err = store.batch(1).err().unwrap();
    assert_eq!(
        err.downcast_ref::<ReplayError>(),
        Some(&ReplayError::EmptyBuffer)
    );
}

#[test]
fn test_trait_interfaces() -> Result<()> {
    let config = TransitionStoreConfig::default().capacity(4).agent_num(AGENT_NUM);
    let mut store = Store::build(&config)?;
    for t in 0..6 {
        ExperienceBufferBase::push(&mut store, transition(t))?;
    }
    assert_eq!(ExperienceBufferBase::len(&store), 4);

    let batch = store.batch(10)?;
    assert_eq!(batch.len(), 10);

    let mut bad = transition(0);
    bad.alive.pop();
    let err = ExperienceBufferBase::push(&mut store, bad).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReplayError>(),
        Some(ReplayError::ShapeMismatch { field: "alive", .. })
    ));

    let bad_config = TransitionStoreConfig::default().capacity(0);
    assert!(Store::build(&bad_config).is_err());
    Ok(())
}

/// Picks the slots holding terminal transitions, as a stand-in for a custom selection rule.
struct DoneSampler<'a>(&'a [usize]);

impl IndexSampler for DoneSampler<'_> {
    fn make_indices<R: rand::Rng + ?Sized>(
        &self,
        _cursor: &marl_replay_core::CursorState,
        batch_size: usize,
        _rng: &mut R,
    ) -> Result<Vec<usize>, ReplayError> {
        Ok(self.0.iter().cycle().take(batch_size).copied().collect())
    }
}

#[test]
fn test_custom_index_sampler() {
    let mut store = store(16, 0);
    for t in 0..16 {
        store.add_transition(transition(t)).unwrap();
    }
    let done_ixs = (0..16)
        .filter(|&ix| store.get(ix).unwrap().done)
        .collect::<Vec<_>>();

    let batch = store.sample_with(&DoneSampler(&done_ixs), 8).unwrap();
    assert_eq!(batch.dones, vec![[true]; 8]);
}
