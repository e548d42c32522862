//! Index generation for sampling batches.
//!
//! Sampling is split into two stages: an [`IndexSampler`] decides which slots
//! of the buffer to read, then
//! [`TransitionStore::encode_batch`](super::TransitionStore::encode_batch)
//! gathers them into a batch. A new sampling scheme, e.g., priority-weighted
//! selection, only needs a new [`IndexSampler`].
use crate::ReplayError;
use log::{trace, warn};
use rand::{seq::SliceRandom, Rng};

/// Snapshot of the bookkeeping of a buffer, as seen by an [`IndexSampler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorState {
    /// Number of stored transitions.
    pub size: usize,

    /// Maximum number of transitions.
    pub capacity: usize,

    /// Slot where the next transition will be written.
    pub write_cursor: usize,
}

/// Generates the slot indices of a batch.
pub trait IndexSampler {
    /// Returns `batch_size` indices into the buffer described by `cursor`.
    fn make_indices<R: Rng + ?Sized>(
        &self,
        cursor: &CursorState,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, ReplayError>;
}

/// Draws indices uniformly at random from the stored transitions, with replacement.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformSampler;

impl IndexSampler for UniformSampler {
    fn make_indices<R: Rng + ?Sized>(
        &self,
        cursor: &CursorState,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, ReplayError> {
        if cursor.size == 0 {
            return Err(ReplayError::EmptyBuffer);
        }

        let ixs = (0..batch_size)
            .map(|_| rng.gen_range(0..cursor.size))
            .collect::<Vec<_>>();
        trace!("Uniform indices: {:?}", ixs);
        Ok(ixs)
    }
}

/// Takes the `batch_size` most recently written slots, in shuffled order.
///
/// The `i`-th slot is `(write_cursor - 1 - i) mod capacity`. The window is
/// computed over slots, not over stored transitions:
///
/// * If `batch_size > capacity`, the window wraps past itself and the same
///   slot appears more than once.
/// * Before the buffer has been filled, the window can reach slots that were
///   never written. [`TransitionStore::encode_batch`] rejects those with
///   [`ReplayError::IndexOutOfRange`].
///
/// [`TransitionStore::encode_batch`]: super::TransitionStore::encode_batch
#[derive(Clone, Copy, Debug, Default)]
pub struct LatestSampler;

impl IndexSampler for LatestSampler {
    fn make_indices<R: Rng + ?Sized>(
        &self,
        cursor: &CursorState,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, ReplayError> {
        let capacity = cursor.capacity;

        if batch_size > cursor.size && cursor.size < capacity {
            warn!(
                "Latest window of {} slots exceeds the {} stored transitions; unwritten slots will be included",
                batch_size, cursor.size
            );
        }

        // `i % capacity` keeps the subtraction from underflowing.
        let mut ixs = (0..batch_size)
            .map(|i| (cursor.write_cursor + capacity - 1 - (i % capacity)) % capacity)
            .collect::<Vec<_>>();
        ixs.shuffle(rng);
        trace!("Latest indices: {:?}", ixs);
        Ok(ixs)
    }
}
