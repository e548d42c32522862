//! Replay buffer interface for multi-agent reinforcement learning.
//!
//! The two traits split a replay buffer along its two users. Producers, i.e.,
//! rollout loops stepping an environment, only see [`ExperienceBufferBase`].
//! Learners only see [`ReplayBufferBase`], which hands out training batches.
use anyhow::Result;

/// Interface for buffers that store experiences from environments.
///
/// # Examples
///
/// ```ignore
/// struct SimpleBuffer<T> {
///     items: Vec<T>,
/// }
///
/// impl<T> ExperienceBufferBase for SimpleBuffer<T> {
///     type Item = T;
///
///     fn push(&mut self, tr: T) -> Result<()> {
///         self.items.push(tr);
///         Ok(())
///     }
///
///     fn len(&self) -> usize {
///         self.items.len()
///     }
/// }
/// ```
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    ///
    /// # Arguments
    ///
    /// * `tr` - The experience to store
    ///
    /// # Errors
    ///
    /// Fails if the buffer cannot accept `tr`, e.g., because its shape does
    /// not match the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;
}

/// Interface for replay buffers that generate batches for training.
///
/// It is independent of [`ExperienceBufferBase`] and focuses solely on
/// the batch generation process.
pub trait ReplayBufferBase: Sized {
    /// Configuration parameters for the replay buffer.
    type Config: Clone;

    /// The type of batch generated for training.
    type Batch;

    /// Builds a new replay buffer from the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration of the buffer
    ///
    /// # Errors
    ///
    /// Fails if the configuration describes a buffer that cannot exist.
    fn build(config: &Self::Config) -> Result<Self>;

    /// Constructs a batch of `size` experiences for training.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of experiences in the batch
    ///
    /// # Returns
    ///
    /// A batch of `size` experiences, possibly with repetitions.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
