//! Configuration of [`TransitionStore`](super::TransitionStore).
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TransitionStore`](super::TransitionStore).
///
/// # Examples
///
/// ```rust
/// use marl_replay_core::TransitionStoreConfig;
///
/// let config = TransitionStoreConfig::default()
///     .capacity(50_000)
///     .agent_num(8)
///     .seed(0);
/// assert_eq!(config.capacity, 50_000);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TransitionStoreConfig {
    /// Maximum number of transitions that can be stored in the buffer.
    /// When the buffer is full, new transitions replace the oldest ones.
    pub capacity: usize,

    /// Number of agents. Every stored transition carries one action and
    /// one liveness flag per agent.
    pub agent_num: usize,

    /// Random seed used for sampling transitions.
    pub seed: u64,
}

impl Default for TransitionStoreConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            agent_num: 1,
            seed: 42,
        }
    }
}

impl TransitionStoreConfig {
    /// Sets the capacity of the buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the number of agents.
    pub fn agent_num(mut self, agent_num: usize) -> Self {
        self.agent_num = agent_num;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        debug!("Loaded TransitionStoreConfig from {:?}", path);
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_transition_store_config() -> Result<()> {
        let config = TransitionStoreConfig::default()
            .capacity(300)
            .agent_num(4)
            .seed(7);

        let dir = TempDir::new("transition_store_config")?;
        let path = dir.path().join("transition_store.yaml");

        config.save(&path)?;
        let config_ = TransitionStoreConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new("transition_store_config").unwrap();
        let path = dir.path().join("missing.yaml");
        assert!(TransitionStoreConfig::load(&path).is_err());
    }
}
