use anyhow::Result;
use marl_replay_core::TransitionStoreConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`StoreServer`](crate::StoreServer).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StoreServerConfig {
    /// Configuration of the served buffer.
    pub store: TransitionStoreConfig,

    /// Number of [`PushedItemMessage`](crate::PushedItemMessage)s that can wait in the channel.
    ///
    /// Must be positive; [`StoreServer::spawn`](crate::StoreServer::spawn)
    /// rejects zero. The default value is 1000.
    pub channel_capacity: usize,

    /// Number of transitions buffered in each [`TransitionProxy`](crate::TransitionProxy)
    /// before being sent to the server.
    ///
    /// The default value is 100.
    pub n_buffer: usize,
}

impl Default for StoreServerConfig {
    fn default() -> Self {
        Self {
            store: TransitionStoreConfig::default(),
            channel_capacity: 1000,
            n_buffer: 100,
        }
    }
}

impl StoreServerConfig {
    /// Sets the configuration of the served buffer.
    pub fn store(mut self, store: TransitionStoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Sets the capacity of the channel of pushed items.
    pub fn channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }

    /// Sets the number of transitions buffered in each proxy.
    pub fn n_buffer(mut self, n_buffer: usize) -> Self {
        self.n_buffer = n_buffer;
        self
    }

    /// Constructs [`StoreServerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`StoreServerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
