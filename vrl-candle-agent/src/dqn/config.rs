//! Configuration of [`Dqn`](super::Dqn).
use crate::{util::OutDim, Device, QNetworkConfig};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use vrl_core::{error::ensure_config, EpsilonGreedyConfig};

/// Configuration of [`Dqn`](super::Dqn).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct DqnConfig<Q> {
    /// Configuration of the online and the target networks.
    pub model_config: QNetworkConfig<Q>,

    /// Discount factor.
    pub gamma: f64,

    /// Number of transitions sampled per training step.
    pub batch_size: usize,

    /// Capacity of the replay buffer.
    pub replay_buffer_size: usize,

    /// Number of training steps between hard copies of the online network
    /// into the target network.
    pub target_update_freq: usize,

    /// Random seed for sampling the replay buffer.
    pub seed: u64,

    /// Device of the networks.
    pub device: Option<Device>,

    /// Configuration of the epsilon-greedy policy.
    pub explorer: EpsilonGreedyConfig,
}

impl<Q> Default for DqnConfig<Q> {
    fn default() -> Self {
        Self {
            model_config: QNetworkConfig::default(),
            gamma: 0.99,
            batch_size: 32,
            replay_buffer_size: 10000,
            target_update_freq: 100,
            seed: 42,
            device: None,
            explorer: EpsilonGreedyConfig::default(),
        }
    }
}

impl<Q> DqnConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the networks.
    pub fn model_config(mut self, v: QNetworkConfig<Q>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the capacity of the replay buffer.
    pub fn replay_buffer_size(mut self, v: usize) -> Self {
        self.replay_buffer_size = v;
        self
    }

    /// Sets the interval of target network updates.
    pub fn target_update_freq(mut self, v: usize) -> Self {
        self.target_update_freq = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Sets the configuration of the policy.
    pub fn explorer(mut self, v: EpsilonGreedyConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Constructs [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl<Q> DqnConfig<Q> {
    pub(crate) fn validate(&self) -> Result<()> {
        ensure_config(
            (0.0..=1.0).contains(&self.gamma),
            format!("gamma must be in [0, 1], got {}", self.gamma),
        )?;
        ensure_config(self.batch_size > 0, "batch_size must be positive")?;
        ensure_config(
            self.replay_buffer_size >= self.batch_size,
            format!(
                "replay_buffer_size ({}) must not be smaller than batch_size ({})",
                self.replay_buffer_size, self.batch_size
            ),
        )?;
        ensure_config(
            self.target_update_freq > 0,
            "target_update_freq must be positive",
        )?;
        Ok(())
    }
}
