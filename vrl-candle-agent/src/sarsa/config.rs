//! Configuration of [`NeuralSarsa`](super::NeuralSarsa).
use crate::{util::OutDim, Device, QNetworkConfig};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use vrl_core::{error::ensure_config, EpsilonGreedyConfig};

/// Configuration of [`NeuralSarsa`](super::NeuralSarsa).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct NeuralSarsaConfig<Q> {
    /// Configuration of the network.
    pub model_config: QNetworkConfig<Q>,

    /// Discount factor.
    pub gamma: f64,

    /// Device of the network.
    pub device: Option<Device>,

    /// Configuration of the epsilon-greedy policy.
    pub explorer: EpsilonGreedyConfig,
}

impl<Q> Default for NeuralSarsaConfig<Q> {
    fn default() -> Self {
        Self {
            model_config: QNetworkConfig::default(),
            gamma: 0.99,
            device: None,
            explorer: EpsilonGreedyConfig::default(),
        }
    }
}

impl<Q> NeuralSarsaConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the network.
    pub fn model_config(mut self, v: QNetworkConfig<Q>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
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

    /// Constructs [`NeuralSarsaConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`NeuralSarsaConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl<Q> NeuralSarsaConfig<Q> {
    pub(crate) fn validate(&self) -> Result<()> {
        ensure_config(
            (0.0..=1.0).contains(&self.gamma),
            format!("gamma must be in [0, 1], got {}", self.gamma),
        )?;
        Ok(())
    }
}
