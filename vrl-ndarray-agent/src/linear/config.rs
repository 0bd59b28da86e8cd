//! Configuration of linear semi-gradient SARSA.
use super::FeatureConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use vrl_core::{error::ensure_config, EpsilonGreedyConfig};

/// Configuration of [`SemiGradientSarsa`](super::SemiGradientSarsa).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct LinearConfig {
    /// Feature encoding of observations.
    pub features: FeatureConfig,

    /// Number of discrete actions. Must be set.
    pub n_actions: usize,

    /// Learning rate.
    pub alpha: f32,

    /// Multiplicative decay of the learning rate.
    pub alpha_decay: f32,

    /// Lower bound of the learning rate.
    pub alpha_min: f32,

    /// Discount factor.
    pub gamma: f32,

    /// Configuration of the epsilon-greedy policy.
    pub explorer: EpsilonGreedyConfig,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            n_actions: 0,
            alpha: 0.01,
            alpha_decay: 0.999,
            alpha_min: 0.0001,
            gamma: 0.99,
            explorer: EpsilonGreedyConfig::default(),
        }
    }
}

impl LinearConfig {
    /// Sets the feature encoding.
    pub fn features(mut self, v: FeatureConfig) -> Self {
        self.features = v;
        self
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the learning rate.
    pub fn alpha(mut self, v: f32) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the decay of the learning rate.
    pub fn alpha_decay(mut self, v: f32) -> Self {
        self.alpha_decay = v;
        self
    }

    /// Sets the lower bound of the learning rate.
    pub fn alpha_min(mut self, v: f32) -> Self {
        self.alpha_min = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the configuration of the policy.
    pub fn explorer(mut self, v: EpsilonGreedyConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Constructs [`LinearConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`LinearConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_config(self.n_actions > 0, "n_actions must be positive")?;
        ensure_config(
            self.alpha > 0.0 && self.alpha <= 1.0,
            format!("alpha must be in (0, 1], got {}", self.alpha),
        )?;
        ensure_config(
            self.alpha_decay > 0.0 && self.alpha_decay <= 1.0,
            format!("alpha_decay must be in (0, 1], got {}", self.alpha_decay),
        )?;
        ensure_config(
            self.alpha_min >= 0.0,
            format!("alpha_min must be non-negative, got {}", self.alpha_min),
        )?;
        ensure_config(
            (0.0..=1.0).contains(&self.gamma),
            format!("gamma must be in [0, 1], got {}", self.gamma),
        )?;
        Ok(())
    }
}
