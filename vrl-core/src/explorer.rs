//! Exploration strategies.
use crate::{
    error::ensure_config,
    util::argmax,
    ActionValues, Configurable, Obs, Policy,
};
use anyhow::Result;
use rand::{distributions::WeightedIndex, rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`EpsilonGreedy`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct EpsilonGreedyConfig {
    /// Probability mass spread uniformly over all actions.
    pub epsilon: f32,

    /// Multiplicative factor applied by [`Policy::decay`].
    pub epsilon_decay: f32,

    /// Lower bound of `epsilon` under decay.
    pub epsilon_min: f32,

    /// Random seed for sampling actions.
    pub seed: u64,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
            seed: 42,
        }
    }
}

impl EpsilonGreedyConfig {
    /// Sets the initial epsilon.
    pub fn epsilon(mut self, v: f32) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the decay factor of epsilon.
    pub fn epsilon_decay(mut self, v: f32) -> Self {
        self.epsilon_decay = v;
        self
    }

    /// Sets the lower bound of epsilon.
    pub fn epsilon_min(mut self, v: f32) -> Self {
        self.epsilon_min = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`EpsilonGreedyConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EpsilonGreedyConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_config(
            (0.0..=1.0).contains(&self.epsilon),
            format!("epsilon must be in [0, 1], got {}", self.epsilon),
        )?;
        ensure_config(
            (0.0..=1.0).contains(&self.epsilon_min),
            format!("epsilon_min must be in [0, 1], got {}", self.epsilon_min),
        )?;
        ensure_config(
            self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0,
            format!("epsilon_decay must be in (0, 1], got {}", self.epsilon_decay),
        )?;
        Ok(())
    }
}

/// Epsilon-greedy action selection.
///
/// Every action receives probability `epsilon / n`; the greedy action
/// (the first one among ties) additionally receives `1 - epsilon`.
pub struct EpsilonGreedy {
    epsilon: f32,
    epsilon_decay: f32,
    epsilon_min: f32,
    rng: SmallRng,
}

impl EpsilonGreedy {
    /// Current epsilon.
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Returns the epsilon-greedy distribution over `values`.
    pub fn probs(&self, values: &[f32]) -> Vec<f32> {
        let n = values.len();
        let mut probs = vec![self.epsilon / n as f32; n];
        if n > 0 {
            probs[argmax(values)] += 1.0 - self.epsilon;
        }
        probs
    }
}

impl Configurable for EpsilonGreedy {
    type Config = EpsilonGreedyConfig;

    fn build(config: Self::Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            epsilon: config.epsilon,
            epsilon_decay: config.epsilon_decay,
            epsilon_min: config.epsilon_min,
            rng: SmallRng::seed_from_u64(config.seed),
        })
    }
}

impl Policy for EpsilonGreedy {
    fn action_probs(&self, obs: &Obs, values: &dyn ActionValues) -> Result<Vec<f32>> {
        let values = values.action_values(obs)?;
        Ok(self.probs(&values))
    }

    fn select_action(&mut self, obs: &Obs, values: &dyn ActionValues) -> Result<usize> {
        let probs = self.action_probs(obs, values)?;
        let dist = WeightedIndex::new(&probs)?;
        Ok(self.rng.sample(dist))
    }

    fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);
    }
}
