//! Configuration of tabular TD agents.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use vrl_core::{error::ensure_config, EpsilonGreedyConfig};

/// Configuration of [`Sarsa`](super::Sarsa) and [`QLearning`](super::QLearning).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TabularConfig {
    /// Number of discrete states. Must be set.
    pub n_states: usize,

    /// Number of discrete actions. Must be set.
    pub n_actions: usize,

    /// Learning rate.
    pub alpha: f32,

    /// Lower bound of the learning rate under decay.
    pub min_alpha: f32,

    /// Discount factor.
    pub gamma: f32,

    /// If `true`, every entry of the table starts at `init_value`; otherwise at zero.
    pub optimistic_init: bool,

    /// Initial value used with `optimistic_init`.
    pub init_value: f32,

    /// Configuration of the epsilon-greedy policy.
    pub explorer: EpsilonGreedyConfig,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            n_states: 0,
            n_actions: 0,
            alpha: 0.1,
            min_alpha: 0.01,
            gamma: 0.99,
            optimistic_init: false,
            init_value: 0.0,
            explorer: EpsilonGreedyConfig::default(),
        }
    }
}

impl TabularConfig {
    /// Sets the number of states.
    pub fn n_states(mut self, v: usize) -> Self {
        self.n_states = v;
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

    /// Sets the lower bound of the learning rate.
    pub fn min_alpha(mut self, v: f32) -> Self {
        self.min_alpha = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Starts every table entry at `init_value`.
    pub fn optimistic_init(mut self, init_value: f32) -> Self {
        self.optimistic_init = true;
        self.init_value = init_value;
        self
    }

    /// Sets the configuration of the policy.
    pub fn explorer(mut self, v: EpsilonGreedyConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Initial value of the table entries.
    pub fn initial_value(&self) -> f32 {
        if self.optimistic_init {
            self.init_value
        } else {
            0.0
        }
    }

    /// Constructs [`TabularConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TabularConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_config(self.n_states > 0, "n_states must be positive")?;
        ensure_config(self.n_actions > 0, "n_actions must be positive")?;
        ensure_config(
            self.alpha > 0.0 && self.alpha <= 1.0,
            format!("alpha must be in (0, 1], got {}", self.alpha),
        )?;
        ensure_config(
            self.min_alpha >= 0.0 && self.min_alpha <= self.alpha,
            format!("min_alpha must be in [0, alpha], got {}", self.min_alpha),
        )?;
        ensure_config(
            (0.0..=1.0).contains(&self.gamma),
            format!("gamma must be in [0, 1], got {}", self.gamma),
        )?;
        ensure_config(self.init_value.is_finite(), "init_value must be finite")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_tabular_config() -> Result<()> {
        let config = TabularConfig::default()
            .n_states(5)
            .n_actions(2)
            .alpha(0.2)
            .optimistic_init(1.0);

        let dir = TempDir::new("tabular_config")?;
        let path = dir.path().join("tabular_config.yaml");
        config.save(&path)?;
        let config_ = TabularConfig::load(&path)?;
        assert_eq!(config, config_);
        assert_eq!(config_.initial_value(), 1.0);
        Ok(())
    }

    #[test]
    fn test_missing_fields_take_defaults() -> Result<()> {
        let config: TabularConfig = serde_yaml::from_str("n_states: 3\nn_actions: 2\n")?;
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.gamma, 0.99);
        assert!(config.validate().is_ok());
        assert!(TabularConfig::default().validate().is_err());
        Ok(())
    }
}
