//! Configuration of Monte Carlo agents.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use vrl_core::{error::ensure_config, EpsilonGreedyConfig};

/// Configuration of [`MonteCarlo`](super::MonteCarlo) and
/// [`OffPolicyMonteCarlo`](super::OffPolicyMonteCarlo).
///
/// The importance-sampling fields are used only by the off-policy agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of discrete states. Must be set.
    pub n_states: usize,

    /// Number of discrete actions. Must be set.
    pub n_actions: usize,

    /// Discount factor.
    pub gamma: f32,

    /// Credits a state-action pair only at its first occurrence in an episode.
    pub first_visit: bool,

    /// Weighted importance sampling instead of ordinary importance sampling.
    pub weighted_is: bool,

    /// Ceiling of the ordinary importance-sampling weight.
    pub is_weight_cap: f32,

    /// Step size of ordinary importance sampling for a pair without visits.
    ///
    /// Not part of the textbook algorithm, where the step size is always
    /// `1 / visit_count`. The visit counter is incremented before the step
    /// size is taken, so this value is never used under the `1 / n` rule;
    /// it is kept so that configurations carrying it stay valid.
    pub fallback_step_size: f32,

    /// If `true`, every entry of the table starts at `init_value`; otherwise at zero.
    pub optimistic_init: bool,

    /// Initial value used with `optimistic_init`.
    pub init_value: f32,

    /// Configuration of the epsilon-greedy policy.
    pub explorer: EpsilonGreedyConfig,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_states: 0,
            n_actions: 0,
            gamma: 0.99,
            first_visit: true,
            weighted_is: false,
            is_weight_cap: 10.0,
            fallback_step_size: 0.1,
            optimistic_init: false,
            init_value: 0.0,
            explorer: EpsilonGreedyConfig::default(),
        }
    }
}

impl MonteCarloConfig {
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

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Selects first-visit (`true`) or every-visit (`false`) updates.
    pub fn first_visit(mut self, v: bool) -> Self {
        self.first_visit = v;
        self
    }

    /// Selects weighted importance sampling.
    pub fn weighted_is(mut self, v: bool) -> Self {
        self.weighted_is = v;
        self
    }

    /// Sets the ceiling of the ordinary importance-sampling weight.
    pub fn is_weight_cap(mut self, v: f32) -> Self {
        self.is_weight_cap = v;
        self
    }

    /// Sets the fallback step size.
    pub fn fallback_step_size(mut self, v: f32) -> Self {
        self.fallback_step_size = v;
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

    /// Constructs [`MonteCarloConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MonteCarloConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_config(self.n_states > 0, "n_states must be positive")?;
        ensure_config(self.n_actions > 0, "n_actions must be positive")?;
        ensure_config(
            (0.0..=1.0).contains(&self.gamma),
            format!("gamma must be in [0, 1], got {}", self.gamma),
        )?;
        ensure_config(
            self.is_weight_cap > 0.0,
            format!("is_weight_cap must be positive, got {}", self.is_weight_cap),
        )?;
        ensure_config(
            self.fallback_step_size > 0.0 && self.fallback_step_size <= 1.0,
            format!(
                "fallback_step_size must be in (0, 1], got {}",
                self.fallback_step_size
            ),
        )?;
        ensure_config(self.init_value.is_finite(), "init_value must be finite")?;
        Ok(())
    }
}
