//! Enum dispatch over the agents of this crate.
use crate::{
    linear::{LinearConfig, SemiGradientSarsa},
    monte_carlo::{MonteCarlo, MonteCarloConfig, OffPolicyMonteCarlo},
    tabular::{QLearning, Sarsa, TabularConfig},
};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use vrl_core::{record::Record, Agent, AgentStats, Configurable, Obs, Transition};

/// Configuration of [`NdarrayAgent`], tagged by algorithm.
///
/// ```yaml
/// algorithm: QLearning
/// n_states: 16
/// n_actions: 4
/// alpha: 0.2
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(tag = "algorithm")]
pub enum NdarrayAgentConfig {
    /// Tabular SARSA.
    Sarsa(TabularConfig),

    /// Tabular Q-learning.
    QLearning(TabularConfig),

    /// On-policy Monte Carlo.
    MonteCarlo(MonteCarloConfig),

    /// Off-policy Monte Carlo.
    OffPolicyMonteCarlo(MonteCarloConfig),

    /// Linear semi-gradient SARSA.
    SemiGradientSarsa(LinearConfig),
}

impl NdarrayAgentConfig {
    /// Constructs [`NdarrayAgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`NdarrayAgentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// One of the agents of this crate, all with the epsilon-greedy policy.
pub enum NdarrayAgent {
    /// Tabular SARSA.
    Sarsa(Sarsa),

    /// Tabular Q-learning.
    QLearning(QLearning),

    /// On-policy Monte Carlo.
    MonteCarlo(MonteCarlo),

    /// Off-policy Monte Carlo.
    OffPolicyMonteCarlo(OffPolicyMonteCarlo),

    /// Linear semi-gradient SARSA.
    SemiGradientSarsa(SemiGradientSarsa),
}

macro_rules! dispatch {
    ($self:expr, $agent:ident => $body:expr) => {
        match $self {
            NdarrayAgent::Sarsa($agent) => $body,
            NdarrayAgent::QLearning($agent) => $body,
            NdarrayAgent::MonteCarlo($agent) => $body,
            NdarrayAgent::OffPolicyMonteCarlo($agent) => $body,
            NdarrayAgent::SemiGradientSarsa($agent) => $body,
        }
    };
}

impl NdarrayAgent {
    /// Name of the algorithm.
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Sarsa(_) => "Sarsa",
            Self::QLearning(_) => "QLearning",
            Self::MonteCarlo(_) => "MonteCarlo",
            Self::OffPolicyMonteCarlo(_) => "OffPolicyMonteCarlo",
            Self::SemiGradientSarsa(_) => "SemiGradientSarsa",
        }
    }
}

impl Configurable for NdarrayAgent {
    type Config = NdarrayAgentConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let agent = match config {
            NdarrayAgentConfig::Sarsa(c) => Self::Sarsa(Sarsa::build(c)?),
            NdarrayAgentConfig::QLearning(c) => Self::QLearning(QLearning::build(c)?),
            NdarrayAgentConfig::MonteCarlo(c) => Self::MonteCarlo(MonteCarlo::build(c)?),
            NdarrayAgentConfig::OffPolicyMonteCarlo(c) => {
                Self::OffPolicyMonteCarlo(OffPolicyMonteCarlo::build(c)?)
            }
            NdarrayAgentConfig::SemiGradientSarsa(c) => {
                Self::SemiGradientSarsa(SemiGradientSarsa::build(c)?)
            }
        };
        info!("Built {} agent", agent.algorithm());
        Ok(agent)
    }
}

impl Agent for NdarrayAgent {
    fn get_action(&mut self, obs: &Obs) -> Result<usize> {
        dispatch!(self, agent => agent.get_action(obs))
    }

    fn update(&mut self, tr: &Transition, info: &Record) -> Result<Record> {
        dispatch!(self, agent => agent.update(tr, info))
    }

    fn start_episode(&mut self) {
        dispatch!(self, agent => agent.start_episode())
    }

    fn end_episode(&mut self, total_reward: f32) -> Result<()> {
        dispatch!(self, agent => agent.end_episode(total_reward))
    }

    fn stats(&self) -> AgentStats {
        dispatch!(self, agent => agent.stats())
    }

    fn decay_exploration(&mut self) {
        dispatch!(self, agent => agent.decay_exploration())
    }
}
