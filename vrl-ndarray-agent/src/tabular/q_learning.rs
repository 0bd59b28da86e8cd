//! Tabular Q-learning.
use super::{QTable, TabularConfig};
use anyhow::Result;
use log::trace;
use ndarray::Array2;
use vrl_core::{
    record::{Record, RecordValue},
    Agent, AgentStats, Configurable, EpisodeStats, EpsilonGreedy, Obs, Policy, Transition,
};

/// Off-policy TD(0) control over a Q table.
///
/// Every transition is applied immediately with
/// `target = r + gamma * max_a Q[s', a]`, or `r` on termination.
pub struct QLearning<P: Policy = EpsilonGreedy> {
    q: QTable,
    policy: P,
    alpha: f32,
    initial_alpha: f32,
    min_alpha: f32,
    gamma: f32,
    stats: EpisodeStats,
}

impl<P: Policy> QLearning<P> {
    /// Builds the agent with the given policy, ignoring `config.explorer`.
    pub fn with_policy(config: TabularConfig, policy: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q: QTable::new(config.n_states, config.n_actions, config.initial_value()),
            policy,
            alpha: config.alpha,
            initial_alpha: config.alpha,
            min_alpha: config.min_alpha,
            gamma: config.gamma,
            stats: EpisodeStats::default(),
        })
    }

    /// Action-value table.
    pub fn q(&self) -> &Array2<f32> {
        self.q.as_array()
    }

    /// Action-value table as a value source for policies.
    pub fn q_table(&self) -> &QTable {
        &self.q
    }

    /// Current learning rate.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// The policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Decays the learning rate linearly over `total_episodes`.
    ///
    /// `alpha = max(min_alpha, alpha_0 * (1 - episode / total_episodes))`,
    /// where `alpha_0` is the configured learning rate. The schedule always
    /// starts from `alpha_0`, so repeated calls for the same episode give the
    /// same rate instead of compounding on the current one.
    pub fn decay_learning_rate(&mut self, episode: usize, total_episodes: usize) {
        let frac = if total_episodes == 0 {
            1.0
        } else {
            (episode as f32 / total_episodes as f32).min(1.0)
        };
        self.alpha = (self.initial_alpha * (1.0 - frac)).max(self.min_alpha);
    }
}

impl Configurable for QLearning<EpsilonGreedy> {
    type Config = TabularConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let policy = EpsilonGreedy::build(config.explorer.clone())?;
        Self::with_policy(config, policy)
    }
}

impl<P: Policy> Agent for QLearning<P> {
    fn get_action(&mut self, obs: &Obs) -> Result<usize> {
        self.policy.select_action(obs, &self.q)
    }

    fn update(&mut self, tr: &Transition, _info: &Record) -> Result<Record> {
        self.stats.record_step();
        let s = self.q.check(&tr.obs, tr.act)?;
        let target = if tr.is_done {
            tr.reward
        } else {
            let next_state = tr.next_obs.index_within(self.q.n_states())?;
            tr.reward + self.gamma * self.q.max(next_state)
        };
        let td_error = self.q.step_toward(s, tr.act, target, self.alpha);
        trace!("Q[{}, {}] <- {}, td_error = {}", s, tr.act, self.q.get(s, tr.act), td_error);

        Ok(Record::from_slice(&[("td_error", RecordValue::Scalar(td_error))]))
    }

    fn start_episode(&mut self) {
        self.stats.start_episode();
    }

    fn end_episode(&mut self, total_reward: f32) -> Result<()> {
        self.stats.end_episode(total_reward);
        Ok(())
    }

    fn stats(&self) -> AgentStats {
        self.stats.stats()
    }

    fn decay_exploration(&mut self) {
        self.policy.decay();
    }
}
