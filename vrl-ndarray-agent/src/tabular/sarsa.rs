//! Tabular SARSA.
use super::{QTable, TabularConfig};
use anyhow::Result;
use log::{trace, warn};
use ndarray::Array2;
use vrl_core::{
    record::{Record, RecordValue},
    Agent, AgentStats, Configurable, EpisodeStats, EpsilonGreedy, Obs, Policy, Transition,
};

/// A non-terminal transition waiting for the action chosen at its next state.
#[derive(Clone, Debug)]
struct Lag {
    state: usize,
    act: usize,
    reward: f32,
    next_state: usize,
}

/// On-policy TD(0) control over a Q table.
///
/// A non-terminal transition is credited one call later, once the action
/// taken at its next state is known:
/// `Q[s, a] += alpha * (r + gamma * Q[s', a'] - Q[s, a])`.
/// A terminal transition is credited immediately toward its reward.
pub struct Sarsa<P: Policy = EpsilonGreedy> {
    q: QTable,
    policy: P,
    alpha: f32,
    gamma: f32,
    lag: Option<Lag>,
    stats: EpisodeStats,
}

impl<P: Policy> Sarsa<P> {
    /// Builds the agent with the given policy, ignoring `config.explorer`.
    pub fn with_policy(config: TabularConfig, policy: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q: QTable::new(config.n_states, config.n_actions, config.initial_value()),
            policy,
            alpha: config.alpha,
            gamma: config.gamma,
            lag: None,
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

    /// The policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    fn credit(&mut self, s: usize, a: usize, target: f32) -> f32 {
        let td_error = self.q.step_toward(s, a, target, self.alpha);
        trace!("Q[{}, {}] <- {}, td_error = {}", s, a, self.q.get(s, a), td_error);
        td_error
    }
}

impl Configurable for Sarsa<EpsilonGreedy> {
    type Config = TabularConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let policy = EpsilonGreedy::build(config.explorer.clone())?;
        Self::with_policy(config, policy)
    }
}

impl<P: Policy> Agent for Sarsa<P> {
    fn get_action(&mut self, obs: &Obs) -> Result<usize> {
        self.policy.select_action(obs, &self.q)
    }

    fn update(&mut self, tr: &Transition, _info: &Record) -> Result<Record> {
        self.stats.record_step();
        let s = self.q.check(&tr.obs, tr.act)?;
        let next_state = if tr.is_done {
            None
        } else {
            Some(tr.next_obs.index_within(self.q.n_states())?)
        };
        let mut record = Record::empty();

        if let Some(lag) = self.lag.take() {
            let next_act = if lag.next_state == s {
                tr.act
            } else {
                warn!(
                    "Transition from state {} does not follow the previous one (next state {}); resampling the next action",
                    s, lag.next_state
                );
                self.policy
                    .select_action(&Obs::Discrete(lag.next_state), &self.q)?
            };
            let target = lag.reward + self.gamma * self.q.get(lag.next_state, next_act);
            let td_error = self.credit(lag.state, lag.act, target);
            record.insert("td_error", RecordValue::Scalar(td_error));
        }

        match next_state {
            None => {
                let td_error = self.credit(s, tr.act, tr.reward);
                record.insert("td_error", RecordValue::Scalar(td_error));
            }
            Some(next_state) => {
                self.lag = Some(Lag {
                    state: s,
                    act: tr.act,
                    reward: tr.reward,
                    next_state,
                });
            }
        }

        Ok(record)
    }

    fn start_episode(&mut self) {
        self.lag = None;
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
