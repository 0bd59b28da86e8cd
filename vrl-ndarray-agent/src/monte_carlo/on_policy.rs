//! On-policy Monte Carlo control.
use super::{EpisodeBuffer, MonteCarloConfig};
use crate::tabular::QTable;
use anyhow::Result;
use log::debug;
use ndarray::Array2;
use vrl_core::{
    record::{Record, RecordValue},
    Agent, AgentStats, Configurable, EpisodeStats, EpsilonGreedy, Obs, Policy, Transition,
};

/// Monte Carlo control with sample-average updates.
///
/// At episode end the returns are scanned backward and every eligible pair
/// moves toward its return with step size `1 / visit_count`.
pub struct MonteCarlo<P: Policy = EpsilonGreedy> {
    q: QTable,
    visits: Array2<u32>,
    policy: P,
    gamma: f32,
    first_visit: bool,
    episode: EpisodeBuffer,
    stats: EpisodeStats,
}

impl<P: Policy> MonteCarlo<P> {
    /// Builds the agent with the given policy, ignoring `config.explorer`.
    pub fn with_policy(config: MonteCarloConfig, policy: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q: QTable::new(config.n_states, config.n_actions, config.initial_value()),
            visits: Array2::zeros((config.n_states, config.n_actions)),
            policy,
            gamma: config.gamma,
            first_visit: config.first_visit,
            episode: EpisodeBuffer::default(),
            stats: EpisodeStats::default(),
        })
    }

    /// Action-value table.
    pub fn q(&self) -> &Array2<f32> {
        self.q.as_array()
    }

    /// Number of updates applied to each pair.
    pub fn visits(&self) -> &Array2<u32> {
        &self.visits
    }

    /// Number of buffered steps of the current episode.
    pub fn episode_len(&self) -> usize {
        self.episode.len()
    }

    fn process_episode(&mut self) -> Record {
        let credits = self.episode.backward(self.gamma, self.first_visit);
        let episode_return = credits.last().map_or(0.0, |c| c.ret);
        let mut n_updates = 0;

        for c in credits.iter().filter(|c| c.eligible) {
            let n = &mut self.visits[[c.state, c.act]];
            *n = n.saturating_add(1);
            let step = 1.0 / *n as f32;
            self.q.step_toward(c.state, c.act, c.ret, step);
            n_updates += 1;
        }

        debug!(
            "Processed episode of {} steps, return = {}, updates = {}",
            credits.len(),
            episode_return,
            n_updates
        );
        self.episode.clear();

        Record::from_slice(&[
            ("episode_return", RecordValue::Scalar(episode_return)),
            ("n_updates", RecordValue::Scalar(n_updates as f32)),
        ])
    }
}

impl Configurable for MonteCarlo<EpsilonGreedy> {
    type Config = MonteCarloConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let policy = EpsilonGreedy::build(config.explorer.clone())?;
        Self::with_policy(config, policy)
    }
}

impl<P: Policy> Agent for MonteCarlo<P> {
    fn get_action(&mut self, obs: &Obs) -> Result<usize> {
        self.policy.select_action(obs, &self.q)
    }

    fn update(&mut self, tr: &Transition, _info: &Record) -> Result<Record> {
        self.stats.record_step();
        let s = self.q.check(&tr.obs, tr.act)?;
        self.episode.push(s, tr.act, tr.reward);

        if tr.is_done {
            Ok(self.process_episode())
        } else {
            Ok(Record::empty())
        }
    }

    fn start_episode(&mut self) {
        self.episode.clear();
        self.stats.start_episode();
    }

    fn end_episode(&mut self, total_reward: f32) -> Result<()> {
        if !self.episode.is_empty() {
            self.process_episode();
        }
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

#[cfg(test)]
mod test {
    use super::*;

    fn agent(first_visit: bool) -> MonteCarlo {
        let config = MonteCarloConfig::default()
            .n_states(3)
            .n_actions(2)
            .gamma(0.9)
            .first_visit(first_visit);
        MonteCarlo::build(config).unwrap()
    }

    #[test]
    fn test_single_pair_gets_return() {
        let mut agent = agent(true);
        agent.start_episode();
        let tr = Transition::new(Obs::Discrete(1), 0, 2.5, Obs::Discrete(2), true);
        let record = agent.update(&tr, &Record::empty()).unwrap();
        assert_eq!(agent.q()[[1, 0]], 2.5);
        assert_eq!(record.get_scalar("episode_return").unwrap(), 2.5);
        assert_eq!(record.get_scalar("n_updates").unwrap(), 1.0);
        assert_eq!(agent.episode_len(), 0);
    }

    #[test]
    fn test_optimistic_init() {
        let config = MonteCarloConfig::default()
            .n_states(2)
            .n_actions(2)
            .optimistic_init(5.0);
        let mut agent = MonteCarlo::build(config).unwrap();
        assert!(agent.q().iter().all(|q| *q == 5.0));

        // The first sample-average update replaces the initial value.
        agent.start_episode();
        let tr = Transition::new(Obs::Discrete(0), 1, 1.0, Obs::Discrete(1), true);
        agent.update(&tr, &Record::empty()).unwrap();
        assert_eq!(agent.q()[[0, 1]], 1.0);
        assert_eq!(agent.q()[[0, 0]], 5.0);
    }

    #[test]
    fn test_every_visit_averages_occurrences() {
        let mut agent = agent(false);
        agent.start_episode();
        agent
            .update(
                &Transition::new(Obs::Discrete(0), 1, 1.0, Obs::Discrete(0), false),
                &Record::empty(),
            )
            .unwrap();
        agent
            .update(
                &Transition::new(Obs::Discrete(0), 1, 1.0, Obs::Discrete(2), true),
                &Record::empty(),
            )
            .unwrap();
        // Returns 1.9 (first) and 1.0 (second), averaged.
        assert!((agent.q()[[0, 1]] - 1.45).abs() < 1e-6);
        assert_eq!(agent.visits()[[0, 1]], 2);
    }

    #[test]
    fn test_truncated_episode_is_processed_at_end() {
        let mut agent = agent(true);
        agent.start_episode();
        agent
            .update(
                &Transition::new(Obs::Discrete(0), 0, 3.0, Obs::Discrete(1), false),
                &Record::empty(),
            )
            .unwrap();
        assert_eq!(agent.q()[[0, 0]], 0.0);
        agent.end_episode(3.0).unwrap();
        assert_eq!(agent.q()[[0, 0]], 3.0);
        assert_eq!(agent.stats().episode_rewards, vec![3.0]);
    }
}
