//! Off-policy Monte Carlo control with importance sampling.
use super::{Credit, EpisodeBuffer, MonteCarloConfig};
use crate::tabular::QTable;
use anyhow::Result;
use log::{debug, trace};
use ndarray::Array2;
use vrl_core::{
    error::VrlError,
    record::{Record, RecordValue},
    Agent, AgentStats, Configurable, EpisodeStats, EpsilonGreedy, Obs, Policy, Transition,
};

/// Off-policy Monte Carlo control.
///
/// The agent's own policy is the behavior policy; the target policy is
/// greedy with respect to the table. Returns are corrected with either
/// ordinary importance sampling (weight capped at `is_weight_cap`, step
/// size `1 / visit_count`) or weighted importance sampling (step size
/// `W / C[s, a]`). The backward scan stops as soon as no further credit can
/// be assigned: a zero behavior probability, a degenerate weight, or, with
/// weighted sampling, an action the greedy target policy would not take.
pub struct OffPolicyMonteCarlo<P: Policy = EpsilonGreedy> {
    q: QTable,
    visits: Array2<u32>,
    c: Array2<f32>,
    policy: P,
    gamma: f32,
    first_visit: bool,
    weighted_is: bool,
    is_weight_cap: f32,
    fallback_step_size: f32,
    episode: EpisodeBuffer,
    stats: EpisodeStats,
}

impl<P: Policy> OffPolicyMonteCarlo<P> {
    /// Builds the agent with the given behavior policy, ignoring `config.explorer`.
    pub fn with_policy(config: MonteCarloConfig, policy: P) -> Result<Self> {
        config.validate()?;
        let shape = (config.n_states, config.n_actions);
        Ok(Self {
            q: QTable::new(config.n_states, config.n_actions, config.initial_value()),
            visits: Array2::zeros(shape),
            c: Array2::zeros(shape),
            policy,
            gamma: config.gamma,
            first_visit: config.first_visit,
            weighted_is: config.weighted_is,
            is_weight_cap: config.is_weight_cap,
            fallback_step_size: config.fallback_step_size,
            episode: EpisodeBuffer::default(),
            stats: EpisodeStats::default(),
        })
    }

    /// Action-value table.
    pub fn q(&self) -> &Array2<f32> {
        self.q.as_array()
    }

    /// Number of ordinary importance-sampling updates applied to each pair.
    pub fn visits(&self) -> &Array2<u32> {
        &self.visits
    }

    /// Cumulative importance weights of weighted importance sampling.
    pub fn cumulative_weights(&self) -> &Array2<f32> {
        &self.c
    }

    fn behavior_prob(&self, c: &Credit) -> Result<f32> {
        let probs = self
            .policy
            .action_probs(&Obs::Discrete(c.state), &self.q)?;
        probs.get(c.act).copied().ok_or_else(|| {
            VrlError::ActionOutOfRange {
                action: c.act,
                n_actions: probs.len(),
            }
            .into()
        })
    }

    fn ordinary_is(&mut self, credits: &[Credit]) -> Result<usize> {
        let mut w = 1.0f32;
        let mut n_updates = 0;

        for c in credits.iter().filter(|c| c.eligible) {
            let b = self.behavior_prob(c)?;
            if b == 0.0 {
                break;
            }
            w = (w / b).min(self.is_weight_cap);
            if w == 0.0 || !w.is_finite() {
                trace!("Degenerate importance weight {} at step ({}, {})", w, c.state, c.act);
                break;
            }

            let n = &mut self.visits[[c.state, c.act]];
            *n = n.saturating_add(1);
            let step = match *n {
                0 => self.fallback_step_size,
                n => 1.0 / n as f32,
            };
            self.q.step_toward(c.state, c.act, c.ret, w * step);
            n_updates += 1;
        }

        Ok(n_updates)
    }

    fn weighted_is(&mut self, credits: &[Credit]) -> Result<usize> {
        let mut w = 1.0f32;
        let mut n_updates = 0;

        for c in credits.iter() {
            if c.eligible {
                let acc = &mut self.c[[c.state, c.act]];
                *acc += w;
                if *acc > 0.0 {
                    let step = w / *acc;
                    self.q.step_toward(c.state, c.act, c.ret, step);
                    n_updates += 1;
                }
            }

            if c.act != self.q.argmax(c.state) {
                break;
            }
            let b = self.behavior_prob(c)?;
            if b == 0.0 {
                break;
            }
            w *= 1.0 / b;
            if !w.is_finite() {
                trace!("Importance weight overflow at step ({}, {})", c.state, c.act);
                break;
            }
        }

        Ok(n_updates)
    }

    fn process_episode(&mut self) -> Result<Record> {
        let credits = self.episode.backward(self.gamma, self.first_visit);
        self.episode.clear();
        let episode_return = credits.last().map_or(0.0, |c| c.ret);

        let n_updates = if self.weighted_is {
            self.weighted_is(&credits)?
        } else {
            self.ordinary_is(&credits)?
        };

        debug!(
            "Processed episode of {} steps, return = {}, updates = {}",
            credits.len(),
            episode_return,
            n_updates
        );

        Ok(Record::from_slice(&[
            ("episode_return", RecordValue::Scalar(episode_return)),
            ("n_updates", RecordValue::Scalar(n_updates as f32)),
        ]))
    }
}

impl Configurable for OffPolicyMonteCarlo<EpsilonGreedy> {
    type Config = MonteCarloConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let policy = EpsilonGreedy::build(config.explorer.clone())?;
        Self::with_policy(config, policy)
    }
}

impl<P: Policy> Agent for OffPolicyMonteCarlo<P> {
    fn get_action(&mut self, obs: &Obs) -> Result<usize> {
        self.policy.select_action(obs, &self.q)
    }

    fn update(&mut self, tr: &Transition, _info: &Record) -> Result<Record> {
        self.stats.record_step();
        let s = self.q.check(&tr.obs, tr.act)?;
        self.episode.push(s, tr.act, tr.reward);

        if tr.is_done {
            self.process_episode()
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
            self.process_episode()?;
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
