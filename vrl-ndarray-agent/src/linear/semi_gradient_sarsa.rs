//! Linear semi-gradient SARSA.
use super::{Feature, FeatureEncoder, LinearConfig, LinearQ};
use anyhow::Result;
use log::{trace, warn};
use ndarray::Array2;
use vrl_core::{
    error::VrlError,
    record::{Record, RecordValue},
    Agent, AgentStats, ActionValues, Configurable, EpisodeStats, EpsilonGreedy, Obs, Policy,
    Transition,
};

#[derive(Clone, Debug)]
struct Lag {
    features: Vec<Feature>,
    act: usize,
    reward: f32,
    next_obs: Obs,
}

/// On-policy TD(0) control with linear action values.
///
/// Same one-step lag as [`Sarsa`](crate::tabular::Sarsa). Crediting a pair
/// adds `alpha * delta * x_f` to the weight of every non-zero feature
/// `(f, x_f)` of its state.
pub struct SemiGradientSarsa<P: Policy = EpsilonGreedy> {
    q: LinearQ,
    policy: P,
    alpha: f32,
    alpha_decay: f32,
    alpha_min: f32,
    gamma: f32,
    lag: Option<Lag>,
    stats: EpisodeStats,
}

impl<P: Policy> SemiGradientSarsa<P> {
    /// Builds the agent with the given policy, ignoring `config.explorer`.
    pub fn with_policy(config: LinearConfig, policy: P) -> Result<Self> {
        config.validate()?;
        let encoder = FeatureEncoder::build(&config.features)?;
        Ok(Self {
            q: LinearQ::new(encoder, config.n_actions),
            policy,
            alpha: config.alpha,
            alpha_decay: config.alpha_decay,
            alpha_min: config.alpha_min,
            gamma: config.gamma,
            lag: None,
            stats: EpisodeStats::default(),
        })
    }

    /// Weight matrix of shape `(n_features, n_actions)`.
    pub fn weights(&self) -> &Array2<f32> {
        self.q.weights()
    }

    /// Linear action values as a value source for policies.
    pub fn linear_q(&self) -> &LinearQ {
        &self.q
    }

    /// Current learning rate.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// `alpha = max(alpha * alpha_decay, alpha_min)`.
    pub fn decay_learning_rate(&mut self) {
        self.alpha = (self.alpha * self.alpha_decay).max(self.alpha_min);
    }

    fn credit(&mut self, features: &[Feature], act: usize, target: f32) -> f32 {
        let td_error = target - self.q.value(features, act);
        self.q.add(features, act, self.alpha * td_error);
        trace!("features = {:?}, act = {}, td_error = {}", features, act, td_error);
        td_error
    }
}

impl Configurable for SemiGradientSarsa<EpsilonGreedy> {
    type Config = LinearConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let policy = EpsilonGreedy::build(config.explorer.clone())?;
        Self::with_policy(config, policy)
    }
}

impl<P: Policy> Agent for SemiGradientSarsa<P> {
    fn get_action(&mut self, obs: &Obs) -> Result<usize> {
        self.policy.select_action(obs, &self.q)
    }

    fn update(&mut self, tr: &Transition, _info: &Record) -> Result<Record> {
        self.stats.record_step();
        if tr.act >= self.q.n_actions() {
            return Err(VrlError::ActionOutOfRange {
                action: tr.act,
                n_actions: self.q.n_actions(),
            }
            .into());
        }
        let features = self.q.features(&tr.obs)?;
        let mut record = Record::empty();

        if let Some(lag) = self.lag.take() {
            let (next_features, next_act) = if lag.next_obs == tr.obs {
                (features.clone(), tr.act)
            } else {
                warn!("Transition does not follow the previous one; resampling the next action");
                let next_act = self.policy.select_action(&lag.next_obs, &self.q)?;
                (self.q.features(&lag.next_obs)?, next_act)
            };
            let target = lag.reward + self.gamma * self.q.value(&next_features, next_act);
            let td_error = self.credit(&lag.features, lag.act, target);
            record.insert("td_error", RecordValue::Scalar(td_error));
        }

        if tr.is_done {
            let td_error = self.credit(&features, tr.act, tr.reward);
            record.insert("td_error", RecordValue::Scalar(td_error));
        } else {
            self.lag = Some(Lag {
                features,
                act: tr.act,
                reward: tr.reward,
                next_obs: tr.next_obs.clone(),
            });
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::linear::{FeatureConfig, TileCoderConfig};
    use vrl_core::EpsilonGreedyConfig;

    fn agent() -> SemiGradientSarsa {
        let config = LinearConfig::default()
            .features(FeatureConfig::TileCoding(
                TileCoderConfig::default()
                    .bounds(vec![0.0], vec![1.0])
                    .num_tilings(4)
                    .num_tiles(4),
            ))
            .n_actions(2)
            .alpha(0.1)
            .gamma(1.0)
            .explorer(EpsilonGreedyConfig::default().epsilon(0.0));
        SemiGradientSarsa::build(config).unwrap()
    }

    #[test]
    fn test_terminal_update_moves_active_weights() {
        let mut agent = agent();
        agent.start_episode();
        let obs = Obs::Continuous(vec![0.5]);
        let features = agent.linear_q().features(&obs).unwrap();
        let tr = Transition::new(obs.clone(), 1, 1.0, Obs::Continuous(vec![0.6]), true);
        agent.update(&tr, &Record::empty()).unwrap();

        for (f, _) in features.iter() {
            assert!((agent.weights()[[*f, 1]] - 0.1).abs() < 1e-6);
        }
        let q = agent.linear_q().action_values(&obs).unwrap();
        assert!((q[1] - 0.4).abs() < 1e-6);
        assert_eq!(q[0], 0.0);
        assert_eq!(agent.weights().iter().filter(|w| **w != 0.0).count(), 4);
    }

    #[test]
    fn test_first_call_only_records() {
        let mut agent = agent();
        agent.start_episode();
        let tr = Transition::new(
            Obs::Continuous(vec![0.1]),
            0,
            1.0,
            Obs::Continuous(vec![0.2]),
            false,
        );
        assert!(agent.update(&tr, &Record::empty()).unwrap().is_empty());
        assert!(agent.weights().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_discrete_obs_is_rejected() {
        let mut agent = agent();
        let err = agent.get_action(&Obs::Discrete(0)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VrlError>(),
            Some(VrlError::InvalidStateType { .. })
        ));
    }

    #[test]
    fn test_raw_features_scale_the_update() {
        let config = LinearConfig::default()
            .features(FeatureConfig::Raw { dim: 2 })
            .n_actions(2)
            .alpha(0.5)
            .gamma(1.0)
            .explorer(EpsilonGreedyConfig::default().epsilon(0.0));
        let mut agent = SemiGradientSarsa::build(config).unwrap();
        agent.start_episode();

        let obs = Obs::Continuous(vec![2.0, -1.0]);
        let tr = Transition::new(obs.clone(), 0, 1.0, Obs::Continuous(vec![0.0, 0.0]), true);
        let record = agent.update(&tr, &Record::empty()).unwrap();
        assert_eq!(record.get_scalar("td_error").unwrap(), 1.0);

        // W[f, 0] += 0.5 * 1.0 * x_f
        assert_eq!(agent.weights()[[0, 0]], 1.0);
        assert_eq!(agent.weights()[[1, 0]], -0.5);
        assert_eq!(agent.weights().column(1).sum(), 0.0);

        // Q(s, 0) = 1.0 * 2.0 + (-0.5) * (-1.0)
        let q = agent.linear_q().action_values(&obs).unwrap();
        assert_eq!(q, vec![2.5, 0.0]);
    }

    #[test]
    fn test_decay_learning_rate() {
        let mut agent = agent();
        agent.decay_learning_rate();
        assert!((agent.alpha() - 0.0999).abs() < 1e-7);
    }
}
