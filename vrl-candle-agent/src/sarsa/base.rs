use super::NeuralSarsaConfig;
use crate::{
    model::SubModel1,
    util::{InDim, OutDim},
    QNetwork,
};
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::loss::mse;
use log::trace;
use serde::{de::DeserializeOwned, Serialize};
use vrl_core::{
    error::VrlError,
    record::{Record, RecordValue},
    ActionValues, Agent, AgentStats, Configurable, EpisodeStats, EpsilonGreedy, Obs, Policy,
    Transition,
};

/// On-policy TD(0) control with a neural action-value function.
///
/// No replay and no target network: each transition takes one optimization
/// step toward `r + gamma * Q(s', a') * (1 - done)`, where `a'` is drawn
/// from the policy at `s'` and then returned by the next
/// [`Agent::get_action`] at `s'`.
pub struct NeuralSarsa<Q, P = EpsilonGreedy>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    P: Policy,
{
    qnet: QNetwork<Q>,
    policy: P,
    gamma: f64,
    next: Option<(Obs, usize)>,
    stats: EpisodeStats,
}

impl<Q, P> NeuralSarsa<Q, P>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    P: Policy,
{
    /// Builds the agent with the given policy, ignoring `config.explorer`.
    pub fn with_policy(config: NeuralSarsaConfig<Q::Config>, policy: P) -> Result<Self> {
        config.validate()?;
        let device: Device = config.device.unwrap_or_default().try_into()?;
        let qnet = QNetwork::build(config.model_config, device)?;

        Ok(Self {
            qnet,
            policy,
            gamma: config.gamma,
            next: None,
            stats: EpisodeStats::default(),
        })
    }

    /// The network.
    pub fn qnet(&self) -> &QNetwork<Q> {
        &self.qnet
    }

    fn update_critic(&mut self, tr: &Transition, next_act: Option<usize>) -> Result<f32> {
        let tgt = match next_act {
            None => tr.reward as f64,
            Some(a) => {
                let q_next = self.qnet.action_value(&tr.next_obs, a)?;
                tr.reward as f64 + self.gamma * q_next as f64
            }
        };
        let tgt = Tensor::new(&[tgt as f32], self.qnet.device())?;

        let obs = self.qnet.input(&[&tr.obs])?;
        let act = Tensor::new(&[[tr.act as u32]], self.qnet.device())?;
        let pred = self
            .qnet
            .forward(&obs)?
            .gather(&act, D::Minus1)?
            .squeeze(D::Minus1)?;

        let loss = mse(&pred, &tgt)?;
        self.qnet.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }
}

impl<Q> Configurable for NeuralSarsa<Q, EpsilonGreedy>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    type Config = NeuralSarsaConfig<Q::Config>;

    fn build(config: Self::Config) -> Result<Self> {
        let policy = EpsilonGreedy::build(config.explorer.clone())?;
        Self::with_policy(config, policy)
    }
}

impl<Q, P> Agent for NeuralSarsa<Q, P>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    P: Policy,
{
    fn get_action(&mut self, obs: &Obs) -> Result<usize> {
        match self.next.take() {
            Some((next_obs, act)) if next_obs == *obs => Ok(act),
            _ => self.policy.select_action(obs, &self.qnet),
        }
    }

    fn update(&mut self, tr: &Transition, _info: &Record) -> Result<Record> {
        self.stats.record_step();
        if tr.act >= self.qnet.n_actions() {
            return Err(VrlError::ActionOutOfRange {
                action: tr.act,
                n_actions: self.qnet.n_actions(),
            }
            .into());
        }

        let next_act = if tr.is_done {
            None
        } else {
            Some(self.policy.select_action(&tr.next_obs, &self.qnet)?)
        };
        let loss = self.update_critic(tr, next_act)?;
        trace!("loss = {}, next_act = {:?}", loss, next_act);

        self.next = next_act.map(|a| (tr.next_obs.clone(), a));

        Ok(Record::from_slice(&[("loss", RecordValue::Scalar(loss))]))
    }

    fn start_episode(&mut self) {
        self.next = None;
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
    use crate::mlp::{Mlp, MlpConfig};
    use vrl_core::EpsilonGreedyConfig;

    fn agent() -> NeuralSarsa<Mlp> {
        let config = NeuralSarsaConfig::default()
            .model_config(
                crate::QNetworkConfig::default().q_config(MlpConfig::new(2, vec![8], 2, false)),
            )
            .gamma(0.9)
            .explorer(EpsilonGreedyConfig::default().epsilon(0.5).seed(3));
        NeuralSarsa::build(config).unwrap()
    }

    #[test]
    fn test_next_action_is_committed() -> Result<()> {
        let mut agent = agent();
        agent.start_episode();
        let tr = Transition::new(Obs::Discrete(0), 1, 1.0, Obs::Discrete(1), false);
        let record = agent.update(&tr, &Record::empty())?;
        assert!(record.get_scalar("loss")?.is_finite());

        let (_, committed) = agent.next.clone().unwrap();
        assert_eq!(agent.get_action(&Obs::Discrete(1))?, committed);
        assert!(agent.next.is_none());
        Ok(())
    }

    #[test]
    fn test_terminal_transition_commits_nothing() -> Result<()> {
        let mut agent = agent();
        let tr = Transition::new(Obs::Discrete(0), 0, 1.0, Obs::Discrete(1), true);
        agent.update(&tr, &Record::empty())?;
        assert!(agent.next.is_none());

        let invalid = Transition::new(Obs::Discrete(0), 2, 0.0, Obs::Discrete(1), true);
        assert!(agent.update(&invalid, &Record::empty()).is_err());
        Ok(())
    }
}
