//! DQN agent implemented with candle.
use super::DqnConfig;
use crate::{
    model::SubModel1,
    util::{InDim, OutDim},
    QNetwork,
};
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::loss::mse;
use log::{debug, trace};
use serde::{de::DeserializeOwned, Serialize};
use vrl_core::{
    error::VrlError,
    record::{Record, RecordValue},
    replay_buffer::{ReplayBuffer, ReplayBufferConfig},
    ActionValues, Agent, AgentStats, Configurable, EpisodeStats, EpsilonGreedy, Obs, Policy,
    Transition,
};

/// Q-learning with a neural action-value function, experience replay and a
/// target network.
///
/// Every transition is stored in the replay buffer. Once the buffer holds
/// `batch_size` transitions, each update samples a batch and takes one
/// optimization step on the mean squared error between `Q(s, a)` and
/// `r + gamma * max_a' Q_target(s', a') * (1 - done)`. Every
/// `target_update_freq` training steps the target network becomes an exact
/// copy of the online network.
pub struct Dqn<Q, P = EpsilonGreedy>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    P: Policy,
{
    qnet: QNetwork<Q>,
    qnet_tgt: QNetwork<Q>,
    buffer: ReplayBuffer<Transition>,
    policy: P,
    gamma: f64,
    batch_size: usize,
    target_update_freq: usize,
    n_train_steps: usize,
    stats: EpisodeStats,
}

impl<Q, P> Dqn<Q, P>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    P: Policy,
{
    /// Builds the agent with the given policy, ignoring `config.explorer`.
    pub fn with_policy(config: DqnConfig<Q::Config>, policy: P) -> Result<Self> {
        config.validate()?;
        let device: Device = config.device.unwrap_or_default().try_into()?;
        let qnet = QNetwork::build(config.model_config.clone(), device.clone())?;
        let mut qnet_tgt = QNetwork::build(config.model_config.clone(), device)?;
        qnet_tgt.copy_from(&qnet)?;
        let buffer = ReplayBuffer::build(
            ReplayBufferConfig::default()
                .capacity(config.replay_buffer_size)
                .seed(config.seed),
        )?;

        Ok(Self {
            qnet,
            qnet_tgt,
            buffer,
            policy,
            gamma: config.gamma,
            batch_size: config.batch_size,
            target_update_freq: config.target_update_freq,
            n_train_steps: 0,
            stats: EpisodeStats::default(),
        })
    }

    /// Online network.
    pub fn qnet(&self) -> &QNetwork<Q> {
        &self.qnet
    }

    /// Target network.
    pub fn qnet_tgt(&self) -> &QNetwork<Q> {
        &self.qnet_tgt
    }

    /// Replay buffer.
    pub fn buffer(&self) -> &ReplayBuffer<Transition> {
        &self.buffer
    }

    /// Number of optimization steps taken so far.
    pub fn n_train_steps(&self) -> usize {
        self.n_train_steps
    }

    fn update_critic(&mut self, batch: &[Transition]) -> Result<f32> {
        let device = self.qnet.device().clone();
        let n = batch.len();
        let obs = self.qnet.input(&batch.iter().map(|tr| &tr.obs).collect::<Vec<_>>())?;
        let next_obs = self
            .qnet
            .input(&batch.iter().map(|tr| &tr.next_obs).collect::<Vec<_>>())?;
        let act = Tensor::from_vec(
            batch.iter().map(|tr| tr.act as u32).collect::<Vec<_>>(),
            (n, 1),
            &device,
        )?;
        let reward = Tensor::from_vec(
            batch.iter().map(|tr| tr.reward).collect::<Vec<_>>(),
            (n,),
            &device,
        )?;
        let is_not_done = Tensor::from_vec(
            batch
                .iter()
                .map(|tr| if tr.is_done { 0f32 } else { 1f32 })
                .collect::<Vec<_>>(),
            (n,),
            &device,
        )?;

        let pred = self
            .qnet
            .forward(&obs)?
            .gather(&act, D::Minus1)?
            .squeeze(D::Minus1)?;

        let tgt = {
            let q = self.qnet_tgt.forward(&next_obs)?.max(D::Minus1)?;
            (reward + (is_not_done * q)?.affine(self.gamma, 0.0)?)?
        }
        .detach();

        let loss = mse(&pred, &tgt)?;
        self.qnet.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }
}

impl<Q> Configurable for Dqn<Q, EpsilonGreedy>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    type Config = DqnConfig<Q::Config>;

    fn build(config: Self::Config) -> Result<Self> {
        let policy = EpsilonGreedy::build(config.explorer.clone())?;
        Self::with_policy(config, policy)
    }
}

impl<Q, P> Agent for Dqn<Q, P>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    P: Policy,
{
    fn get_action(&mut self, obs: &Obs) -> Result<usize> {
        self.policy.select_action(obs, &self.qnet)
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
        // Rejects malformed observations before they enter the buffer.
        self.qnet.input(&[&tr.obs, &tr.next_obs])?;
        self.buffer.push(tr.clone());

        if self.buffer.len() < self.batch_size {
            return Ok(Record::empty());
        }

        let batch = self.buffer.batch(self.batch_size)?;
        let loss = self.update_critic(&batch)?;
        self.n_train_steps += 1;
        trace!("n_train_steps = {}, loss = {}", self.n_train_steps, loss);

        if self.n_train_steps % self.target_update_freq == 0 {
            self.qnet_tgt.copy_from(&self.qnet)?;
            debug!(
                "Synchronized target network at training step {}",
                self.n_train_steps
            );
        }

        Ok(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss)),
            ("n_train_steps", RecordValue::Scalar(self.n_train_steps as f32)),
        ]))
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
