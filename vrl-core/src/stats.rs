//! Episode and step bookkeeping shared by all agents.
use crate::record::{Record, RecordValue};
use serde::{Deserialize, Serialize};

/// Learning statistics of an agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    /// Total reward of every finished episode, in order.
    pub episode_rewards: Vec<f32>,

    /// Mean of `episode_rewards`, zero when no episode has finished.
    pub mean_reward: f32,

    /// Number of transitions passed to `update`.
    pub total_steps: usize,

    /// Number of started episodes.
    pub episodes: usize,
}

impl AgentStats {
    /// Converts the statistics into a [`Record`].
    pub fn to_record(&self) -> Record {
        Record::from_slice(&[
            (
                "episode_rewards",
                RecordValue::Array1(self.episode_rewards.clone()),
            ),
            ("mean_reward", RecordValue::Scalar(self.mean_reward)),
            ("total_steps", RecordValue::Scalar(self.total_steps as f32)),
            ("episodes", RecordValue::Scalar(self.episodes as f32)),
        ])
    }
}

/// Process-lifetime counters owned by an agent.
///
/// Reset only by constructing a new agent.
#[derive(Clone, Debug, Default)]
pub struct EpisodeStats {
    episode_rewards: Vec<f32>,
    total_steps: usize,
    episode_count: usize,
}

impl EpisodeStats {
    /// Increments the episode counter.
    pub fn start_episode(&mut self) {
        self.episode_count += 1;
    }

    /// Appends the total reward of a finished episode.
    pub fn end_episode(&mut self, total_reward: f32) {
        self.episode_rewards.push(total_reward);
    }

    /// Counts one environment step.
    pub fn record_step(&mut self) {
        self.total_steps += 1;
    }

    /// Number of started episodes.
    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Number of counted steps.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Returns a snapshot of the statistics.
    pub fn stats(&self) -> AgentStats {
        let mean_reward = if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f32>() / self.episode_rewards.len() as f32
        };

        AgentStats {
            episode_rewards: self.episode_rewards.clone(),
            mean_reward,
            total_steps: self.total_steps,
            episodes: self.episode_count,
        }
    }
}
