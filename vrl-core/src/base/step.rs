//! Environment step and transitions.
use super::Obs;
use serde::{Deserialize, Serialize};

/// The outcome of one environment step.
///
/// An environment emits a [`Step`] at every interaction; together with the
/// observation and action that preceded it, it forms a [`Transition`].
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Observation after the step.
    pub obs: Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode reached a terminal state.
    pub is_terminated: bool,

    /// Flag denoting if the episode was cut off without reaching a terminal state.
    pub is_truncated: bool,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(obs: Obs, reward: f32, is_terminated: bool, is_truncated: bool) -> Self {
        Self {
            obs,
            reward,
            is_terminated,
            is_truncated,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// One `(obs, act, reward, next_obs, done)` tuple.
///
/// `is_done` marks a terminal transition: learning rules do not bootstrap
/// from `next_obs` when it is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Observation the action was taken in.
    pub obs: Obs,

    /// Action taken.
    pub act: usize,

    /// Reward received.
    pub reward: f32,

    /// Observation after the action.
    pub next_obs: Obs,

    /// Terminal flag.
    pub is_done: bool,
}

impl Transition {
    /// Constructs a [`Transition`].
    pub fn new(obs: Obs, act: usize, reward: f32, next_obs: Obs, is_done: bool) -> Self {
        Self {
            obs,
            act,
            reward,
            next_obs,
            is_done,
        }
    }
}
