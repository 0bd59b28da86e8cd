//! Agent.
use super::{Obs, Transition};
use crate::{record::Record, stats::AgentStats};
use anyhow::Result;

/// A learning agent driven step by step by an external loop.
///
/// The driver calls [`Agent::start_episode`], then repeatedly
/// [`Agent::get_action`] and [`Agent::update`] with the transition produced
/// by the environment, and finally [`Agent::end_episode`]. Only `update`
/// carries algorithm-specific semantics.
pub trait Agent {
    /// Selects an action at `obs` with the agent's policy.
    fn get_action(&mut self, obs: &Obs) -> Result<usize>;

    /// Performs the learning step of the algorithm for one transition.
    ///
    /// `info` is the additional information returned by the environment.
    /// The returned record holds diagnostics of the update, e.g. the TD
    /// error; it is empty when no learning happened.
    fn update(&mut self, tr: &Transition, info: &Record) -> Result<Record>;

    /// Prepares the agent for a new episode.
    ///
    /// Increments the episode counter and clears episode-scoped state.
    fn start_episode(&mut self);

    /// Finishes the current episode and appends `total_reward` to the history.
    fn end_episode(&mut self, total_reward: f32) -> Result<()>;

    /// Returns learning statistics.
    fn stats(&self) -> AgentStats;

    /// Decays the exploration of the agent's policy.
    fn decay_exploration(&mut self);
}
