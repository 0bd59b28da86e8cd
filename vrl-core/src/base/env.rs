//! Environment.
use super::{Obs, Space, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// Agents never own an environment; the driver passes actions in and
/// feeds the resulting transitions to [`Agent::update`](crate::Agent::update).
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Obs>;

    /// Performes an environment step.
    ///
    /// The returned [`Record`] carries additional information of the step.
    fn step(&mut self, act: usize) -> Result<(Step, Record)>;

    /// Action space of the environment.
    fn action_space(&self) -> Space;

    /// Observation space of the environment.
    fn observation_space(&self) -> Space;
}
