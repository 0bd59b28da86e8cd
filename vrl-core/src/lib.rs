#![warn(missing_docs)]
//! Core contracts of value-based reinforcement learning agents.
//!
//! An [`Agent`] owns a value representation and a [`Policy`]; a driver
//! such as [`util::run_episode`] feeds it [`Transition`]s produced by an
//! [`Env`].
pub mod dummy;
pub mod error;
pub mod record;
pub mod replay_buffer;
pub mod util;

mod base;
pub use base::{
    ActionValues, Agent, Configurable, Env, Obs, Policy, Space, Step, Transition,
};

mod explorer;
pub use explorer::{EpsilonGreedy, EpsilonGreedyConfig};

mod stats;
pub use stats::{AgentStats, EpisodeStats};
