#![warn(missing_docs)]
//! Value-based agents whose action values live in `ndarray` arrays.
//!
//! * [`tabular`]: SARSA and Q-learning over a Q table.
//! * [`monte_carlo`]: on-policy and off-policy Monte Carlo control.
//! * [`linear`]: tile coding and linear semi-gradient SARSA.
//!
//! [`NdarrayAgent`] wraps all of them behind a single YAML-loadable config.
pub mod linear;
pub mod monte_carlo;
pub mod tabular;

mod agent;
pub use agent::{NdarrayAgent, NdarrayAgentConfig};
