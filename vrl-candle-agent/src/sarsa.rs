//! Semi-gradient SARSA with a neural action-value function.
mod base;
mod config;
pub use base::NeuralSarsa;
pub use config::NeuralSarsaConfig;
