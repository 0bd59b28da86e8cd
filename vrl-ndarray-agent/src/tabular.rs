//! Tabular temporal-difference agents.
mod config;
mod q_learning;
mod q_table;
mod sarsa;
pub use config::TabularConfig;
pub use q_learning::QLearning;
pub use q_table::QTable;
pub use sarsa::Sarsa;
