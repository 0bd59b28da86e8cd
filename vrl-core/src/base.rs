//! Core functionalities.
mod agent;
mod config;
mod env;
mod obs;
mod policy;
mod step;
pub use agent::Agent;
pub use config::Configurable;
pub use env::Env;
pub use obs::{Obs, Space};
pub use policy::{ActionValues, Policy};
pub use step::{Step, Transition};
