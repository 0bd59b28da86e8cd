//! Monte Carlo control.
//!
//! Both agents buffer an episode and learn from it when a terminal
//! transition arrives, or at [`Agent::end_episode`](vrl_core::Agent::end_episode)
//! when the episode was truncated.
mod base;
mod config;
mod off_policy;
mod on_policy;
pub use base::{Credit, EpisodeBuffer, EpisodeStep};
pub use config::MonteCarloConfig;
pub use off_policy::OffPolicyMonteCarlo;
pub use on_policy::MonteCarlo;
