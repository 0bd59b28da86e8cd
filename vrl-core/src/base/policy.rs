//! Action-selection policy.
use super::Obs;
use anyhow::Result;

/// A source of action values at a state.
///
/// Each value representation (Q table, linear weights, Q network)
/// implements this trait once, so that a [`Policy`] never needs to know
/// how the values are computed.
pub trait ActionValues {
    /// Number of actions.
    fn n_actions(&self) -> usize;

    /// Returns the value of every action at `obs`.
    fn action_values(&self, obs: &Obs) -> Result<Vec<f32>>;

    /// Returns the value of `act` at `obs`.
    fn action_value(&self, obs: &Obs, act: usize) -> Result<f32> {
        let values = self.action_values(obs)?;
        values.get(act).copied().ok_or_else(|| {
            crate::error::VrlError::ActionOutOfRange {
                action: act,
                n_actions: values.len(),
            }
            .into()
        })
    }
}

/// A stochastic mapping from action values to actions.
pub trait Policy {
    /// Returns the probability of each action at `obs`.
    ///
    /// The returned vector is non-negative and sums to one.
    fn action_probs(&self, obs: &Obs, values: &dyn ActionValues) -> Result<Vec<f32>>;

    /// Samples an action from [`Policy::action_probs`].
    fn select_action(&mut self, obs: &Obs, values: &dyn ActionValues) -> Result<usize>;

    /// Decays the amount of exploration.
    fn decay(&mut self);
}
