//! Action-value table.
use anyhow::Result;
use ndarray::Array2;
use vrl_core::{error::VrlError, ActionValues, Obs};

/// Dense `(n_states, n_actions)` table of action values.
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    q: Array2<f32>,
}

impl QTable {
    /// Creates a table with every entry set to `init_value`.
    pub fn new(n_states: usize, n_actions: usize, init_value: f32) -> Self {
        Self {
            q: Array2::from_elem((n_states, n_actions), init_value),
        }
    }

    /// Number of states.
    pub fn n_states(&self) -> usize {
        self.q.nrows()
    }

    /// Returns the underlying array.
    pub fn as_array(&self) -> &Array2<f32> {
        &self.q
    }

    /// Validates a state-action pair against the table shape.
    pub fn check(&self, obs: &Obs, act: usize) -> Result<usize, VrlError> {
        let s = obs.index_within(self.n_states())?;
        if act >= self.q.ncols() {
            return Err(VrlError::ActionOutOfRange {
                action: act,
                n_actions: self.q.ncols(),
            });
        }
        Ok(s)
    }

    /// Value of a pair.
    pub fn get(&self, s: usize, a: usize) -> f32 {
        self.q[[s, a]]
    }

    /// Maximum value at state `s`.
    pub fn max(&self, s: usize) -> f32 {
        self.q
            .row(s)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Greedy action at state `s`, the first index among ties.
    pub fn argmax(&self, s: usize) -> usize {
        vrl_core::util::argmax(&self.q.row(s).to_vec())
    }

    /// Moves `Q[s, a]` toward `target` by `step` and returns the TD error.
    pub fn step_toward(&mut self, s: usize, a: usize, target: f32, step: f32) -> f32 {
        let td_error = target - self.q[[s, a]];
        self.q[[s, a]] += step * td_error;
        td_error
    }
}

impl ActionValues for QTable {
    fn n_actions(&self) -> usize {
        self.q.ncols()
    }

    fn action_values(&self, obs: &Obs) -> Result<Vec<f32>> {
        let s = obs.index_within(self.n_states())?;
        Ok(self.q.row(s).to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_step_toward() {
        let mut q = QTable::new(2, 3, 0.5);
        let td = q.step_toward(1, 2, 1.5, 0.5);
        assert_eq!(td, 1.0);
        assert_eq!(q.get(1, 2), 1.0);
        assert_eq!(q.argmax(1), 2);
        assert_eq!(q.max(0), 0.5);
        assert_eq!(q.as_array().dim(), (2, 3));
    }

    #[test]
    fn test_continuous_obs_is_rejected() {
        let q = QTable::new(2, 2, 0.0);
        let err = q.action_values(&Obs::Continuous(vec![0.1])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<VrlError>(),
            Some(&VrlError::InvalidStateType {
                expected: "discrete"
            })
        );
        assert!(q.check(&Obs::Discrete(0), 2).is_err());
    }
}
