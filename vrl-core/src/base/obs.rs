//! Observations and spaces.
use crate::error::VrlError;
use serde::{Deserialize, Serialize};

/// An observation of an environment.
///
/// Tabular value representations index a table with [`Obs::Discrete`];
/// tile coders and neural networks consume [`Obs::Continuous`] vectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Obs {
    /// Index of a discrete state in `[0, n_states)`.
    Discrete(usize),

    /// A fixed-length numeric vector.
    Continuous(Vec<f32>),
}

impl Obs {
    /// Returns the state index.
    ///
    /// Fails with [`VrlError::InvalidStateType`] for continuous observations.
    pub fn index(&self) -> Result<usize, VrlError> {
        match self {
            Self::Discrete(s) => Ok(*s),
            Self::Continuous(_) => Err(VrlError::InvalidStateType {
                expected: "discrete",
            }),
        }
    }

    /// Returns the state index, checked against the number of states.
    pub fn index_within(&self, n_states: usize) -> Result<usize, VrlError> {
        let state = self.index()?;
        if state < n_states {
            Ok(state)
        } else {
            Err(VrlError::StateOutOfRange { state, n_states })
        }
    }

    /// Returns the observation vector.
    ///
    /// Fails with [`VrlError::InvalidStateType`] for discrete observations.
    pub fn values(&self) -> Result<&[f32], VrlError> {
        match self {
            Self::Continuous(v) => Ok(v.as_slice()),
            Self::Discrete(_) => Err(VrlError::InvalidStateType {
                expected: "continuous",
            }),
        }
    }
}

impl From<usize> for Obs {
    fn from(s: usize) -> Self {
        Self::Discrete(s)
    }
}

impl From<Vec<f32>> for Obs {
    fn from(v: Vec<f32>) -> Self {
        Self::Continuous(v)
    }
}

/// Observation or action space of an environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// `n` discrete elements.
    Discrete(usize),

    /// A box in `R^d` given by its per-dimension bounds.
    Box {
        /// Lower bounds.
        low: Vec<f32>,
        /// Upper bounds.
        high: Vec<f32>,
    },
}

impl Space {
    /// Cardinality of a discrete space, `None` for a box.
    pub fn n(&self) -> Option<usize> {
        match self {
            Self::Discrete(n) => Some(*n),
            Self::Box { .. } => None,
        }
    }

    /// Dimension of a box, `None` for a discrete space.
    pub fn dim(&self) -> Option<usize> {
        match self {
            Self::Discrete(_) => None,
            Self::Box { low, .. } => Some(low.len()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_index_of_continuous_obs_fails() {
        let obs = Obs::Continuous(vec![0.5]);
        assert_eq!(
            obs.index(),
            Err(VrlError::InvalidStateType {
                expected: "discrete"
            })
        );
        assert_eq!(
            Obs::Discrete(3).index_within(3),
            Err(VrlError::StateOutOfRange {
                state: 3,
                n_states: 3
            })
        );
    }
}
