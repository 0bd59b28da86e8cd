//! Feature vectors of observations.
use super::{TileCoder, TileCoderConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use vrl_core::{
    error::{ensure_config, VrlError},
    Obs,
};

/// A non-zero feature: its index and its value.
pub type Feature = (usize, f32);

/// Configuration of [`FeatureEncoder`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum FeatureConfig {
    /// One feature per discrete state.
    OneHot {
        /// Number of discrete states.
        n_states: usize,
    },

    /// Tile coding of continuous observations.
    TileCoding(TileCoderConfig),

    /// Continuous observations used as a dense feature vector.
    Raw {
        /// Dimension of the observations.
        dim: usize,
    },
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::TileCoding(TileCoderConfig::default())
    }
}

/// Maps an observation to its non-zero features.
#[derive(Clone, Debug)]
pub enum FeatureEncoder {
    /// Discrete state `s` activates feature `s` only.
    OneHot {
        /// Number of discrete states.
        n_states: usize,
    },

    /// Continuous observations are tile coded. Every active tile has value 1.
    TileCoding(TileCoder),

    /// Component `i` of a continuous observation is the value of feature `i`.
    Raw {
        /// Dimension of the observations.
        dim: usize,
    },
}

impl FeatureEncoder {
    /// Builds the encoder.
    pub fn build(config: &FeatureConfig) -> Result<Self> {
        match config {
            FeatureConfig::OneHot { n_states } => {
                ensure_config(*n_states > 0, "n_states must be positive")?;
                Ok(Self::OneHot {
                    n_states: *n_states,
                })
            }
            FeatureConfig::TileCoding(config) => Ok(Self::TileCoding(TileCoder::build(config)?)),
            FeatureConfig::Raw { dim } => {
                ensure_config(*dim > 0, "dim must be positive")?;
                Ok(Self::Raw { dim: *dim })
            }
        }
    }

    /// Size of the feature space.
    pub fn n_features(&self) -> usize {
        match self {
            Self::OneHot { n_states } => *n_states,
            Self::TileCoding(coder) => coder.n_features(),
            Self::Raw { dim } => *dim,
        }
    }

    /// Returns the features of `obs`. Features not listed are zero.
    pub fn active_features(&self, obs: &Obs) -> Result<Vec<Feature>> {
        match self {
            Self::OneHot { n_states } => Ok(vec![(obs.index_within(*n_states)?, 1.0)]),
            Self::TileCoding(coder) => Ok(coder
                .encode(obs.values()?)?
                .into_iter()
                .map(|f| (f, 1.0))
                .collect()),
            Self::Raw { dim } => {
                let values = obs.values()?;
                if values.len() != *dim {
                    return Err(VrlError::ObsDimMismatch {
                        expected: *dim,
                        actual: values.len(),
                    }
                    .into());
                }
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(VrlError::NonFiniteObservation.into());
                }
                Ok(values.iter().copied().enumerate().collect())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_obs_kind_must_match_encoder() {
        let one_hot = FeatureEncoder::build(&FeatureConfig::OneHot { n_states: 4 }).unwrap();
        assert_eq!(
            one_hot.active_features(&Obs::Discrete(2)).unwrap(),
            vec![(2, 1.0)]
        );
        let err = one_hot
            .active_features(&Obs::Continuous(vec![0.0]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VrlError>(),
            Some(VrlError::InvalidStateType { .. })
        ));

        let tiles = FeatureEncoder::build(&FeatureConfig::TileCoding(
            TileCoderConfig::default().bounds(vec![0.0], vec![1.0]),
        ))
        .unwrap();
        assert_eq!(tiles.n_features(), 64);
        assert!(tiles.active_features(&Obs::Discrete(0)).is_err());
    }

    #[test]
    fn test_raw_features() {
        let raw = FeatureEncoder::build(&FeatureConfig::Raw { dim: 2 }).unwrap();
        assert_eq!(raw.n_features(), 2);
        assert_eq!(
            raw.active_features(&Obs::Continuous(vec![0.5, -2.0]))
                .unwrap(),
            vec![(0, 0.5), (1, -2.0)]
        );

        let err = raw
            .active_features(&Obs::Continuous(vec![0.5]))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<VrlError>(),
            Some(&VrlError::ObsDimMismatch {
                expected: 2,
                actual: 1
            })
        );
        let err = raw
            .active_features(&Obs::Continuous(vec![f32::INFINITY, 0.0]))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<VrlError>(),
            Some(&VrlError::NonFiniteObservation)
        );
        assert!(FeatureEncoder::build(&FeatureConfig::Raw { dim: 0 }).is_err());
    }
}
