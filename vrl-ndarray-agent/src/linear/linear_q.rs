//! Linear action values.
use super::{Feature, FeatureEncoder};
use anyhow::Result;
use ndarray::Array2;
use vrl_core::{ActionValues, Obs};

/// `Q(s, a) = sum of W[f, a] * x_f over the non-zero features (f, x_f) of s`.
#[derive(Clone, Debug)]
pub struct LinearQ {
    encoder: FeatureEncoder,
    w: Array2<f32>,
}

impl LinearQ {
    /// Creates zero weights of shape `(encoder.n_features(), n_actions)`.
    pub fn new(encoder: FeatureEncoder, n_actions: usize) -> Self {
        let w = Array2::zeros((encoder.n_features(), n_actions));
        Self { encoder, w }
    }

    /// Weight matrix.
    pub fn weights(&self) -> &Array2<f32> {
        &self.w
    }

    /// Feature encoder.
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Non-zero features of `obs`.
    pub fn features(&self, obs: &Obs) -> Result<Vec<Feature>> {
        self.encoder.active_features(obs)
    }

    /// Value of action `a` for the given features.
    pub fn value(&self, features: &[Feature], a: usize) -> f32 {
        features.iter().map(|(f, x)| self.w[[*f, a]] * x).sum()
    }

    /// Adds `delta * x_f` to `W[f, a]`, the gradient step of [`LinearQ::value`].
    pub fn add(&mut self, features: &[Feature], a: usize, delta: f32) {
        for (f, x) in features {
            self.w[[*f, a]] += delta * x;
        }
    }
}

impl ActionValues for LinearQ {
    fn n_actions(&self) -> usize {
        self.w.ncols()
    }

    fn action_values(&self, obs: &Obs) -> Result<Vec<f32>> {
        let features = self.features(obs)?;
        Ok((0..self.n_actions())
            .map(|a| self.value(&features, a))
            .collect())
    }
}
