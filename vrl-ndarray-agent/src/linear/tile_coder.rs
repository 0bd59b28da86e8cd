//! Tile coding of continuous observations.
use anyhow::Result;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use vrl_core::{
    error::{ensure_config, VrlError},
    Space,
};

/// Configuration of [`TileCoder`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TileCoderConfig {
    /// Lower bounds of the observation space.
    pub low: Vec<f32>,

    /// Upper bounds of the observation space.
    pub high: Vec<f32>,

    /// Number of tilings.
    pub num_tilings: usize,

    /// Number of tiles per dimension.
    pub num_tiles: usize,

    /// Factor applied to both bounds.
    pub scale_factor: f32,

    /// Random seed for the tiling offsets.
    pub seed: u64,
}

impl Default for TileCoderConfig {
    fn default() -> Self {
        Self {
            low: vec![],
            high: vec![],
            num_tilings: 8,
            num_tiles: 8,
            scale_factor: 1.0,
            seed: 42,
        }
    }
}

impl TileCoderConfig {
    /// Sets the bounds of the observation space.
    pub fn bounds(mut self, low: Vec<f32>, high: Vec<f32>) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Sets the bounds from a box space.
    ///
    /// Fails with [`VrlError::InvalidStateType`] for a discrete space.
    pub fn space(self, space: &Space) -> Result<Self> {
        match space {
            Space::Box { low, high } => Ok(self.bounds(low.clone(), high.clone())),
            Space::Discrete(_) => Err(VrlError::InvalidStateType {
                expected: "continuous",
            }
            .into()),
        }
    }

    /// Sets the number of tilings.
    pub fn num_tilings(mut self, v: usize) -> Self {
        self.num_tilings = v;
        self
    }

    /// Sets the number of tiles per dimension.
    pub fn num_tiles(mut self, v: usize) -> Self {
        self.num_tiles = v;
        self
    }

    /// Sets the scale factor of the bounds.
    pub fn scale_factor(mut self, v: f32) -> Self {
        self.scale_factor = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }
}

/// Maps a continuous observation to one active feature per tiling.
///
/// Each tiling is a grid of `num_tiles^d` cells shifted by its own random
/// offset in `[0, 1/num_tiles)` per dimension. Tiling `t` owns the feature
/// indices `[t * num_tiles^d, (t + 1) * num_tiles^d)`.
#[derive(Clone, Debug)]
pub struct TileCoder {
    low: Vec<f32>,
    high: Vec<f32>,
    num_tilings: usize,
    num_tiles: usize,
    tiles_per_tiling: usize,
    offsets: Vec<Vec<f32>>,
}

impl TileCoder {
    /// Builds a tile coder, drawing the offsets from `config.seed`.
    pub fn build(config: &TileCoderConfig) -> Result<Self> {
        let dim = config.low.len();
        ensure_config(dim > 0, "tile coder bounds must not be empty")?;
        ensure_config(
            config.high.len() == dim,
            format!(
                "tile coder bounds have different lengths: {} and {}",
                dim,
                config.high.len()
            ),
        )?;
        ensure_config(config.num_tilings > 0, "num_tilings must be positive")?;
        ensure_config(config.num_tiles > 0, "num_tiles must be positive")?;
        ensure_config(
            config.scale_factor.is_finite() && config.scale_factor > 0.0,
            format!("scale_factor must be positive, got {}", config.scale_factor),
        )?;

        let low: Vec<f32> = config.low.iter().map(|v| v * config.scale_factor).collect();
        let high: Vec<f32> = config.high.iter().map(|v| v * config.scale_factor).collect();
        for (l, h) in low.iter().zip(high.iter()) {
            ensure_config(
                l.is_finite() && h.is_finite() && h > l,
                format!("tile coder bounds must be finite with high > low, got [{}, {}]", l, h),
            )?;
        }

        let tiles_per_tiling = u32::try_from(dim)
            .ok()
            .and_then(|d| config.num_tiles.checked_pow(d))
            .filter(|n| n.checked_mul(config.num_tilings).is_some())
            .ok_or_else(|| VrlError::InvalidConfig("too many tile coder features".into()))?;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let width = 1.0 / config.num_tiles as f32;
        let offsets = (0..config.num_tilings)
            .map(|_| (0..dim).map(|_| rng.gen_range(0.0..width)).collect())
            .collect();

        Ok(Self {
            low,
            high,
            num_tilings: config.num_tilings,
            num_tiles: config.num_tiles,
            tiles_per_tiling,
            offsets,
        })
    }

    /// Dimension of observations.
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Number of tilings, the length of every encoding.
    pub fn num_tilings(&self) -> usize {
        self.num_tilings
    }

    /// Size of the feature space, `num_tilings * num_tiles^d`.
    pub fn n_features(&self) -> usize {
        self.num_tilings * self.tiles_per_tiling
    }

    /// Returns the active feature of each tiling for `obs`.
    pub fn encode(&self, obs: &[f32]) -> Result<Vec<usize>, VrlError> {
        if obs.len() != self.dim() {
            return Err(VrlError::ObsDimMismatch {
                expected: self.dim(),
                actual: obs.len(),
            });
        }
        if obs.iter().any(|v| !v.is_finite()) {
            return Err(VrlError::NonFiniteObservation);
        }

        let k = self.num_tiles as f32;
        let norm: Vec<f32> = obs
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(x, (l, h))| k * (x - l) / (h - l))
            .collect();

        let features = self
            .offsets
            .iter()
            .enumerate()
            .map(|(t, offset)| {
                let mut index = 0;
                let mut radix = 1;
                for (x, off) in norm.iter().zip(offset.iter()) {
                    let coord = ((x + off).floor() as i64).rem_euclid(self.num_tiles as i64);
                    index += coord as usize * radix;
                    radix *= self.num_tiles;
                }
                t * self.tiles_per_tiling + index
            })
            .collect();

        Ok(features)
    }
}
