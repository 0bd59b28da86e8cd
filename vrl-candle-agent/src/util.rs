//! Utilities.
use anyhow::{anyhow, Context, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarMap;
use log::trace;
use vrl_core::{error::VrlError, Obs};

/// Interface for handling input dimensions.
pub trait InDim {
    /// Returns the input dimension.
    fn get_in_dim(&self) -> usize;
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: usize);
}

/// Overwrites every variable of `dest` with the value of the same-named variable of `src`.
///
/// After the call both maps hold bit-identical parameters.
pub fn sync(dest: &VarMap, src: &VarMap) -> Result<()> {
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (name, v_dest) in dest.iter() {
        trace!("sync {}", name);
        let v_src = src
            .get(name)
            .with_context(|| format!("Variable {} is not in the source", name))?;
        v_dest.set(v_src.as_tensor())?;
    }

    Ok(())
}

/// Converts an observation into an input vector of length `in_dim`.
///
/// Continuous observations pass through; a discrete state becomes a one-hot vector.
pub fn obs_to_vec(obs: &Obs, in_dim: usize) -> Result<Vec<f32>, VrlError> {
    match obs {
        Obs::Continuous(v) => {
            if v.len() != in_dim {
                return Err(VrlError::ObsDimMismatch {
                    expected: in_dim,
                    actual: v.len(),
                });
            }
            Ok(v.clone())
        }
        Obs::Discrete(_) => {
            let s = obs.index_within(in_dim)?;
            let mut v = vec![0.0; in_dim];
            v[s] = 1.0;
            Ok(v)
        }
    }
}

/// Stacks observations into a tensor of shape `(n, in_dim)`.
pub fn obs_batch<'a>(
    obs: impl IntoIterator<Item = &'a Obs>,
    in_dim: usize,
    device: &Device,
) -> Result<Tensor> {
    let mut data = vec![];
    let mut n = 0;
    for o in obs {
        data.extend(obs_to_vec(o, in_dim)?);
        n += 1;
    }
    Ok(Tensor::from_vec(data, (n, in_dim), device)?)
}
