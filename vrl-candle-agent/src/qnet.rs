//! Action-value network with its own parameters and optimizer.
use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{obs_batch, sync, InDim, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use vrl_core::{ActionValues, Obs};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`QNetwork`].
#[serde(default)]
pub struct QNetworkConfig<Q> {
    pub(crate) q_config: Option<Q>,
    pub(crate) opt_config: OptimizerConfig,
}

impl<Q> Default for QNetworkConfig<Q> {
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> QNetworkConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: usize) -> Self {
        if let Some(q_config) = &mut self.q_config {
            q_config.set_out_dim(v);
        }
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`QNetworkConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QNetworkConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// An action-value function `Q: R^in_dim -> R^n_actions` owning its [`VarMap`].
pub struct QNetwork<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
{
    device: Device,
    varmap: VarMap,
    in_dim: usize,
    out_dim: usize,
    q: Q,
    opt: Optimizer,
}

impl<Q> QNetwork<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    /// Constructs [`QNetwork`] with freshly initialized parameters.
    pub fn build(config: QNetworkConfig<Q::Config>, device: Device) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let in_dim = q_config.get_in_dim();
        let out_dim = q_config.get_out_dim();
        vrl_core::error::ensure_config(in_dim > 0, "in_dim of the Q network must be positive")?;
        vrl_core::error::ensure_config(out_dim > 0, "out_dim of the Q network must be positive")?;

        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, q_config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            device,
            varmap,
            in_dim,
            out_dim,
            q,
            opt,
        })
    }

    /// Outputs the action values of a batch of inputs of shape `(n, in_dim)`.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.q.forward(xs)
    }

    /// Stacks observations into an input batch.
    pub fn input(&self, obs: &[&Obs]) -> Result<Tensor> {
        obs_batch(obs.iter().copied(), self.in_dim, &self.device)
    }

    /// Applies one optimization step on `loss`.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Overwrites the parameters with an exact copy of those of `src`.
    pub fn copy_from(&mut self, src: &Self) -> Result<()> {
        sync(&self.varmap, &src.varmap)
    }

    /// Parameters.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Device of the parameters.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Input dimension.
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save qnet to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters saved with [`QNetwork::save`].
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load qnet from {:?}", path.as_ref());
        Ok(())
    }
}

impl<Q> ActionValues for QNetwork<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    fn n_actions(&self) -> usize {
        self.out_dim
    }

    fn action_values(&self, obs: &Obs) -> Result<Vec<f32>> {
        let xs = self.input(&[obs])?;
        let values = self.forward(&xs)?.detach().squeeze(0)?;
        Ok(values.to_vec1::<f32>()?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mlp::{Mlp, MlpConfig};
    use tempdir::TempDir;

    fn config() -> QNetworkConfig<MlpConfig> {
        QNetworkConfig::default().q_config(MlpConfig::new(2, vec![4], 3, false))
    }

    #[test]
    fn test_action_values() -> Result<()> {
        let qnet = QNetwork::<Mlp>::build(config(), Device::Cpu)?;
        let values = qnet.action_values(&Obs::Discrete(1))?;
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v.is_finite()));
        assert!(qnet.action_values(&Obs::Continuous(vec![0.0])).is_err());
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let src = QNetwork::<Mlp>::build(config(), Device::Cpu)?;
        let mut dest = QNetwork::<Mlp>::build(config(), Device::Cpu)?;

        let dir = TempDir::new("qnet")?;
        let path = dir.path().join("qnet.safetensors");
        src.save(&path)?;
        dest.load(&path)?;

        let obs = Obs::Continuous(vec![0.3, -0.7]);
        assert_eq!(src.action_values(&obs)?, dest.action_values(&obs)?);
        Ok(())
    }

    #[test]
    fn test_q_config_must_be_set() {
        let config = QNetworkConfig::<MlpConfig>::default();
        assert!(QNetwork::<Mlp>::build(config, Device::Cpu).is_err());
    }
}
