//! Optimizers of Q networks.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};
use vrl_core::error::ensure_config;

/// Optimizer of the parameters of a [`QNetwork`](crate::QNetwork).
///
/// Moment decay rates and epsilon take the defaults of `candle_nn` and
/// `candle_optimisers`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,
        /// Weight decay.
        #[serde(default = "default_weight_decay")]
        weight_decay: f64,
    },
}

fn default_weight_decay() -> f64 {
    ParamsAdamW::default().weight_decay
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 0.001 }
    }
}

impl OptimizerConfig {
    /// Learning rate.
    pub fn lr(&self) -> f64 {
        match self {
            Self::Adam { lr } | Self::AdamW { lr, .. } => *lr,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let lr = self.lr();
        ensure_config(
            lr > 0.0 && lr.is_finite(),
            format!("lr must be positive, got {}", lr),
        )?;
        if let Self::AdamW { weight_decay, .. } = self {
            ensure_config(
                *weight_decay >= 0.0,
                format!("weight_decay must be non-negative, got {}", weight_decay),
            )?;
        }
        Ok(())
    }

    /// Builds the optimizer over `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        self.validate()?;
        let opt = match *self {
            Self::Adam { lr } => Optimizer::Adam(Adam::new(
                vars,
                ParamsAdam {
                    lr,
                    ..ParamsAdam::default()
                },
            )?),
            Self::AdamW { lr, weight_decay } => Optimizer::AdamW(AdamW::new(
                vars,
                ParamsAdamW {
                    lr,
                    weight_decay,
                    ..ParamsAdamW::default()
                },
            )?),
        };
        Ok(opt)
    }
}

/// An optimizer built from [`OptimizerConfig`].
pub enum Optimizer {
    /// Adam of `candle_optimisers`.
    Adam(Adam),

    /// AdamW of `candle_nn`.
    AdamW(AdamW),
}

impl Optimizer {
    /// Computes the gradients of `loss` and updates the parameters once.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => opt.backward_step(loss)?,
            Self::AdamW(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::Device;

    /// Minimizes `(x - 3)^2` from `x = 0` and returns the final `x`.
    fn minimize(config: &OptimizerConfig) -> Result<f32> {
        let x = Var::new(&[0f32], &Device::Cpu)?;
        let mut opt = config.build(vec![x.clone()])?;
        for _ in 0..100 {
            let loss = (x.as_tensor() - 3.0)?.sqr()?.sum_all()?;
            opt.backward_step(&loss)?;
        }
        Ok(x.as_tensor().to_vec1::<f32>()?[0])
    }

    #[test]
    fn test_optimizers_reduce_loss() -> Result<()> {
        let adam = minimize(&OptimizerConfig::Adam { lr: 0.1 })?;
        let adamw = minimize(&OptimizerConfig::AdamW {
            lr: 0.1,
            weight_decay: 0.0,
        })?;
        assert!(adam > 2.0 && adam < 4.0, "adam: x = {}", adam);
        assert!(adamw > 2.0 && adamw < 4.0, "adamw: x = {}", adamw);
        Ok(())
    }

    #[test]
    fn test_optimizer_config_yaml() -> Result<()> {
        let config: OptimizerConfig = serde_yaml::from_str("AdamW:\n  lr: 0.01\n")?;
        assert_eq!(
            config,
            OptimizerConfig::AdamW {
                lr: 0.01,
                weight_decay: ParamsAdamW::default().weight_decay,
            }
        );
        assert_eq!(config.lr(), 0.01);
        assert_eq!(OptimizerConfig::default(), OptimizerConfig::Adam { lr: 0.001 });
        Ok(())
    }

    #[test]
    fn test_invalid_learning_rate() {
        assert!(OptimizerConfig::Adam { lr: 0.0 }.build(vec![]).is_err());
        assert!(OptimizerConfig::AdamW {
            lr: 0.01,
            weight_decay: -1.0
        }
        .build(vec![])
        .is_err());
    }
}
