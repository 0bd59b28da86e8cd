//! Neural value-based agents implemented with [candle](https://crates.io/crates/candle-core).
//!
//! * [`dqn::Dqn`]: Q-learning with experience replay and a target network.
//! * [`sarsa::NeuralSarsa`]: semi-gradient SARSA on single transitions.
pub mod dqn;
pub mod mlp;
pub mod model;
pub mod opt;
mod qnet;
pub mod sarsa;
pub mod util;
pub use qnet::{QNetwork, QNetworkConfig};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Default)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    #[default]
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
