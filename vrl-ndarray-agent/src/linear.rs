//! Linear function approximation.
mod config;
mod features;
mod linear_q;
mod semi_gradient_sarsa;
mod tile_coder;
pub use config::LinearConfig;
pub use features::{Feature, FeatureConfig, FeatureEncoder};
pub use linear_q::LinearQ;
pub use semi_gradient_sarsa::SemiGradientSarsa;
pub use tile_coder::{TileCoder, TileCoderConfig};
