//! Levenberg-Marquardt identification of general recurrent neural networks
//! with tapped delay lines: a directed graph of neurons whose instantaneous
//! edges form a DAG and whose delayed edges may feed back arbitrarily.

pub mod errors;
pub mod graph;
pub mod linalg;
pub mod rng;
pub mod signals;
pub mod system;
pub mod train;

pub use errors::{NetError, NetResult};
pub use graph::Graph;
pub use rng::Rng;
pub use system::TrainableSystem;
