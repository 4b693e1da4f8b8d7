//! Simulated utilization sampler behind the Metrics panel.

pub mod sample;
pub mod sampler;

pub use sample::*;
pub use sampler::*;
