//! Simulated activity feed behind the Logs panel.

pub mod buffer;
pub mod generator;
pub mod record;
pub mod simulator;

pub use buffer::*;
pub use generator::*;
pub use record::*;
pub use simulator::*;
