pub mod config;
pub mod error;
pub mod feed;
pub mod kernel;
pub mod metrics;
pub mod session;

// Re-export specific items for convenient access
pub use config::DashboardConfig;
pub use error::{MiftahError, Result};
pub use feed::ActivityFeedSimulator;
pub use metrics::MetricsSampler;
pub use session::SessionGate;
