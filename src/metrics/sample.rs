use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_PERCENT: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Processor,
    Memory,
    Network,
    Storage,
}

impl MetricKind {
    /// Display order of the metric cards.
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Processor,
        MetricKind::Memory,
        MetricKind::Network,
        MetricKind::Storage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Processor => "CPU Usage",
            MetricKind::Memory => "Memory",
            MetricKind::Network => "Network",
            MetricKind::Storage => "Storage",
        }
    }
}

/// Colour band of a utilization bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricLoad {
    Nominal,
    Elevated,
    Critical,
}

impl MetricLoad {
    pub fn classify(percent: u8) -> Self {
        match percent {
            p if p > 80 => MetricLoad::Critical,
            p if p > 60 => MetricLoad::Elevated,
            _ => MetricLoad::Nominal,
        }
    }
}

/// Latest utilization reading, each field a percentage in `0..=100`.
/// The default (all zeros) stands in until the first tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricSample {
    pub processor: u8,
    pub memory: u8,
    pub network: u8,
    pub storage: u8,
}

impl MetricSample {
    /// Independent uniform draws. No continuity with any earlier sample.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            processor: rng.gen_range(0..=MAX_PERCENT),
            memory: rng.gen_range(0..=MAX_PERCENT),
            network: rng.gen_range(0..=MAX_PERCENT),
            storage: rng.gen_range(0..=MAX_PERCENT),
        }
    }

    pub fn get(&self, kind: MetricKind) -> u8 {
        match kind {
            MetricKind::Processor => self.processor,
            MetricKind::Memory => self.memory,
            MetricKind::Network => self.network,
            MetricKind::Storage => self.storage,
        }
    }

    pub fn load(&self, kind: MetricKind) -> MetricLoad {
        MetricLoad::classify(self.get(kind))
    }

    pub fn fields(&self) -> impl Iterator<Item = (MetricKind, u8)> + '_ {
        MetricKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

impl fmt::Display for MetricSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU {}% | MEM {}% | NET {}% | DISK {}%",
            self.processor, self.memory, self.network, self.storage
        )
    }
}
