use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use super::sample::MetricSample;
use crate::config::SamplerConfig;
use crate::kernel::{EpochCell, TimerRegistry};

struct SamplerState<R> {
    rng: R,
    current: MetricSample,
    taken: u64,
}

/// Drives the Metrics panel: replaces the live sample on every tick.
///
/// Same ownership rules as the activity feed: dropping stops the driver and
/// `start` needs a tokio runtime.
pub struct MetricsSampler<R = StdRng> {
    config: SamplerConfig,
    cell: Arc<EpochCell<SamplerState<R>>>,
    timers: TimerRegistry,
    publisher: Arc<watch::Sender<MetricSample>>,
}

impl MetricsSampler<StdRng> {
    pub fn new(config: SamplerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R> MetricsSampler<R>
where
    R: Rng + Send + Sync + 'static,
{
    pub fn with_rng(config: SamplerConfig, rng: R) -> Self {
        let (publisher, _) = watch::channel(MetricSample::default());
        Self {
            config,
            cell: Arc::new(EpochCell::new(SamplerState {
                rng,
                current: MetricSample::default(),
                taken: 0,
            })),
            timers: TimerRegistry::new("metrics-sampler"),
            publisher: Arc::new(publisher),
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Restarts a running sampler.
    pub fn start(&mut self) {
        info!(
            "Metrics sampler starting: every {}ms (sample on start: {})",
            self.config.interval_ms, self.config.sample_on_start
        );

        self.timers.cancel_all();
        let ticket = self.cell.arm();
        let cell = Arc::clone(&self.cell);
        let publisher = Arc::clone(&self.publisher);

        self.timers.spawn_cadence(self.config.cadence(), move |tick| {
            let accepted = cell.apply(ticket, |state| {
                let sample = MetricSample::random(&mut state.rng);
                state.current = sample;
                state.taken += 1;
                publisher.send_replace(sample);
                sample
            });

            match accepted {
                Some(sample) => {
                    debug!("Metrics tick {:?}: {}", tick.kind, sample);
                    true
                }
                None => false,
            }
        });
    }

    /// Idempotent; the sample is frozen once this returns.
    pub fn stop(&mut self) {
        let was_armed = self.cell.disarm();
        self.timers.cancel_all();
        if was_armed {
            info!("Metrics sampler stopped after {} samples", self.samples_taken());
        }
    }

    pub fn is_running(&self) -> bool {
        self.cell.is_armed() && self.timers.is_active()
    }

    /// Latest sample, all zeros before the first tick.
    pub fn current(&self) -> MetricSample {
        self.cell.read(|state| state.current)
    }

    pub fn samples_taken(&self) -> u64 {
        self.cell.read(|state| state.taken)
    }

    /// Watch channel carrying the latest sample.
    pub fn subscribe(&self) -> watch::Receiver<MetricSample> {
        self.publisher.subscribe()
    }
}

impl<R> Drop for MetricsSampler<R> {
    fn drop(&mut self) {
        self.cell.disarm();
        self.timers.cancel_all();
    }
}
