use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::buffer::{ActivityBuffer, LevelFilter};
use super::generator::ActivityGenerator;
use super::record::{LevelCounts, LogRecord};
use crate::config::FeedConfig;
use crate::error::Result;
use crate::kernel::{Cadence, EpochCell, TimerRegistry};

const PUSH_CHANNEL_CAPACITY: usize = 256;

struct FeedState<R> {
    generator: ActivityGenerator<R>,
    buffer: ActivityBuffer,
    generated: u64,
}

/// Drives the Logs panel: one synthesized record per tick into a bounded,
/// newest-first buffer.
///
/// The simulator is owned by whoever mounts the panel. Dropping it stops the
/// driver. `start`, `resume` and `start_with` must run inside a tokio runtime.
pub struct ActivityFeedSimulator<R = StdRng> {
    config: FeedConfig,
    cell: Arc<EpochCell<FeedState<R>>>,
    timers: TimerRegistry,
    publisher: broadcast::Sender<LogRecord>,
}

impl ActivityFeedSimulator<StdRng> {
    /// Seeded from `config.seed` when present, from OS entropy otherwise.
    pub fn new(config: FeedConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R> ActivityFeedSimulator<R>
where
    R: Rng + Send + Sync + 'static,
{
    pub fn with_rng(config: FeedConfig, rng: R) -> Self {
        let (publisher, _) = broadcast::channel(PUSH_CHANNEL_CAPACITY);
        let state = FeedState {
            generator: ActivityGenerator::new(rng),
            buffer: ActivityBuffer::new(config.capacity),
            generated: 0,
        };
        Self {
            config,
            cell: Arc::new(EpochCell::new(state)),
            timers: TimerRegistry::new("activity-feed"),
            publisher,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Warm-up burst followed by the steady cadence. Restarts a running feed.
    pub fn start(&mut self) {
        info!(
            "Activity feed starting: every {}ms, capacity {}, warm-up {}x{}ms",
            self.config.interval_ms,
            self.config.capacity,
            self.config.warmup_count,
            self.config.warmup_spacing_ms
        );
        self.arm(self.config.cadence());
    }

    /// Re-parameterizes and starts. Shrinking the capacity evicts at once.
    pub fn start_with(&mut self, interval: Duration, capacity: usize) -> Result<()> {
        let mut config = self.config.clone();
        config.interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        config.capacity = capacity;
        config.validate()?;

        self.cell.update(|state| state.buffer.set_capacity(capacity));
        self.config = config;
        self.start();
        Ok(())
    }

    /// Stops production. Idempotent; nothing is written after this returns.
    pub fn stop(&mut self) {
        let was_armed = self.cell.disarm();
        self.timers.cancel_all();
        if was_armed {
            info!("Activity feed stopped after {} records", self.generated());
        }
    }

    /// Auto-refresh off: halts ticks but keeps the buffer.
    pub fn pause(&mut self) {
        if self.cell.disarm() {
            info!("Activity feed paused");
        }
        self.timers.cancel_all();
    }

    /// Auto-refresh on: steady cadence only, no new warm-up burst.
    pub fn resume(&mut self) {
        info!("Activity feed resumed: every {}ms", self.config.interval_ms);
        self.arm(self.config.steady_cadence());
    }

    pub fn is_running(&self) -> bool {
        self.cell.is_armed() && self.timers.is_active()
    }

    fn arm(&mut self, cadence: Cadence) {
        self.timers.cancel_all();
        let ticket = self.cell.arm();
        let cell = Arc::clone(&self.cell);
        let publisher = self.publisher.clone();

        self.timers.spawn_cadence(cadence, move |tick| {
            let accepted = cell.apply(ticket, |state| {
                let record = state.generator.next_record(Utc::now());
                state.buffer.push(record.clone());
                state.generated += 1;
                // No subscribers is fine.
                let _ = publisher.send(record.clone());
                record
            });

            match accepted {
                Some(record) => {
                    debug!("Feed tick {:?}: {}", tick.kind, record);
                    true
                }
                None => false,
            }
        });
    }

    /// Buffer filtered by level and by a case-insensitive search over
    /// message and module. Newest first.
    pub fn get_visible(&self, filter: LevelFilter, search: &str) -> Vec<LogRecord> {
        self.cell.read(|state| state.buffer.visible(filter, search))
    }

    /// String form of the level selector. An unknown level matches nothing.
    pub fn get_visible_str(&self, filter: &str, search: &str) -> Vec<LogRecord> {
        match filter.parse::<LevelFilter>() {
            Ok(filter) => self.get_visible(filter, search),
            Err(e) => {
                debug!("{}", e);
                Vec::new()
            }
        }
    }

    pub fn level_counts(&self) -> LevelCounts {
        self.cell.read(|state| state.buffer.level_counts())
    }

    pub fn len(&self) -> usize {
        self.cell.read(|state| state.buffer.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn head(&self) -> Option<LogRecord> {
        self.cell.read(|state| state.buffer.head().cloned())
    }

    /// Records accepted since construction, including evicted ones.
    pub fn generated(&self) -> u64 {
        self.cell.read(|state| state.generated)
    }

    /// Every accepted record, as it is generated.
    pub fn subscribe(&self) -> broadcast::Receiver<LogRecord> {
        self.publisher.subscribe()
    }

    /// Current buffer as a JSON array, newest first.
    pub fn export_json(&self) -> Result<String> {
        let records = self.get_visible(LevelFilter::All, "");
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

impl<R> Drop for ActivityFeedSimulator<R> {
    fn drop(&mut self) {
        self.cell.disarm();
        self.timers.cancel_all();
    }
}
