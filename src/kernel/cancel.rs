use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::time::{Cadence, Tick};

/// Owns the driver task of one simulator together with its cancellation token.
///
/// The registry only tears the task down. Guaranteeing that no tick lands
/// after a stop is the job of the `EpochCell` the tick writes into.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    label: &'static str,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl TimerRegistry {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            token: None,
            handle: None,
        }
    }

    /// Spawns a driver that walks `cadence` and calls `on_tick` at each tick.
    /// The driver exits when cancelled or when `on_tick` returns `false`
    /// (its ticket went stale). Any previous driver is cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_cadence<F>(&mut self, cadence: Cadence, mut on_tick: F)
    where
        F: FnMut(Tick) -> bool + Send + 'static,
    {
        self.cancel_all();

        let token = CancellationToken::new();
        let child = token.clone();
        let label = self.label;

        let handle = tokio::spawn(async move {
            let origin = Instant::now();
            for tick in cadence {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => break,
                    _ = sleep_until(origin + tick.offset) => {}
                }
                if !on_tick(tick) {
                    debug!("{} driver: stale ticket at {:?}, exiting", label, tick.kind);
                    break;
                }
            }
        });

        self.token = Some(token);
        self.handle = Some(handle);
    }

    /// Cancels and aborts the driver. Idempotent. Returns whether a driver was live.
    pub fn cancel_all(&mut self) -> bool {
        let mut live = false;
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            live = !handle.is_finished();
            handle.abort();
        }
        live
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
