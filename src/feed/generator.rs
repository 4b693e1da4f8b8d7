use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Builder;

use super::record::{LogLevel, LogModule, LogRecord, MESSAGE_POOL};

const ENCRYPTED_THRESHOLD: f64 = 0.7;

/// Draws log records from an injected random source.
#[derive(Debug, Clone)]
pub struct ActivityGenerator<R> {
    rng: R,
    last_timestamp: Option<DateTime<Utc>>,
}

impl<R: Rng> ActivityGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            last_timestamp: None,
        }
    }

    /// Builds the next record stamped at `now`.
    ///
    /// Timestamps never go backwards: a wall clock that stepped back is
    /// clamped to the previous record's timestamp.
    pub fn next_record(&mut self, now: DateTime<Utc>) -> LogRecord {
        let timestamp = match self.last_timestamp {
            Some(last) if now < last => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);

        let id = Builder::from_random_bytes(self.rng.gen()).into_uuid();
        let level = LogLevel::ALL[self.rng.gen_range(0..LogLevel::ALL.len())];
        let module = LogModule::ALL[self.rng.gen_range(0..LogModule::ALL.len())];
        let message = MESSAGE_POOL[self.rng.gen_range(0..MESSAGE_POOL.len())];
        let encrypted = self.rng.gen::<f64>() > ENCRYPTED_THRESHOLD;

        LogRecord {
            id,
            timestamp,
            level,
            module,
            message,
            encrypted,
        }
    }
}
