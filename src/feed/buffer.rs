use std::collections::VecDeque;
use std::str::FromStr;

use super::record::{LevelCounts, LogLevel, LogRecord, UnknownLevel};

/// Level selector of the Logs panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(LogLevel),
}

impl LevelFilter {
    pub fn accepts(&self, level: LogLevel) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(wanted) => *wanted == level,
        }
    }
}

impl FromStr for LevelFilter {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(LevelFilter::All);
        }
        s.parse().map(LevelFilter::Only)
    }
}

/// Bounded newest-first record buffer.
#[derive(Debug, Clone)]
pub struct ActivityBuffer {
    records: VecDeque<LogRecord>,
    capacity: usize,
}

impl ActivityBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shrinking evicts the oldest records immediately.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.records.truncate(capacity);
    }

    /// Prepends `record`, evicting from the tail past capacity.
    pub fn push(&mut self, record: LogRecord) {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn head(&self) -> Option<&LogRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records passing both filters, newest first.
    pub fn visible(&self, filter: LevelFilter, search: &str) -> Vec<LogRecord> {
        let needle = search.to_lowercase();
        self.records
            .iter()
            .filter(|r| filter.accepts(r.level) && r.matches_search(&needle))
            .cloned()
            .collect()
    }

    pub fn level_counts(&self) -> LevelCounts {
        let mut counts = LevelCounts::default();
        for record in &self.records {
            counts.bump(record.level);
        }
        counts
    }
}
