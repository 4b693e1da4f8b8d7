use std::time::Duration;

/// What kind of scheduled tick fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    /// Staggered start-up tick, numbered from 0.
    WarmUp(u32),
    /// Periodic tick, numbered from 1 (the first one lands one full period after arming).
    Steady(u64),
}

/// A tick relative to the instant the driver was armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tick {
    pub kind: TickKind,
    pub offset: Duration,
}

/// Floor applied to periods and spacings so a driver can never spin.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Tick timeline for one driver: an optional warm-up burst merged with a
/// steady period.
///
/// Warm-up tick `i` lands at `spacing * i`; steady tick `k` at `period * k`.
/// The iterator yields them merged in time order. On equal offsets the
/// warm-up tick comes first, so nothing is ever dropped.
#[derive(Debug, Clone)]
pub struct Cadence {
    period: Duration,
    warmup_count: u32,
    warmup_spacing: Duration,
    next_warmup: u32,
    next_steady: u64,
    next_steady_at: Duration,
}

impl Cadence {
    pub fn new(period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        Self {
            period,
            warmup_count: 0,
            warmup_spacing: MIN_PERIOD,
            next_warmup: 0,
            next_steady: 1,
            next_steady_at: period,
        }
    }

    pub fn with_warmup(mut self, count: u32, spacing: Duration) -> Self {
        self.warmup_count = count;
        self.warmup_spacing = spacing.max(MIN_PERIOD);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn warmup_count(&self) -> u32 {
        self.warmup_count
    }

    fn warmup_offset(&self) -> Option<Duration> {
        (self.next_warmup < self.warmup_count)
            .then(|| self.warmup_spacing.saturating_mul(self.next_warmup))
    }

}

impl Iterator for Cadence {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        let steady = self.next_steady_at;

        match self.warmup_offset() {
            Some(warm) if warm <= steady => {
                let tick = Tick {
                    kind: TickKind::WarmUp(self.next_warmup),
                    offset: warm,
                };
                self.next_warmup += 1;
                Some(tick)
            }
            _ => {
                let tick = Tick {
                    kind: TickKind::Steady(self.next_steady),
                    offset: steady,
                };
                self.next_steady = self.next_steady.saturating_add(1);
                self.next_steady_at = self.next_steady_at.saturating_add(self.period);
                Some(tick)
            }
        }
    }
}
