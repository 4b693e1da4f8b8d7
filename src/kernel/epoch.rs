use std::sync::{PoisonError, RwLock};

/// Proof that a driver was armed at a given epoch.
///
/// A ticket goes stale the moment its cell is disarmed or re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn epoch(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Slot<T> {
    epoch: u64,
    armed: bool,
    value: T,
}

/// Shared value that only the currently armed driver may mutate.
///
/// The epoch check and the mutation happen under one write lock, and so
/// does `disarm`. Once `disarm` returns, every outstanding ticket is
/// rejected, even from a tick that was already running on another worker.
#[derive(Debug)]
pub struct EpochCell<T> {
    slot: RwLock<Slot<T>>,
}

impl<T> EpochCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: RwLock::new(Slot {
                epoch: 0,
                armed: false,
                value,
            }),
        }
    }

    /// Starts a new epoch and returns its ticket. Older tickets become stale.
    pub fn arm(&self) -> Ticket {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.epoch = slot.epoch.wrapping_add(1);
        slot.armed = true;
        Ticket(slot.epoch)
    }

    /// Invalidates every ticket. Returns whether the cell was armed.
    pub fn disarm(&self) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let was_armed = slot.armed;
        slot.epoch = slot.epoch.wrapping_add(1);
        slot.armed = false;
        was_armed
    }

    pub fn is_armed(&self) -> bool {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).armed
    }

    /// Runs `f` on the value if `ticket` is still current.
    /// Returns `None` for a stale ticket; the value is left untouched.
    pub fn apply<R>(&self, ticket: Ticket, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if !slot.armed || slot.epoch != ticket.0 {
            return None;
        }
        Some(f(&mut slot.value))
    }

    /// Mutates the value regardless of epoch. For owner-side edits (resizing,
    /// clearing) that are not ticks.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut slot.value)
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        f(&slot.value)
    }
}
