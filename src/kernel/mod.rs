//! Timer plumbing shared by the simulators.
//!
//! A simulator owns one driver task (`TimerRegistry`) that walks a tick
//! timeline (`Cadence`) and writes into an `EpochCell`. Stopping disarms the
//! cell first, so a tick that is already in flight cannot land afterwards.

pub mod cancel;
pub mod epoch;
pub mod time;

pub use cancel::TimerRegistry;
pub use epoch::{EpochCell, Ticket};
pub use time::{Cadence, Tick, TickKind};
