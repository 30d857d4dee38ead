//! Core attendance logic for punchclock.
//!
//! This crate contains:
//! - Session: the clock-in/clock-out/break state machine for one working day
//! - Accumulator: banked and live work/break durations and their displays
//! - Tracker: the session wired to a deterministic scheduler and midnight reset
//! - Hydration: rebuilding today's session from stored events

mod accumulator;
pub mod action;
pub mod clock;
pub mod event;
pub mod format;
mod hydrate;
pub mod midnight;
pub mod scheduler;
pub mod session;
pub mod tracker;

pub use accumulator::{Displays, ElapsedAccumulator};
pub use action::{ClockAction, UnknownClockAction};
pub use clock::{Clock, ManualClock, SystemClock};
pub use event::{ClockEvent, EventLog, HISTORY_CAPACITY, HistoryEntry};
pub use hydrate::{AttendanceSource, HydrateError};
pub use midnight::{MidnightPolicy, MidnightWatcher};
pub use scheduler::{Scheduler, TaskKind};
pub use session::{BreakStatus, ClockState, DayWorkSession, TransitionError, WorkStatus};
pub use tracker::{Notice, Tracker, TrackerSettings};
