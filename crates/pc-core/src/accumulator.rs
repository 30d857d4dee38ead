//! Elapsed-time accumulator.
//!
//! Tracks at most one open interval (work or break) plus the time banked from
//! closed intervals. Closing an interval folds its elapsed time into the
//! banked total exactly once.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::format::{format_break, format_work};

/// Running work and break totals for the current day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElapsedAccumulator {
    work_started_at: Option<DateTime<FixedOffset>>,
    accumulated_work_ms: i64,
    break_started_at: Option<DateTime<FixedOffset>>,
    accumulated_break_ms: i64,
}

/// The three live duration strings shown to the employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Displays {
    /// Total worked time, `HH:MM:SS`.
    pub elapsed_work_time: String,
    /// Length of the break in progress, `MM:SS`.
    pub break_elapsed_time: String,
    /// Total break time including the one in progress, `MM:SS`.
    pub total_break_display: String,
}

impl Default for Displays {
    fn default() -> Self {
        Self {
            elapsed_work_time: format_work(0),
            break_elapsed_time: format_break(0),
            total_break_display: format_break(0),
        }
    }
}

fn elapsed_ms(since: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> i64 {
    (now - since).num_milliseconds().max(0)
}

impl ElapsedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn work_started_at(&self) -> Option<DateTime<FixedOffset>> {
        self.work_started_at
    }

    pub const fn break_started_at(&self) -> Option<DateTime<FixedOffset>> {
        self.break_started_at
    }

    /// Work time banked from closed intervals.
    pub const fn accumulated_work_ms(&self) -> i64 {
        self.accumulated_work_ms
    }

    /// Break time banked from closed breaks.
    pub const fn accumulated_break_ms(&self) -> i64 {
        self.accumulated_break_ms
    }

    pub const fn is_work_open(&self) -> bool {
        self.work_started_at.is_some()
    }

    pub const fn is_break_open(&self) -> bool {
        self.break_started_at.is_some()
    }

    /// Starts accruing work time. Reopening an open interval keeps its start.
    pub fn open_work(&mut self, at: DateTime<FixedOffset>) {
        debug_assert!(self.break_started_at.is_none(), "work opened during a break");
        self.work_started_at.get_or_insert(at);
    }

    /// Closes the work interval and returns the time it added to the total.
    pub fn close_work(&mut self, at: DateTime<FixedOffset>) -> i64 {
        let Some(start) = self.work_started_at.take() else {
            return 0;
        };
        let elapsed = elapsed_ms(start, at);
        self.accumulated_work_ms += elapsed;
        elapsed
    }

    pub fn open_break(&mut self, at: DateTime<FixedOffset>) {
        debug_assert!(self.work_started_at.is_none(), "break opened during work");
        self.break_started_at.get_or_insert(at);
    }

    /// Closes the break interval and returns the time it added to the total.
    pub fn close_break(&mut self, at: DateTime<FixedOffset>) -> i64 {
        let Some(start) = self.break_started_at.take() else {
            return 0;
        };
        let elapsed = elapsed_ms(start, at);
        self.accumulated_break_ms += elapsed;
        elapsed
    }

    /// Drops any open interval and zeroes both totals.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Banked work plus the open work interval, if any.
    pub fn worked_ms(&self, now: DateTime<FixedOffset>) -> i64 {
        self.accumulated_work_ms + self.work_started_at.map_or(0, |start| elapsed_ms(start, now))
    }

    /// Length of the break in progress, zero when none is open.
    pub fn current_break_ms(&self, now: DateTime<FixedOffset>) -> i64 {
        self.break_started_at.map_or(0, |start| elapsed_ms(start, now))
    }

    /// Banked break time plus the break in progress.
    pub fn break_ms(&self, now: DateTime<FixedOffset>) -> i64 {
        self.accumulated_break_ms + self.current_break_ms(now)
    }

    /// Renders all three displays as of `now`.
    ///
    /// With no interval open the values are frozen at the banked totals.
    pub fn displays(&self, now: DateTime<FixedOffset>) -> Displays {
        Displays {
            elapsed_work_time: format_work(self.worked_ms(now)),
            break_elapsed_time: format_break(self.current_break_ms(now)),
            total_break_display: format_break(self.break_ms(now)),
        }
    }
}
