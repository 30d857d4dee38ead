//! Clock events and the capped activity history.

use std::collections::VecDeque;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::action::ClockAction;

/// Maximum number of events kept in the activity history.
pub const HISTORY_CAPACITY: usize = 10;

/// `strftime` pattern for the human-readable time of an event.
const WALL_CLOCK_FORMAT: &str = "%I:%M:%S %p";

/// A successful transition, stamped at the moment it was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEvent {
    pub action: ClockAction,
    /// Local time of the event, e.g. `09:00:00 AM`.
    pub wall_clock_label: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
    /// Offset of the local time zone when the event was recorded.
    #[serde(default)]
    pub utc_offset_secs: i32,
}

impl ClockEvent {
    pub fn new(action: ClockAction, at: DateTime<FixedOffset>) -> Self {
        Self {
            action,
            wall_clock_label: format_wall_clock(at),
            timestamp_millis: at.timestamp_millis(),
            utc_offset_secs: at.offset().local_minus_utc(),
        }
    }

    /// Reconstructs the local time the event was recorded at.
    ///
    /// Returns `None` if the stored timestamp or offset is out of range.
    pub fn occurred_at(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.utc_offset_secs)?;
        DateTime::from_timestamp_millis(self.timestamp_millis).map(|utc| utc.with_timezone(&offset))
    }
}

/// Formats a local time the way the history and the live clock show it.
pub fn format_wall_clock(at: DateTime<FixedOffset>) -> String {
    at.format(WALL_CLOCK_FORMAT).to_string()
}

/// One row of the activity history as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub action_label: &'static str,
    pub time_label: String,
}

/// Most-recent-first event log holding at most [`HISTORY_CAPACITY`] events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: VecDeque<ClockEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the front, evicting the oldest event once full.
    pub fn push(&mut self, event: ClockEvent) {
        self.events.push_front(event);
        self.events.truncate(HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Newest event, if any.
    pub fn latest(&self) -> Option<&ClockEvent> {
        self.events.front()
    }

    /// Events newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ClockEvent> {
        self.events.iter()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.events
            .iter()
            .map(|event| HistoryEntry {
                action_label: event.action.label(),
                time_label: event.wall_clock_label.clone(),
            })
            .collect()
    }
}
