//! Rebuilding today's session from previously emitted events.
//!
//! The engine keeps nothing on disk. Whoever stores [`ClockEvent`]s hands
//! today's events back through [`AttendanceSource`], and
//! [`DayWorkSession::replay`] re-applies them through the normal guarded
//! transitions so a restored session obeys the same rules as a live one.

use chrono::NaiveDate;
use thiserror::Error;

use crate::action::ClockAction;
use crate::event::ClockEvent;
use crate::session::{DayWorkSession, TransitionError};

/// A store that can return the clock events recorded on a given local day.
pub trait AttendanceSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Events for `day`, oldest first.
    fn events_for_day(&self, day: NaiveDate) -> Result<Vec<ClockEvent>, Self::Error>;
}

/// Errors from replaying stored events.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HydrateError {
    #[error("event {index} ({action}) has an out-of-range timestamp")]
    InvalidTimestamp { index: usize, action: ClockAction },
    #[error("event {index} ({action}) is older than the event before it")]
    OutOfOrder { index: usize, action: ClockAction },
    #[error("event {index} ({action}) cannot be replayed")]
    Rejected {
        index: usize,
        action: ClockAction,
        #[source]
        source: TransitionError,
    },
}

impl DayWorkSession {
    /// Builds a session by replaying `events` in order.
    pub fn replay<'a, I>(events: I) -> Result<Self, HydrateError>
    where
        I: IntoIterator<Item = &'a ClockEvent>,
    {
        let mut session = Self::new();
        session.replay_onto(events)?;
        Ok(session)
    }

    /// Replays `events` on top of this session, for example one carried over
    /// from the previous day.
    ///
    /// Indices in errors count from the first of `events`. On error the
    /// session is left partway through the replay.
    pub fn replay_onto<'a, I>(&mut self, events: I) -> Result<(), HydrateError>
    where
        I: IntoIterator<Item = &'a ClockEvent>,
    {
        let mut previous_ms = self.log().latest().map_or(i64::MIN, |e| e.timestamp_millis);

        for (index, event) in events.into_iter().enumerate() {
            let action = event.action;
            let at = event
                .occurred_at()
                .ok_or(HydrateError::InvalidTimestamp { index, action })?;
            if event.timestamp_millis < previous_ms {
                return Err(HydrateError::OutOfOrder { index, action });
            }
            previous_ms = event.timestamp_millis;

            self.apply(action, at).map_err(|source| HydrateError::Rejected {
                index,
                action,
                source,
            })?;
        }

        tracing::debug!(
            events = self.log().len(),
            state = ?self.state(),
            "session hydrated"
        );
        Ok(())
    }
}
