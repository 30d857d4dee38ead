//! The clock state machine for one working day.
//!
//! All session state lives in [`DayWorkSession`] and changes only through
//! the four guarded transitions. A rejected request returns a
//! [`TransitionError`] and leaves the session untouched.
//!
//! Events are stamped no earlier than the latest logged event, so a clock
//! that steps backwards cannot reorder the history.
//!
//! | Request       | Valid from | Result    |
//! |---------------|------------|-----------|
//! | `clock_in`    | `Out`      | `Working` |
//! | `clock_out`   | `Working`  | `Out`     |
//! | `start_break` | `Working`  | `OnBreak` |
//! | `end_break`   | `OnBreak`  | `Working` |

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accumulator::{Displays, ElapsedAccumulator};
use crate::action::ClockAction;
use crate::event::{ClockEvent, EventLog};

/// Whether the employee is on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    #[default]
    Out,
    In,
}

/// Whether a break is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakStatus {
    #[default]
    Inactive,
    Active,
}

/// State derived from work and break status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Out,
    Working,
    OnBreak,
}

/// A transition request that was refused by its guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("already clocked in today")]
    AlreadyClockedIn,
    #[error("must clock in before clocking out")]
    NotClockedIn,
    #[error("must end break before clocking out")]
    OnBreak,
    #[error("must clock in before starting a break")]
    BreakWithoutClockIn,
    #[error("already on a break")]
    AlreadyOnBreak,
    #[error("must start a break before ending it")]
    NoActiveBreak,
}

/// Everything the engine knows about today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayWorkSession {
    work_status: WorkStatus,
    break_status: BreakStatus,
    has_clocked_in_today: bool,
    accumulator: ElapsedAccumulator,
    log: EventLog,
}

impl DayWorkSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn work_status(&self) -> WorkStatus {
        self.work_status
    }

    pub const fn break_status(&self) -> BreakStatus {
        self.break_status
    }

    pub const fn has_clocked_in_today(&self) -> bool {
        self.has_clocked_in_today
    }

    pub const fn accumulator(&self) -> &ElapsedAccumulator {
        &self.accumulator
    }

    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    pub const fn state(&self) -> ClockState {
        match (self.work_status, self.break_status) {
            (WorkStatus::Out, _) => ClockState::Out,
            (WorkStatus::In, BreakStatus::Inactive) => ClockState::Working,
            (WorkStatus::In, BreakStatus::Active) => ClockState::OnBreak,
        }
    }

    pub fn displays(&self, now: DateTime<FixedOffset>) -> Displays {
        self.accumulator.displays(now)
    }

    /// Dispatches a request by action.
    pub fn apply(
        &mut self,
        action: ClockAction,
        now: DateTime<FixedOffset>,
    ) -> Result<ClockEvent, TransitionError> {
        match action {
            ClockAction::ClockIn => self.clock_in(now),
            ClockAction::ClockOut => self.clock_out(now),
            ClockAction::BreakStart => self.start_break(now),
            ClockAction::BreakEnd => self.end_break(now),
        }
    }

    /// Starts the working day and zeroes the totals.
    pub fn clock_in(&mut self, now: DateTime<FixedOffset>) -> Result<ClockEvent, TransitionError> {
        if self.has_clocked_in_today || self.work_status == WorkStatus::In {
            return Err(reject(ClockAction::ClockIn, TransitionError::AlreadyClockedIn));
        }
        let now = self.not_before_latest(now);

        self.work_status = WorkStatus::In;
        self.break_status = BreakStatus::Inactive;
        self.has_clocked_in_today = true;
        self.accumulator.reset();
        self.accumulator.open_work(now);

        Ok(self.record(ClockAction::ClockIn, now))
    }

    /// Ends the working day, freezing the worked total.
    pub fn clock_out(&mut self, now: DateTime<FixedOffset>) -> Result<ClockEvent, TransitionError> {
        match self.state() {
            ClockState::Out => {
                return Err(reject(ClockAction::ClockOut, TransitionError::NotClockedIn));
            }
            ClockState::OnBreak => {
                return Err(reject(ClockAction::ClockOut, TransitionError::OnBreak));
            }
            ClockState::Working => {}
        }
        let now = self.not_before_latest(now);

        self.accumulator.close_work(now);
        self.work_status = WorkStatus::Out;

        Ok(self.record(ClockAction::ClockOut, now))
    }

    pub fn start_break(
        &mut self,
        now: DateTime<FixedOffset>,
    ) -> Result<ClockEvent, TransitionError> {
        match self.state() {
            ClockState::Out => {
                return Err(reject(
                    ClockAction::BreakStart,
                    TransitionError::BreakWithoutClockIn,
                ));
            }
            ClockState::OnBreak => {
                return Err(reject(ClockAction::BreakStart, TransitionError::AlreadyOnBreak));
            }
            ClockState::Working => {}
        }
        let now = self.not_before_latest(now);

        self.accumulator.close_work(now);
        self.accumulator.open_break(now);
        self.break_status = BreakStatus::Active;

        Ok(self.record(ClockAction::BreakStart, now))
    }

    pub fn end_break(&mut self, now: DateTime<FixedOffset>) -> Result<ClockEvent, TransitionError> {
        if self.state() != ClockState::OnBreak {
            return Err(reject(ClockAction::BreakEnd, TransitionError::NoActiveBreak));
        }
        let now = self.not_before_latest(now);

        self.accumulator.close_break(now);
        self.accumulator.open_work(now);
        self.break_status = BreakStatus::Inactive;

        Ok(self.record(ClockAction::BreakEnd, now))
    }

    /// Clears only the daily clock-in flag.
    pub(crate) fn clear_daily_flag(&mut self) {
        self.has_clocked_in_today = false;
    }

    /// Returns the session to its start-of-day state, keeping the history.
    pub(crate) fn reset_day(&mut self) {
        self.work_status = WorkStatus::Out;
        self.break_status = BreakStatus::Inactive;
        self.has_clocked_in_today = false;
        self.accumulator.reset();
        self.check_invariants();
    }

    /// `now`, or the latest logged event's time if the clock went backwards.
    fn not_before_latest(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self.log.latest().and_then(ClockEvent::occurred_at) {
            Some(latest) if latest > now => {
                tracing::debug!(%now, %latest, "clock behind last event, using last event time");
                latest
            }
            _ => now,
        }
    }

    fn record(&mut self, action: ClockAction, now: DateTime<FixedOffset>) -> ClockEvent {
        self.check_invariants();
        let event = ClockEvent::new(action, now);
        self.log.push(event.clone());
        tracing::info!(
            action = %action,
            at = %event.wall_clock_label,
            worked_ms = self.accumulator.worked_ms(now),
            break_ms = self.accumulator.break_ms(now),
            "clock transition accepted"
        );
        event
    }

    fn check_invariants(&self) {
        let working = self.state() == ClockState::Working;
        let on_break = self.break_status == BreakStatus::Active;
        debug_assert_eq!(self.accumulator.is_work_open(), working);
        debug_assert_eq!(self.accumulator.is_break_open(), on_break);
        debug_assert!(!on_break || self.work_status == WorkStatus::In);
    }
}

fn reject(action: ClockAction, err: TransitionError) -> TransitionError {
    tracing::debug!(action = %action, reason = %err, "clock transition rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 10, hour, min, sec)
            .unwrap()
    }

    fn working_session() -> DayWorkSession {
        let mut session = DayWorkSession::new();
        session.clock_in(at(9, 0, 0)).unwrap();
        session
    }

    #[test]
    fn new_session_is_out() {
        let session = DayWorkSession::new();
        assert_eq!(session.state(), ClockState::Out);
        assert!(!session.has_clocked_in_today());
        assert!(session.log().is_empty());
    }

    #[test]
    fn clock_in_opens_work_interval() {
        let session = working_session();
        assert_eq!(session.state(), ClockState::Working);
        assert!(session.has_clocked_in_today());
        assert_eq!(session.accumulator().work_started_at(), Some(at(9, 0, 0)));
        assert_eq!(session.log().latest().map(|e| e.action), Some(ClockAction::ClockIn));
    }

    #[test]
    fn elapsed_work_after_five_seconds() {
        let session = working_session();
        assert_eq!(session.displays(at(9, 0, 5)).elapsed_work_time, "00:00:05");
    }

    #[test]
    fn full_day_with_one_break() {
        let mut session = working_session();
        session.start_break(at(9, 10, 0)).unwrap();
        session.end_break(at(9, 15, 0)).unwrap();
        session.clock_out(at(17, 0, 0)).unwrap();

        assert_eq!(session.accumulator().accumulated_break_ms(), 5 * 60 * 1000);
        assert_eq!(session.displays(at(18, 0, 0)).elapsed_work_time, "07:55:00");
        assert_eq!(session.state(), ClockState::Out);
    }

    #[test]
    fn work_and_break_add_up_to_the_day() {
        let mut session = working_session();
        session.start_break(at(10, 0, 0)).unwrap();
        session.end_break(at(10, 17, 31)).unwrap();
        session.start_break(at(12, 0, 0)).unwrap();
        session.end_break(at(12, 45, 2)).unwrap();
        session.clock_out(at(16, 3, 9)).unwrap();

        let acc = session.accumulator();
        let span = (at(16, 3, 9) - at(9, 0, 0)).num_milliseconds();
        assert_eq!(acc.accumulated_work_ms() + acc.accumulated_break_ms(), span);
    }

    #[test]
    fn second_clock_in_is_rejected_all_day() {
        let mut session = working_session();
        let before = session.clone();
        assert_eq!(
            session.clock_in(at(9, 1, 0)),
            Err(TransitionError::AlreadyClockedIn)
        );
        assert_eq!(session, before);

        session.start_break(at(10, 0, 0)).unwrap();
        assert_eq!(
            session.clock_in(at(10, 1, 0)),
            Err(TransitionError::AlreadyClockedIn)
        );

        session.end_break(at(10, 5, 0)).unwrap();
        session.clock_out(at(12, 0, 0)).unwrap();
        let before = session.clone();
        assert_eq!(
            session.clock_in(at(13, 0, 0)),
            Err(TransitionError::AlreadyClockedIn)
        );
        assert_eq!(session, before);
    }

    #[test]
    fn break_before_clock_in_is_rejected() {
        let mut session = DayWorkSession::new();
        let before = session.clone();

        assert_eq!(
            session.start_break(at(9, 0, 0)),
            Err(TransitionError::BreakWithoutClockIn)
        );
        assert_eq!(session, before);
    }

    #[test]
    fn clock_out_during_break_is_rejected() {
        let mut session = working_session();
        session.start_break(at(10, 0, 0)).unwrap();
        let before = session.clone();

        assert_eq!(session.clock_out(at(10, 5, 0)), Err(TransitionError::OnBreak));
        assert_eq!(session, before);
        assert_eq!(session.break_status(), BreakStatus::Active);
    }

    #[test]
    fn clock_out_when_out_is_rejected() {
        let mut session = DayWorkSession::new();
        let before = session.clone();
        assert_eq!(
            session.clock_out(at(9, 0, 0)),
            Err(TransitionError::NotClockedIn)
        );
        assert_eq!(session, before);

        let mut session = working_session();
        session.clock_out(at(12, 0, 0)).unwrap();
        let before = session.clone();
        assert_eq!(
            session.clock_out(at(12, 5, 0)),
            Err(TransitionError::NotClockedIn)
        );
        assert_eq!(session, before);
    }

    #[test]
    fn double_break_is_rejected() {
        let mut session = working_session();
        session.start_break(at(10, 0, 0)).unwrap();
        let before = session.clone();

        assert_eq!(
            session.start_break(at(10, 1, 0)),
            Err(TransitionError::AlreadyOnBreak)
        );
        assert_eq!(session, before);
    }

    #[test]
    fn end_break_without_break_is_rejected() {
        let mut session = working_session();
        let before = session.clone();

        assert_eq!(
            session.end_break(at(10, 0, 0)),
            Err(TransitionError::NoActiveBreak)
        );
        assert_eq!(session, before);

        let mut out = DayWorkSession::new();
        assert_eq!(out.end_break(at(10, 0, 0)), Err(TransitionError::NoActiveBreak));
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(
            TransitionError::AlreadyClockedIn.to_string(),
            "already clocked in today"
        );
        assert_eq!(
            TransitionError::OnBreak.to_string(),
            "must end break before clocking out"
        );
        assert_eq!(
            TransitionError::NoActiveBreak.to_string(),
            "must start a break before ending it"
        );
    }

    #[test]
    fn intervals_never_overlap() {
        let mut session = DayWorkSession::new();
        let mut now = at(8, 0, 0);
        let script = [
            ClockAction::BreakStart,
            ClockAction::ClockIn,
            ClockAction::BreakEnd,
            ClockAction::BreakStart,
            ClockAction::ClockOut,
            ClockAction::BreakStart,
            ClockAction::BreakEnd,
            ClockAction::BreakEnd,
            ClockAction::ClockOut,
            ClockAction::ClockIn,
        ];

        for action in script {
            now += Duration::minutes(7);
            let _ = session.apply(action, now);

            let acc = session.accumulator();
            assert!(!(acc.is_work_open() && acc.is_break_open()));
            if session.break_status() == BreakStatus::Active {
                assert_eq!(session.work_status(), WorkStatus::In);
            }
        }
    }

    #[test]
    fn history_is_capped_at_ten() {
        let mut session = working_session();
        let mut now = at(9, 0, 0);
        for _ in 0..6 {
            now += Duration::minutes(10);
            session.start_break(now).unwrap();
            now += Duration::minutes(1);
            session.end_break(now).unwrap();
        }

        assert_eq!(session.log().len(), 10);
        let latest = session.log().latest().unwrap();
        assert_eq!(latest.action, ClockAction::BreakEnd);
        assert_eq!(latest.timestamp_millis, now.timestamp_millis());
    }

    #[test]
    fn backwards_clock_step_keeps_events_in_order() {
        let mut session = working_session();

        let event = session.start_break(at(8, 59, 58)).unwrap();
        assert_eq!(event.timestamp_millis, at(9, 0, 0).timestamp_millis());
        assert_eq!(event.wall_clock_label, "09:00:00 AM");

        session.end_break(at(9, 10, 0)).unwrap();
        assert_eq!(session.accumulator().accumulated_work_ms(), 0);
        assert_eq!(session.accumulator().accumulated_break_ms(), 10 * 60 * 1000);

        let stamps: Vec<_> = session.log().entries().map(|e| e.timestamp_millis).collect();
        assert!(stamps.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn reset_day_allows_fresh_clock_in() {
        let mut session = working_session();
        session.start_break(at(10, 0, 0)).unwrap();

        session.reset_day();

        assert_eq!(session.state(), ClockState::Out);
        assert_eq!(session.accumulator(), &ElapsedAccumulator::default());
        assert_eq!(session.log().len(), 2);
        assert!(session.clock_in(at(10, 30, 0)).is_ok());
    }
}
