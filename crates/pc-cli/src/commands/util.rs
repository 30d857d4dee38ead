//! Shared utilities for CLI commands.

use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate};

use pc_core::{
    AttendanceSource, Clock, ClockEvent, DayWorkSession, MidnightPolicy, MidnightWatcher, Tracker,
    TrackerSettings, WorkStatus,
};

/// Rebuilds today's tracker from the journal.
///
/// "Today" is the local date of `clock` at the time of the call. Under
/// [`MidnightPolicy::ClearFlag`] a shift still open at the end of the previous
/// day carries over, so it can be ended today.
pub fn load_today<S, C>(
    source: &S,
    clock: C,
    settings: TrackerSettings,
) -> anyhow::Result<Tracker<C>>
where
    S: AttendanceSource,
    C: Clock,
{
    let now = clock.now();
    let today = now.date_naive();

    let mut session = match settings.midnight_policy {
        MidnightPolicy::FullReset => DayWorkSession::new(),
        MidnightPolicy::ClearFlag => match today.pred_opt() {
            Some(yesterday) => carried_over(source, yesterday, now)?,
            None => DayWorkSession::new(),
        },
    };

    let events = source
        .events_for_day(today)
        .with_context(|| format!("failed to load events for {today}"))?;
    tracing::debug!(%today, events = events.len(), "loaded journal");

    session
        .replay_onto(&events)
        .with_context(|| format!("journal for {today} is inconsistent"))?;
    Ok(Tracker::with_session(clock, settings, session))
}

/// The previous day's session if it ended still clocked in, with the daily
/// flag cleared. Otherwise a fresh session.
///
/// Only one day is looked at. A previous day that does not replay on its own
/// (because it was itself carried over) starts today fresh.
fn carried_over<S: AttendanceSource>(
    source: &S,
    yesterday: NaiveDate,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<DayWorkSession> {
    let events = source
        .events_for_day(yesterday)
        .with_context(|| format!("failed to load events for {yesterday}"))?;

    let mut session = match DayWorkSession::replay(&events) {
        Ok(session) => session,
        Err(err) => {
            tracing::debug!(%yesterday, error = %err, "previous day not carried over");
            return Ok(DayWorkSession::new());
        }
    };
    let last = session.log().latest().and_then(ClockEvent::occurred_at);
    match last {
        Some(last) if session.work_status() == WorkStatus::In => {
            MidnightWatcher::new(MidnightPolicy::ClearFlag, last).check(now, &mut session);
            tracing::debug!(%yesterday, state = ?session.state(), "open shift carried over");
            Ok(session)
        }
        _ => Ok(DayWorkSession::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use pc_core::{ClockAction, ClockState, ManualClock};
    use pc_db::Database;

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, day, hour, 0, 0)
            .unwrap()
    }

    fn settings(policy: MidnightPolicy) -> TrackerSettings {
        TrackerSettings {
            midnight_policy: policy,
            ..TrackerSettings::default()
        }
    }

    fn journal(db: &mut Database, action: ClockAction, when: DateTime<FixedOffset>) {
        db.insert_event(&ClockEvent::new(action, when)).unwrap();
    }

    #[test]
    fn clear_flag_carries_an_open_shift_past_midnight() {
        let mut db = Database::open_in_memory().unwrap();
        journal(&mut db, ClockAction::ClockIn, at(10, 22));
        let clock = ManualClock::new(at(11, 1));

        let mut tracker = load_today(&db, clock, settings(MidnightPolicy::ClearFlag)).unwrap();

        assert_eq!(tracker.state(), ClockState::Working);
        assert!(!tracker.has_clocked_in_today());
        assert_eq!(tracker.displays().elapsed_work_time, "03:00:00");
        assert!(tracker.clock_in().is_err());
        assert!(tracker.clock_out().is_ok());
    }

    #[test]
    fn clear_flag_replays_today_on_top_of_the_carried_shift() {
        let mut db = Database::open_in_memory().unwrap();
        journal(&mut db, ClockAction::ClockIn, at(10, 22));
        journal(&mut db, ClockAction::ClockOut, at(11, 1));
        let clock = ManualClock::new(at(11, 2));

        let mut tracker = load_today(&db, clock, settings(MidnightPolicy::ClearFlag)).unwrap();

        assert_eq!(tracker.state(), ClockState::Out);
        assert_eq!(tracker.displays().elapsed_work_time, "03:00:00");
        assert!(tracker.clock_in().is_ok());
    }

    #[test]
    fn clear_flag_does_not_carry_a_finished_day() {
        let mut db = Database::open_in_memory().unwrap();
        journal(&mut db, ClockAction::ClockIn, at(10, 9));
        journal(&mut db, ClockAction::ClockOut, at(10, 17));
        let clock = ManualClock::new(at(11, 9));

        let tracker = load_today(&db, clock, settings(MidnightPolicy::ClearFlag)).unwrap();

        assert_eq!(tracker.session(), &DayWorkSession::new());
    }

    #[test]
    fn clear_flag_starts_fresh_after_a_carried_day() {
        let mut db = Database::open_in_memory().unwrap();
        journal(&mut db, ClockAction::ClockIn, at(10, 22));
        journal(&mut db, ClockAction::ClockOut, at(11, 1));
        let clock = ManualClock::new(at(12, 9));

        let tracker = load_today(&db, clock, settings(MidnightPolicy::ClearFlag)).unwrap();

        assert_eq!(tracker.state(), ClockState::Out);
    }

    #[test]
    fn full_reset_ignores_yesterday() {
        let mut db = Database::open_in_memory().unwrap();
        journal(&mut db, ClockAction::ClockIn, at(10, 22));
        let clock = ManualClock::new(at(11, 1));

        let tracker = load_today(&db, clock, settings(MidnightPolicy::FullReset)).unwrap();

        assert_eq!(tracker.state(), ClockState::Out);
        assert!(tracker.history().is_empty());
    }

    #[test]
    fn backwards_clock_step_between_punches_keeps_the_day_loadable() {
        let mut db = Database::open_in_memory().unwrap();
        let clock = ManualClock::new(at(10, 9));
        let policy = settings(MidnightPolicy::FullReset);

        let mut tracker = load_today(&db, clock.clone(), policy).unwrap();
        db.insert_event(&tracker.clock_in().unwrap()).unwrap();

        clock.advance(Duration::seconds(-2));
        let mut tracker = load_today(&db, clock.clone(), policy).unwrap();
        db.insert_event(&tracker.start_break().unwrap()).unwrap();

        clock.advance(Duration::minutes(10));
        let mut tracker = load_today(&db, clock.clone(), policy).unwrap();
        db.insert_event(&tracker.end_break().unwrap()).unwrap();

        let tracker = load_today(&db, clock, policy).unwrap();
        assert_eq!(tracker.state(), ClockState::Working);
    }
}
