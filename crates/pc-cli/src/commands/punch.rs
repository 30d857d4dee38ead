//! Clock in/out and break commands.

use std::io::Write;

use anyhow::{Context, Result};

use pc_core::{Clock, ClockAction, ClockEvent, TrackerSettings, TransitionError};
use pc_db::Database;

use super::util::load_today;

/// Result of a punch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The transition was applied and journaled.
    Accepted(ClockEvent),
    /// The transition was refused; nothing was written.
    Rejected(TransitionError),
}

/// Applies `action` to today's session and journals the event on success.
pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    db: &mut Database,
    clock: C,
    settings: TrackerSettings,
    action: ClockAction,
) -> Result<Outcome> {
    let mut tracker = load_today(&*db, clock, settings)?;

    let event = match tracker.request(action) {
        Ok(event) => event,
        Err(err) => return Ok(Outcome::Rejected(err)),
    };
    db.insert_event(&event).context("failed to journal clock event")?;

    let displays = tracker.displays();
    writeln!(writer, "{} at {}", action.label(), event.wall_clock_label)?;
    match action {
        ClockAction::ClockIn | ClockAction::BreakEnd => {
            writeln!(writer, "Worked so far: {}", displays.elapsed_work_time)?;
        }
        ClockAction::BreakStart => {
            writeln!(writer, "Worked so far: {}", displays.elapsed_work_time)?;
            writeln!(writer, "Break total: {}", displays.total_break_display)?;
        }
        ClockAction::ClockOut => {
            writeln!(writer, "Worked today: {}", displays.elapsed_work_time)?;
            writeln!(writer, "Break total: {}", displays.total_break_display)?;
        }
    }

    Ok(Outcome::Accepted(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Duration, FixedOffset, TimeZone};
    use insta::assert_snapshot;
    use pc_core::{AttendanceSource, ManualClock};

    fn nine_am() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .unwrap()
    }

    fn punch(db: &mut Database, clock: &ManualClock, action: ClockAction) -> (Outcome, String) {
        let mut output = Vec::new();
        let outcome = run(
            &mut output,
            db,
            clock.clone(),
            TrackerSettings::default(),
            action,
        )
        .unwrap();
        (outcome, String::from_utf8(output).unwrap())
    }

    #[test]
    fn clock_in_is_journaled() {
        let mut db = Database::open_in_memory().unwrap();
        let clock = ManualClock::new(nine_am());

        let (outcome, output) = punch(&mut db, &clock, ClockAction::ClockIn);

        assert!(matches!(outcome, Outcome::Accepted(_)));
        assert_eq!(db.count_events().unwrap(), 1);
        assert_snapshot!(output, @r"
        Clock In at 09:00:00 AM
        Worked so far: 00:00:00
        ");
    }

    #[test]
    fn full_day_across_invocations() {
        let mut db = Database::open_in_memory().unwrap();
        let clock = ManualClock::new(nine_am());

        punch(&mut db, &clock, ClockAction::ClockIn);
        clock.advance(Duration::minutes(10));
        punch(&mut db, &clock, ClockAction::BreakStart);
        clock.advance(Duration::minutes(5));
        punch(&mut db, &clock, ClockAction::BreakEnd);
        clock.set(nine_am() + Duration::hours(8));
        let (_, output) = punch(&mut db, &clock, ClockAction::ClockOut);

        assert_snapshot!(output, @r"
        Clock Out at 05:00:00 PM
        Worked today: 07:55:00
        Break total: 05:00
        ");
        let day = db.events_for_day(nine_am().date_naive()).unwrap();
        assert_eq!(day.len(), 4);
    }

    #[test]
    fn rejection_writes_nothing() {
        let mut db = Database::open_in_memory().unwrap();
        let clock = ManualClock::new(nine_am());

        punch(&mut db, &clock, ClockAction::ClockIn);
        punch(&mut db, &clock, ClockAction::BreakStart);
        let (outcome, output) = punch(&mut db, &clock, ClockAction::ClockOut);

        assert_eq!(outcome, Outcome::Rejected(TransitionError::OnBreak));
        assert!(output.is_empty());
        assert_eq!(db.count_events().unwrap(), 2);
    }

    #[test]
    fn yesterdays_punches_do_not_block_today() {
        let mut db = Database::open_in_memory().unwrap();
        let clock = ManualClock::new(nine_am());
        punch(&mut db, &clock, ClockAction::ClockIn);

        clock.advance(Duration::days(1));
        let (outcome, _) = punch(&mut db, &clock, ClockAction::ClockIn);

        assert!(matches!(outcome, Outcome::Accepted(_)));
    }
}
