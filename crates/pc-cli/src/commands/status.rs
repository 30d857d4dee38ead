//! Status command for showing today's clock state and totals.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use pc_core::{
    AttendanceSource, BreakStatus, Clock, ClockState, Displays, Tracker, TrackerSettings,
    WorkStatus,
};

use super::util::load_today;

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    state: ClockState,
    work_status: WorkStatus,
    break_status: BreakStatus,
    has_clocked_in_today: bool,
    #[serde(flatten)]
    displays: &'a Displays,
}

pub fn run<W, S, C>(
    writer: &mut W,
    source: &S,
    clock: C,
    settings: TrackerSettings,
    json: bool,
) -> Result<()>
where
    W: Write,
    S: AttendanceSource,
    C: Clock,
{
    let tracker = load_today(source, clock, settings)?;
    if json {
        write_json(writer, &tracker)
    } else {
        write_text(writer, &tracker)
    }
}

fn write_json<W: Write, C: Clock>(writer: &mut W, tracker: &Tracker<C>) -> Result<()> {
    let report = StatusReport {
        state: tracker.state(),
        work_status: tracker.work_status(),
        break_status: tracker.break_status(),
        has_clocked_in_today: tracker.has_clocked_in_today(),
        displays: tracker.displays(),
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

fn write_text<W: Write, C: Clock>(writer: &mut W, tracker: &Tracker<C>) -> Result<()> {
    let state = match tracker.state() {
        ClockState::Out => "clocked out",
        ClockState::Working => "working",
        ClockState::OnBreak => "on break",
    };
    let displays = tracker.displays();

    writeln!(writer, "Status: {state}")?;
    writeln!(
        writer,
        "Clocked in today: {}",
        if tracker.has_clocked_in_today() { "yes" } else { "no" }
    )?;
    writeln!(writer, "Worked: {}", displays.elapsed_work_time)?;
    if tracker.break_status() == BreakStatus::Active {
        writeln!(writer, "Current break: {}", displays.break_elapsed_time)?;
    }
    writeln!(writer, "Total break: {}", displays.total_break_display)?;

    if let Some(last) = tracker.session().log().latest() {
        writeln!(
            writer,
            "Last punch: {} at {}",
            last.action.label(),
            last.wall_clock_label
        )?;
    }

    Ok(())
}
