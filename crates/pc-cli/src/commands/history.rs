//! History command listing today's most recent punches.

use std::io::Write;

use anyhow::Result;

use pc_core::{AttendanceSource, Clock, TrackerSettings};

use super::util::load_today;

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
    let history = tracker.history();

    if json {
        serde_json::to_writer_pretty(&mut *writer, &history)?;
        writeln!(writer)?;
        return Ok(());
    }

    if history.is_empty() {
        writeln!(writer, "No punches today.")?;
        return Ok(());
    }

    for entry in &history {
        writeln!(writer, "{:<12} {}", entry.action_label, entry.time_label)?;
    }
    Ok(())
}
