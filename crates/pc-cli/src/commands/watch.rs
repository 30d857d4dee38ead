//! Live view of the running session.
//!
//! Drives [`Tracker::tick`] from a current-thread tokio runtime, so every
//! tick runs on one thread, and redraws a single status line until Ctrl-C.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;

use pc_core::{Clock, ClockState, Tracker};

/// Renders the one-line live view.
pub fn render_line<C: Clock>(tracker: &Tracker<C>) -> String {
    let displays = tracker.displays();
    let state = match tracker.state() {
        ClockState::Out => "OUT",
        ClockState::Working => "IN",
        ClockState::OnBreak => "BREAK",
    };
    let mut line = format!(
        "{} | {:<5} | worked {} | break {} (total {})",
        tracker.wall_clock(),
        state,
        displays.elapsed_work_time,
        displays.break_elapsed_time,
        displays.total_break_display,
    );
    if let Some(notice) = tracker.notice() {
        line.push_str(" | ");
        line.push_str(&notice.message);
    }
    line
}

pub fn run<W: Write, C: Clock>(writer: &mut W, tracker: Tracker<C>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(drive(writer, tracker))
}

async fn drive<W: Write, C: Clock>(writer: &mut W, mut tracker: Tracker<C>) -> Result<()> {
    let period = tracker
        .settings()
        .tick
        .to_std()
        .context("tick period must be positive")?;
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                tracker.tick();
                // Pad so a shorter line fully overwrites the previous one.
                write!(writer, "\r{:<100}", render_line(&tracker))?;
                writer.flush()?;
            }
            _ = &mut shutdown => break,
        }
    }

    tracker.shutdown();
    writeln!(writer)?;
    Ok(())
}
