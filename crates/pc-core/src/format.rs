//! Duration formatting for the live displays.
//!
//! Work time renders as `HH:MM:SS` and break time as `MM:SS`. Sub-second
//! remainders are truncated and negative durations render as zero.

const MS_PER_SECOND: i64 = 1000;

/// Formats worked time as `HH:MM:SS`. Hours are not capped at 24.
#[must_use]
pub fn format_work(ms: i64) -> String {
    let total_secs = ms.max(0) / MS_PER_SECOND;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats break time as `MM:SS`. Minutes keep counting past 59.
#[must_use]
pub fn format_break(ms: i64) -> String {
    let total_secs = ms.max(0) / MS_PER_SECOND;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes:02}:{seconds:02}")
}
