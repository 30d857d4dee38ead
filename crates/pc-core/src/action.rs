//! Clock action enum as the single source of truth for action strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four requests an employee can make against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockAction {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
}

impl ClockAction {
    /// String representation for storage and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClockIn => "clock_in",
            Self::ClockOut => "clock_out",
            Self::BreakStart => "break_start",
            Self::BreakEnd => "break_end",
        }
    }

    /// Human-readable label shown in the activity history.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ClockIn => "Clock In",
            Self::ClockOut => "Clock Out",
            Self::BreakStart => "Break Start",
            Self::BreakEnd => "Break End",
        }
    }
}

impl fmt::Display for ClockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockAction {
    type Err = UnknownClockAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clock_in" => Ok(Self::ClockIn),
            "clock_out" => Ok(Self::ClockOut),
            "break_start" => Ok(Self::BreakStart),
            "break_end" => Ok(Self::BreakEnd),
            _ => Err(UnknownClockAction(s.to_string())),
        }
    }
}

impl Serialize for ClockAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClockAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown clock action strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown clock action: {0}")]
pub struct UnknownClockAction(String);
