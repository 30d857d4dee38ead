//! Day-boundary detection.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::session::DayWorkSession;

/// What happens to the session when local midnight passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidnightPolicy {
    /// Clock out, end any break, and zero the totals.
    #[default]
    FullReset,
    /// Only allow a fresh clock-in; status and totals carry over.
    ClearFlag,
}

/// Applies the midnight policy once per calendar-date change.
///
/// Comparing dates rather than waiting for exactly `00:00:00` means a check
/// that runs late (after a system sleep, say) still fires.
#[derive(Debug, Clone)]
pub struct MidnightWatcher {
    policy: MidnightPolicy,
    current_day: NaiveDate,
}

impl MidnightWatcher {
    pub fn new(policy: MidnightPolicy, now: DateTime<FixedOffset>) -> Self {
        Self {
            policy,
            current_day: now.date_naive(),
        }
    }

    pub const fn policy(&self) -> MidnightPolicy {
        self.policy
    }

    pub const fn current_day(&self) -> NaiveDate {
        self.current_day
    }

    /// Resets the session if `now` falls on a later day than the last check.
    ///
    /// Returns `true` when a reset was applied.
    pub fn check(&mut self, now: DateTime<FixedOffset>, session: &mut DayWorkSession) -> bool {
        let today = now.date_naive();
        if today <= self.current_day {
            return false;
        }
        self.current_day = today;

        match self.policy {
            MidnightPolicy::FullReset => session.reset_day(),
            MidnightPolicy::ClearFlag => session.clear_daily_flag(),
        }
        tracing::warn!(day = %today, policy = ?self.policy, "day boundary crossed, session reset");
        true
    }
}
