//! The attendance widget: a session plus the timers that keep it live.
//!
//! [`Tracker`] owns a [`DayWorkSession`] and a [`Scheduler`]. Transitions
//! start and cancel the per-interval tasks; [`Tracker::tick`] runs whatever is
//! due. Everything happens on the caller's thread, so a tick never interleaves
//! with a transition.

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;

use crate::accumulator::Displays;
use crate::action::ClockAction;
use crate::clock::Clock;
use crate::event::{ClockEvent, HistoryEntry, format_wall_clock};
use crate::hydrate::HydrateError;
use crate::midnight::{MidnightPolicy, MidnightWatcher};
use crate::scheduler::{Scheduler, TaskId, TaskKind};
use crate::session::{BreakStatus, ClockState, DayWorkSession, TransitionError, WorkStatus};

/// Timing knobs for a [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Period of every repeating task.
    pub tick: Duration,
    /// How long a rejection notice stays visible.
    pub notice_ttl: Duration,
    pub midnight_policy: MidnightPolicy,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            tick: Duration::seconds(1),
            notice_ttl: Duration::seconds(3),
            midnight_policy: MidnightPolicy::default(),
        }
    }
}

/// A transient message shown after a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub expires_at: DateTime<FixedOffset>,
}

pub struct Tracker<C: Clock> {
    clock: C,
    settings: TrackerSettings,
    session: DayWorkSession,
    scheduler: Scheduler,
    midnight: MidnightWatcher,
    displays: Displays,
    wall_clock: String,
    notice: Option<Notice>,
    notice_task: Option<TaskId>,
}

impl<C: Clock> Tracker<C> {
    /// Creates a tracker with a fresh session.
    pub fn new(clock: C, settings: TrackerSettings) -> Self {
        Self::with_session(clock, settings, DayWorkSession::new())
    }

    /// Creates a tracker from today's stored events.
    pub fn hydrate<'a, I>(
        clock: C,
        settings: TrackerSettings,
        events: I,
    ) -> Result<Self, HydrateError>
    where
        I: IntoIterator<Item = &'a ClockEvent>,
    {
        let session = DayWorkSession::replay(events)?;
        Ok(Self::with_session(clock, settings, session))
    }

    /// Wraps an existing session and starts the timers its state needs.
    pub fn with_session(clock: C, settings: TrackerSettings, session: DayWorkSession) -> Self {
        let now = clock.now();
        let mut scheduler = Scheduler::new();
        scheduler.every(TaskKind::WallClock, settings.tick, now);
        scheduler.every(TaskKind::MidnightCheck, settings.tick, now);

        let mut tracker = Self {
            midnight: MidnightWatcher::new(settings.midnight_policy, now),
            displays: session.displays(now),
            wall_clock: format_wall_clock(now),
            clock,
            settings,
            session,
            scheduler,
            notice: None,
            notice_task: None,
        };
        tracker.sync_interval_tasks(now);
        tracker
    }

    pub fn clock_in(&mut self) -> Result<ClockEvent, TransitionError> {
        self.request(ClockAction::ClockIn)
    }

    pub fn clock_out(&mut self) -> Result<ClockEvent, TransitionError> {
        self.request(ClockAction::ClockOut)
    }

    pub fn start_break(&mut self) -> Result<ClockEvent, TransitionError> {
        self.request(ClockAction::BreakStart)
    }

    pub fn end_break(&mut self) -> Result<ClockEvent, TransitionError> {
        self.request(ClockAction::BreakEnd)
    }

    /// Applies a transition at the current time.
    ///
    /// On rejection a notice is posted and nothing else changes.
    pub fn request(&mut self, action: ClockAction) -> Result<ClockEvent, TransitionError> {
        let now = self.clock.now();
        match self.session.apply(action, now) {
            Ok(event) => {
                self.sync_interval_tasks(now);
                self.displays = self.session.displays(now);
                Ok(event)
            }
            Err(err) => {
                self.post_notice(err.to_string(), now);
                Err(err)
            }
        }
    }

    /// Runs every task that is due and returns what fired.
    pub fn tick(&mut self) -> Vec<TaskKind> {
        let now = self.clock.now();
        let fired = self.scheduler.due(now);
        for kind in &fired {
            match kind {
                TaskKind::WallClock => self.wall_clock = format_wall_clock(now),
                TaskKind::WorkElapsed => {
                    self.displays.elapsed_work_time =
                        self.session.displays(now).elapsed_work_time;
                }
                TaskKind::BreakElapsed => {
                    let fresh = self.session.displays(now);
                    self.displays.break_elapsed_time = fresh.break_elapsed_time;
                    self.displays.total_break_display = fresh.total_break_display;
                }
                TaskKind::MidnightCheck => {
                    if self.midnight.check(now, &mut self.session) {
                        self.sync_interval_tasks(now);
                        self.displays = self.session.displays(now);
                    }
                }
                TaskKind::NoticeDismiss => {
                    self.notice = None;
                    self.notice_task = None;
                }
            }
        }
        tracing::trace!(?fired, "tick");
        fired
    }

    /// Cancels every timer. The tracker stays readable but no longer updates.
    pub fn shutdown(&mut self) {
        self.scheduler.clear();
        self.notice_task = None;
        tracing::debug!("tracker shut down");
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_empty()
    }

    pub const fn session(&self) -> &DayWorkSession {
        &self.session
    }

    pub const fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub const fn work_status(&self) -> WorkStatus {
        self.session.work_status()
    }

    pub const fn break_status(&self) -> BreakStatus {
        self.session.break_status()
    }

    pub const fn state(&self) -> ClockState {
        self.session.state()
    }

    pub const fn has_clocked_in_today(&self) -> bool {
        self.session.has_clocked_in_today()
    }

    /// Display strings as of the last tick or transition.
    pub const fn displays(&self) -> &Displays {
        &self.displays
    }

    /// Local time as of the last tick.
    pub fn wall_clock(&self) -> &str {
        &self.wall_clock
    }

    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.session.log().history()
    }

    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.scheduler.is_scheduled(kind)
    }

    /// Keeps exactly one elapsed task running for whichever interval is open.
    fn sync_interval_tasks(&mut self, now: DateTime<FixedOffset>) {
        let (work, brk) = match self.session.state() {
            ClockState::Out => (false, false),
            ClockState::Working => (true, false),
            ClockState::OnBreak => (false, true),
        };
        self.toggle_task(TaskKind::WorkElapsed, work, now);
        self.toggle_task(TaskKind::BreakElapsed, brk, now);
    }

    fn toggle_task(&mut self, kind: TaskKind, wanted: bool, now: DateTime<FixedOffset>) {
        let running = self.scheduler.is_scheduled(kind);
        if wanted && !running {
            self.scheduler.every(kind, self.settings.tick, now);
        } else if !wanted && running {
            self.scheduler.cancel_kind(kind);
        }
    }

    fn post_notice(&mut self, message: String, now: DateTime<FixedOffset>) {
        if let Some(id) = self.notice_task.take() {
            self.scheduler.cancel(id);
        }
        let expires_at = now + self.settings.notice_ttl;
        self.notice_task = Some(
            self.scheduler
                .once(TaskKind::NoticeDismiss, self.settings.notice_ttl, now),
        );
        self.notice = Some(Notice {
            message,
            expires_at,
        });
    }
}
