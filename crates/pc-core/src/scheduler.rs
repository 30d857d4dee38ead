//! Deterministic task scheduler driven by an injected clock.
//!
//! Nothing here sleeps or spawns. The owner polls [`Scheduler::due`] with the
//! current time and runs whatever fired, which keeps every callback on the
//! caller's thread and lets tests step time by hand.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset};

/// Which periodic job a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    /// Refresh the wall-clock label.
    WallClock,
    /// Recompute the worked-time display.
    WorkElapsed,
    /// Recompute the break displays.
    BreakElapsed,
    /// Look for a crossed day boundary.
    MidnightCheck,
    /// Clear the transient notice.
    NoticeDismiss,
}

/// Handle returned when a task is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Task {
    kind: TaskKind,
    next_due: DateTime<FixedOffset>,
    /// `None` for one-shot tasks.
    period: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: BTreeMap<TaskId, Task>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` to fire every `period`, first at `now + period`.
    pub fn every(
        &mut self,
        kind: TaskKind,
        period: Duration,
        now: DateTime<FixedOffset>,
    ) -> TaskId {
        self.insert(Task {
            kind,
            next_due: now + period,
            period: Some(period),
        })
    }

    /// Schedules `kind` to fire once, `delay` after `now`.
    pub fn once(&mut self, kind: TaskKind, delay: Duration, now: DateTime<FixedOffset>) -> TaskId {
        self.insert(Task {
            kind,
            next_due: now + delay,
            period: None,
        })
    }

    fn insert(&mut self, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        tracing::trace!(?id, kind = ?task.kind, "task scheduled");
        self.tasks.insert(id, task);
        id
    }

    /// Cancels one task. Returns `false` if it had already finished.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    /// Cancels every task of the given kind.
    pub fn cancel_kind(&mut self, kind: TaskKind) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| task.kind != kind);
        before - self.tasks.len()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.tasks.values().any(|task| task.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Collects the tasks due at `now`, earliest first.
    ///
    /// Repeating tasks fire at most once per call and are rescheduled one
    /// period after `now`, so a long gap does not produce a burst of catch-up
    /// ticks. One-shot tasks are removed.
    pub fn due(&mut self, now: DateTime<FixedOffset>) -> Vec<TaskKind> {
        let mut fired: Vec<(DateTime<FixedOffset>, TaskId, TaskKind)> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.next_due <= now)
            .map(|(id, task)| (task.next_due, *id, task.kind))
            .collect();
        fired.sort();

        for (_, id, _) in &fired {
            let repeat = self.tasks.get(id).and_then(|task| task.period);
            match repeat {
                Some(period) => {
                    if let Some(task) = self.tasks.get_mut(id) {
                        task.next_due = now + period;
                    }
                }
                None => {
                    self.tasks.remove(id);
                }
            }
        }

        fired.into_iter().map(|(_, _, kind)| kind).collect()
    }
}
