#![forbid(unsafe_code)]

//! Single-threaded cooperative scheduler for frame and timer tasks.
//!
//! Effects never own a thread or a callback. They register a task with a
//! [`Host`], keep the returned [`TaskGuard`], and react when the owner of
//! the scheduler dispatches a [`Fired`] record carrying their [`TaskId`].
//!
//! # How it works
//!
//! 1. `request_frames()`, `every()` and `after()` register a task and return
//!    a guard sharing a revocation flag with the scheduler.
//! 2. [`Scheduler::advance`] moves simulated time forward by one rendered
//!    frame and dispatches every task that came due, in time order.
//! 3. Dropping (or cancelling) the guard revokes the task. The flag is
//!    checked right before each dispatch, so a task revoked by an earlier
//!    dispatch in the same frame never fires.
//!
//! # Invariants
//!
//! 1. Frame tasks fire exactly once per `advance` call.
//! 2. An `every(p)` task fires once per elapsed period `p`, never early.
//! 3. An `after(d)` task fires at most once.
//! 4. Revoked tasks are pruned and never dispatched again.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Identifier of a registered task, unique per scheduler.
pub type TaskId = u64;

/// Shortest accepted interval period. Zero-length periods would fire
/// unboundedly within a single frame.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// What a task is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Once per rendered frame.
    Frame,
    /// Repeatedly, every period.
    Every(Duration),
    /// Once, after a delay.
    After(Duration),
}

/// A task that came due during [`Scheduler::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    /// Task that fired.
    pub id: TaskId,
    /// Registration kind.
    pub kind: TaskKind,
    /// Time covered by this firing: the frame delta for frame tasks, the
    /// period for intervals, the delay for timeouts.
    pub dt: Duration,
    /// Scheduler time at which the task was due.
    pub at: Duration,
}

/// Revocation flag shared by a guard and the scheduler.
#[derive(Clone, Default)]
pub struct StopSignal {
    stopped: Rc<Cell<bool>>,
}

impl StopSignal {
    /// Whether the owning guard has been cancelled or dropped.
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    fn stop(&self) {
        self.stopped.set(true);
    }
}

impl fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSignal")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Ownership of one registered task. Dropping it revokes the task.
#[must_use = "dropping a TaskGuard revokes the task immediately"]
pub struct TaskGuard {
    id: TaskId,
    kind: TaskKind,
    signal: StopSignal,
}

impl TaskGuard {
    /// Identifier to match against [`Fired::id`].
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Registration kind.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Whether the task can still fire.
    pub fn is_live(&self) -> bool {
        !self.signal.is_stopped()
    }

    /// Revoke the task explicitly.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if !self.signal.is_stopped() {
            tracing::trace!(task_id = self.id, kind = ?self.kind, "task revoked");
            self.signal.stop();
        }
    }
}

impl fmt::Debug for TaskGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGuard")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Capabilities an effect needs from its environment.
pub trait Host {
    /// Current host time.
    fn now(&self) -> Duration;

    /// Register a task that fires once per rendered frame.
    fn request_frames(&mut self) -> TaskGuard;

    /// Register a task that fires every `period` (at least [`MIN_PERIOD`]).
    fn every(&mut self, period: Duration) -> TaskGuard;

    /// Register a task that fires once after `delay`.
    fn after(&mut self, delay: Duration) -> TaskGuard;
}

struct Registration {
    id: TaskId,
    kind: TaskKind,
    due: Duration,
    signal: StopSignal,
}

/// Deterministic frame-driven scheduler.
///
/// Time only moves when [`advance`](Self::advance) is called, so the same
/// sequence of frame deltas always produces the same dispatch order.
#[derive(Default)]
pub struct Scheduler {
    next_id: TaskId,
    now: Duration,
    frames: u64,
    tasks: Vec<Registration>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("frames", &self.frames)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl Scheduler {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of frames advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Number of tasks that can still fire.
    pub fn live_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.signal.is_stopped())
            .count()
    }

    fn register(&mut self, kind: TaskKind) -> TaskGuard {
        self.next_id += 1;
        let id = self.next_id;
        let due = match kind {
            TaskKind::Frame => self.now,
            TaskKind::Every(period) | TaskKind::After(period) => self.now.saturating_add(period),
        };
        let signal = StopSignal::default();
        self.tasks.push(Registration {
            id,
            kind,
            due,
            signal: signal.clone(),
        });
        tracing::trace!(task_id = id, kind = ?kind, "task registered");
        TaskGuard { id, kind, signal }
    }

    /// Advance by one rendered frame of length `dt` and return the tasks
    /// that came due.
    ///
    /// Timer firings come out in due-time order (ties broken by registration
    /// order); frame tasks follow all timers of the frame. The returned
    /// [`Due`] does not borrow the scheduler, so handlers may register new
    /// tasks while draining it, and it re-checks revocation before yielding
    /// each entry.
    pub fn advance(&mut self, dt: Duration) -> Due {
        self.tasks.retain(|t| !t.signal.is_stopped());
        self.now = self.now.saturating_add(dt);
        self.frames += 1;

        let mut due: Vec<(Fired, StopSignal)> = Vec::new();
        for task in &mut self.tasks {
            let period = match task.kind {
                TaskKind::Frame => continue,
                TaskKind::Every(period) | TaskKind::After(period) => period,
            };
            while task.due <= self.now {
                let fired = Fired {
                    id: task.id,
                    kind: task.kind,
                    dt: period,
                    at: task.due,
                };
                due.push((fired, task.signal.clone()));
                task.due = match task.kind {
                    // One-shot: never due again.
                    TaskKind::After(_) => Duration::MAX,
                    _ => task.due.saturating_add(period),
                };
            }
        }
        due.sort_by_key(|(fired, _)| (fired.at, fired.id));

        let now = self.now;
        due.extend(
            self.tasks
                .iter()
                .filter(|t| t.kind == TaskKind::Frame)
                .map(|t| {
                    let fired = Fired {
                        id: t.id,
                        kind: t.kind,
                        dt,
                        at: now,
                    };
                    (fired, t.signal.clone())
                }),
        );

        Due {
            entries: due.into_iter(),
        }
    }
}

/// Tasks that came due during one [`Scheduler::advance`] call.
pub struct Due {
    entries: std::vec::IntoIter<(Fired, StopSignal)>,
}

impl Iterator for Due {
    type Item = Fired;

    fn next(&mut self) -> Option<Fired> {
        for (fired, signal) in self.entries.by_ref() {
            if signal.is_stopped() {
                continue;
            }
            if matches!(fired.kind, TaskKind::After(_)) {
                signal.stop();
            }
            return Some(fired);
        }
        None
    }
}

impl fmt::Debug for Due {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Due")
            .field("pending", &self.entries.len())
            .finish()
    }
}

impl Host for Scheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn request_frames(&mut self) -> TaskGuard {
        self.register(TaskKind::Frame)
    }

    fn every(&mut self, period: Duration) -> TaskGuard {
        self.register(TaskKind::Every(period.max(MIN_PERIOD)))
    }

    fn after(&mut self, delay: Duration) -> TaskGuard {
        self.register(TaskKind::After(delay))
    }
}
