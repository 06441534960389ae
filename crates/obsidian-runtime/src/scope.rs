#![forbid(unsafe_code)]

//! Per-owner collection of task guards.
//!
//! A [`TaskScope`] is what a screen holds to prove it can tear everything
//! down: every guard an effect acquires is parked here under a label, and
//! [`TaskScope::dispose`] (or dropping the scope) revokes all of them at
//! once.
//!
//! # Invariants
//!
//! 1. After `dispose()` the scope is empty and no guard it held is live.
//! 2. Dropping the scope is equivalent to `dispose()`.
//! 3. Re-inserting under an existing label revokes the previous guard.

use crate::scheduler::{TaskGuard, TaskId};

struct ScopedTask {
    label: String,
    guard: TaskGuard,
}

/// Owner of every task registered on behalf of one screen.
pub struct TaskScope {
    name: &'static str,
    tasks: Vec<ScopedTask>,
}

impl std::fmt::Debug for TaskScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScope")
            .field("name", &self.name)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl TaskScope {
    /// Create an empty scope; `name` appears in log records.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            tasks: Vec::new(),
        }
    }

    /// Park `guard` under `label`, revoking any guard already stored there.
    /// Returns the task id for dispatch matching.
    pub fn insert(&mut self, label: impl Into<String>, guard: TaskGuard) -> TaskId {
        let label = label.into();
        let id = guard.id();
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.label == label) {
            tracing::debug!(scope = self.name, label = %label, "replacing scoped task");
            existing.guard = guard;
        } else {
            self.tasks.push(ScopedTask { label, guard });
        }
        id
    }

    /// Label of the task with `id`, if this scope holds it.
    ///
    /// A timeout is spent by the time its firing is handled, so this also
    /// matches guards that are no longer live until they are pruned.
    pub fn label_of(&self, id: TaskId) -> Option<&str> {
        self.tasks
            .iter()
            .find(|t| t.guard.id() == id)
            .map(|t| t.label.as_str())
    }

    /// Number of live tasks in the scope.
    pub fn live_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.guard.is_live()).count()
    }

    /// Drop guards whose tasks already finished (spent timeouts).
    pub fn prune(&mut self) {
        self.tasks.retain(|t| t.guard.is_live());
    }

    /// Revoke every task. Returns how many were still live.
    pub fn dispose(&mut self) -> usize {
        let live = self.live_count();
        self.tasks.clear();
        if live > 0 {
            tracing::debug!(scope = self.name, revoked = live, "scope disposed");
        }
        live
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.dispose();
    }
}
