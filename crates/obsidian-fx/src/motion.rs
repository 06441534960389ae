#![forbid(unsafe_code)]

//! Per-frame rotation of a [`ParticleField`].
//!
//! The driver owns the frame task it registers. The screen forwards every
//! [`Fired`] record to [`MotionDriver::handle`]; records for other tasks are
//! ignored. After [`MotionDriver::detach`] (or drop) the task is revoked and
//! the field is never touched again.

use std::time::Duration;

use obsidian_runtime::{Fired, Host, TaskGuard, TaskId};
use serde::{Deserialize, Serialize};

use crate::particles::ParticleField;

/// Angular increment applied on each frame, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "per", rename_all = "snake_case")]
pub enum AngularRate {
    /// Fixed increment per rendered frame, regardless of frame length.
    Frame {
        /// X axis increment.
        x: f64,
        /// Y axis increment.
        y: f64,
    },
    /// Increment proportional to the frame delta.
    Second {
        /// X axis radians per second.
        x: f64,
        /// Y axis radians per second.
        y: f64,
    },
}

impl AngularRate {
    /// Increment `(dx, dy)` for a frame of length `dt`.
    pub fn increment(&self, dt: Duration) -> (f64, f64) {
        match *self {
            Self::Frame { x, y } => (x, y),
            Self::Second { x, y } => {
                let secs = dt.as_secs_f64();
                (x * secs, y * secs)
            }
        }
    }
}

/// Continuous rotation driver bound to one frame task.
#[derive(Debug)]
pub struct MotionDriver {
    rate: AngularRate,
    guard: Option<TaskGuard>,
    frames: u64,
}

impl MotionDriver {
    /// Register a frame task on `host` and start driving at `rate`.
    pub fn attach(host: &mut dyn Host, rate: AngularRate) -> Self {
        let guard = host.request_frames();
        tracing::debug!(task_id = guard.id(), ?rate, "motion driver attached");
        Self {
            rate,
            guard: Some(guard),
            frames: 0,
        }
    }

    /// Configured rate.
    pub fn rate(&self) -> AngularRate {
        self.rate
    }

    /// Frame task id while attached.
    pub fn task_id(&self) -> Option<TaskId> {
        self.guard.as_ref().map(TaskGuard::id)
    }

    /// Whether the frame task is still registered.
    pub fn is_attached(&self) -> bool {
        self.guard.as_ref().is_some_and(TaskGuard::is_live)
    }

    /// Frames applied so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Apply one frame of rotation if `fired` belongs to this driver.
    ///
    /// Returns `true` when the record was consumed.
    pub fn handle(&mut self, fired: &Fired, field: &mut ParticleField) -> bool {
        if !self.is_attached() || self.task_id() != Some(fired.id) {
            return false;
        }
        let (dx, dy) = self.rate.increment(fired.dt);
        field.rotate_by(dx, dy);
        self.frames += 1;
        true
    }

    /// Revoke the frame task. Idempotent.
    pub fn detach(&mut self) {
        if let Some(guard) = self.guard.take() {
            tracing::debug!(task_id = guard.id(), frames = self.frames, "motion driver detached");
        }
    }
}
