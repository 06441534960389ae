#![forbid(unsafe_code)]

//! One-shot staggered entrance animation over [`Stage`] elements.
//!
//! A [`RevealTimeline`] lists steps; each step selects elements by class and
//! brings every match from a hidden state to [`VisualState::REST`]. The
//! element at index `i` of a step starts at `delay + i * stagger`. Steps run
//! side by side, each on its own delay.
//!
//! [`RevealSequencer::start`] snaps every matched element to its hidden
//! state, then registers a single interval task. Each firing advances all
//! tracks; once every track is complete the sequencer revokes its own task.
//! A sequencer plays once: there is no reset, and replaying means starting
//! a new one.

use std::time::Duration;

use glam::Vec2;
use obsidian_core::animation::{Animation, Delayed, EasingFn, Fade, delay, linear, stagger_offsets};
use obsidian_runtime::{Fired, Host, TaskGuard, TaskId};

use crate::stage::{ElementId, Stage, VisualState};

/// Interval at which running reveals are stepped (about 60 Hz).
pub const REVEAL_TICK: Duration = Duration::from_millis(16);

/// One selector of a timeline.
#[derive(Debug, Clone)]
pub struct RevealStep {
    selector: String,
    from: VisualState,
    duration: Duration,
    stagger: Duration,
    delay: Duration,
    easing: EasingFn,
}

impl RevealStep {
    /// Animate elements of class `selector` from `from` to rest over
    /// `duration`, linearly, with no stagger or delay.
    pub fn new(selector: impl Into<String>, from: VisualState, duration: Duration) -> Self {
        Self {
            selector: selector.into(),
            from,
            duration,
            stagger: Duration::ZERO,
            delay: Duration::ZERO,
            easing: linear,
        }
    }

    /// Fade in while rising from `dy` pixels below.
    pub fn rise(selector: impl Into<String>, dy: f32, duration: Duration) -> Self {
        Self::new(selector, VisualState::hidden(Vec2::new(0.0, dy)), duration)
    }

    /// Fade in while sliding from `dx` pixels to the side.
    pub fn slide(selector: impl Into<String>, dx: f32, duration: Duration) -> Self {
        Self::new(selector, VisualState::hidden(Vec2::new(dx, 0.0)), duration)
    }

    /// Gap between the start of consecutive matched elements.
    #[must_use]
    pub fn stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Wait this long after the timeline starts before the first element moves.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Curve applied to each element's progress.
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Class this step matches on the stage.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// When the last of `matches` elements finishes.
    pub fn span(&self, matches: usize) -> Duration {
        if matches == 0 {
            return Duration::ZERO;
        }
        let last = u32::try_from(matches - 1).unwrap_or(u32::MAX);
        self.delay
            .saturating_add(self.stagger.saturating_mul(last))
            .saturating_add(self.duration)
    }
}

/// Ordered list of steps.
#[derive(Debug, Clone, Default)]
pub struct RevealTimeline {
    steps: Vec<RevealStep>,
}

impl RevealTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(mut self, step: RevealStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[RevealStep] {
        &self.steps
    }

    /// Total running time against `stage`.
    pub fn span(&self, stage: &Stage) -> Duration {
        self.steps
            .iter()
            .map(|s| s.span(stage.select(&s.selector).len()))
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug)]
struct Track {
    element: ElementId,
    from: VisualState,
    anim: Delayed<Fade>,
}

/// A running (or finished) reveal.
#[derive(Debug)]
pub struct RevealSequencer {
    tracks: Vec<Track>,
    guard: Option<TaskGuard>,
    finished: bool,
}

impl RevealSequencer {
    /// Hide every matched element and register the stepping task.
    ///
    /// A timeline that matches nothing finishes immediately without
    /// registering anything.
    pub fn start(timeline: &RevealTimeline, stage: &mut Stage, host: &mut dyn Host) -> Self {
        let mut tracks = Vec::new();
        for step in timeline.steps() {
            let matched = stage.select(&step.selector);
            if matched.is_empty() {
                tracing::trace!(selector = %step.selector, "reveal selector matched nothing");
                continue;
            }
            let offsets = stagger_offsets(matched.len(), step.stagger);
            for (element, offset) in matched.into_iter().zip(offsets) {
                stage.set_state(element, step.from);
                let fade = Fade::new(step.duration).easing(step.easing);
                tracks.push(Track {
                    element,
                    from: step.from,
                    anim: delay(step.delay.saturating_add(offset), fade),
                });
            }
        }

        if tracks.is_empty() {
            return Self {
                tracks,
                guard: None,
                finished: true,
            };
        }
        let guard = host.every(REVEAL_TICK);
        tracing::debug!(task_id = guard.id(), elements = tracks.len(), "reveal started");
        Self {
            tracks,
            guard: Some(guard),
            finished: false,
        }
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.guard.as_ref().map(TaskGuard::id)
    }

    /// Whether the stepping task is still registered.
    pub fn is_running(&self) -> bool {
        self.guard.as_ref().is_some_and(TaskGuard::is_live)
    }

    /// Whether every element reached rest. A cancelled reveal never finishes.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance all tracks if `fired` belongs to this reveal.
    pub fn handle(&mut self, fired: &Fired, stage: &mut Stage) -> bool {
        if !self.is_running() || self.task_id() != Some(fired.id) {
            return false;
        }
        let mut done = true;
        for track in &mut self.tracks {
            if track.anim.is_complete() {
                continue;
            }
            track.anim.tick(fired.dt);
            if track.anim.has_started() {
                let state = track.from.lerp(VisualState::REST, track.anim.value());
                stage.set_state(track.element, state);
            }
            done &= track.anim.is_complete();
        }
        if done {
            self.finished = true;
            if let Some(guard) = self.guard.take() {
                tracing::debug!(task_id = guard.id(), "reveal complete");
            }
        }
        true
    }

    /// Stop where it is. Elements keep whatever state they reached.
    pub fn cancel(&mut self) {
        if let Some(guard) = self.guard.take() {
            tracing::debug!(task_id = guard.id(), "reveal cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsidian_core::animation::ease_out_quint;
    use obsidian_runtime::Scheduler;

    fn drive(
        host: &mut Scheduler,
        reveal: &mut RevealSequencer,
        stage: &mut Stage,
        total: Duration,
    ) {
        let mut left = total;
        while !left.is_zero() {
            let dt = left.min(REVEAL_TICK);
            left -= dt;
            for fired in host.advance(dt) {
                reveal.handle(&fired, stage);
            }
        }
    }

    fn landing_stage() -> Stage {
        let mut stage = Stage::new();
        for i in 0..5 {
            stage.push(format!("line-{i}"), "reveal-up");
        }
        stage
    }

    #[test]
    fn start_hides_matches() {
        let mut host = Scheduler::new();
        let mut stage = landing_stage();
        let timeline = RevealTimeline::new().step(RevealStep::rise(
            "reveal-up",
            40.0,
            Duration::from_millis(1200),
        ));
        let reveal = RevealSequencer::start(&timeline, &mut stage, &mut host);
        assert!(reveal.is_running());
        for e in stage.elements() {
            assert_eq!(e.state().opacity, 0.0);
            assert_eq!(e.state().offset.y, 40.0);
        }
    }

    #[test]
    fn stagger_orders_element_starts() {
        let mut host = Scheduler::new();
        let mut stage = landing_stage();
        let timeline = RevealTimeline::new().step(
            RevealStep::rise("reveal-up", 40.0, Duration::from_millis(1200))
                .stagger(Duration::from_millis(200))
                .easing(ease_out_quint),
        );
        let mut reveal = RevealSequencer::start(&timeline, &mut stage, &mut host);
        drive(&mut host, &mut reveal, &mut stage, Duration::from_millis(320));
        let opacities: Vec<f32> = stage.elements().iter().map(|e| e.state().opacity).collect();
        assert!(opacities[0] > opacities[1]);
        assert!(opacities[1] > 0.0);
        assert_eq!(opacities[2], 0.0);
    }

    #[test]
    fn completes_and_revokes_itself() {
        let mut host = Scheduler::new();
        let mut stage = landing_stage();
        let step = RevealStep::rise("reveal-up", 40.0, Duration::from_millis(1200))
            .stagger(Duration::from_millis(200));
        let timeline = RevealTimeline::new().step(step);
        assert_eq!(timeline.span(&stage), Duration::from_millis(2000));
        let mut reveal = RevealSequencer::start(&timeline, &mut stage, &mut host);
        drive(&mut host, &mut reveal, &mut stage, Duration::from_millis(2100));
        assert!(reveal.is_finished());
        assert!(!reveal.is_running());
        assert_eq!(host.live_tasks(), 0);
        assert!(stage.elements().iter().all(|e| e.state() == VisualState::REST));
    }

    #[test]
    fn unmatched_selector_is_noop() {
        let mut host = Scheduler::new();
        let mut stage = landing_stage();
        let timeline =
            RevealTimeline::new().step(RevealStep::rise("auth-card", 20.0, Duration::from_secs(1)));
        let reveal = RevealSequencer::start(&timeline, &mut stage, &mut host);
        assert!(reveal.is_finished());
        assert_eq!(host.live_tasks(), 0);
        assert!(stage.elements().iter().all(|e| e.state() == VisualState::REST));
    }

    #[test]
    fn cancel_freezes_stage() {
        let mut host = Scheduler::new();
        let mut stage = landing_stage();
        let timeline = RevealTimeline::new().step(RevealStep::rise(
            "reveal-up",
            40.0,
            Duration::from_millis(1200),
        ));
        let mut reveal = RevealSequencer::start(&timeline, &mut stage, &mut host);
        drive(&mut host, &mut reveal, &mut stage, Duration::from_millis(300));
        reveal.cancel();
        let frozen: Vec<VisualState> = stage.elements().iter().map(|e| e.state()).collect();
        drive(&mut host, &mut reveal, &mut stage, Duration::from_secs(3));
        let after: Vec<VisualState> = stage.elements().iter().map(|e| e.state()).collect();
        assert_eq!(frozen, after);
        assert!(!reveal.is_finished());
    }

    #[test]
    fn delayed_step_waits() {
        let mut host = Scheduler::new();
        let mut stage = Stage::new().with("l0", "terminal-line");
        let timeline = RevealTimeline::new().step(
            RevealStep::slide("terminal-line", -10.0, Duration::from_millis(500))
                .delay(Duration::from_millis(500)),
        );
        let mut reveal = RevealSequencer::start(&timeline, &mut stage, &mut host);
        drive(&mut host, &mut reveal, &mut stage, Duration::from_millis(480));
        assert_eq!(stage.state(0).map(|s| s.opacity), Some(0.0));
        drive(&mut host, &mut reveal, &mut stage, Duration::from_millis(600));
        assert_eq!(stage.state(0), Some(VisualState::REST));
    }
}
