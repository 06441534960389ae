#![forbid(unsafe_code)]

//! Time-based animation primitives.
//!
//! Every animation is advanced explicitly with [`Animation::tick`] and reports
//! a normalized value in `[0.0, 1.0]`. Nothing here owns a timer: the host
//! scheduler decides when to tick, which keeps the primitives deterministic
//! under test.
//!
//! The named easing curves mirror the web animation vocabulary used by the
//! screens (`power1.inOut`, `power2.out`, `power4.out`):
//!
//! | Curve            | Function            |
//! |------------------|---------------------|
//! | `none`           | [`linear`]          |
//! | `power1.inOut`   | [`ease_in_out`]     |
//! | `power2.out`     | [`ease_out_cubic`]  |
//! | `power4.out`     | [`ease_out_quint`]  |

pub mod stagger;

use std::time::Duration;

pub use stagger::stagger_offsets;

/// Maps normalized time in `[0, 1]` to normalized progress in `[0, 1]`.
pub type EasingFn = fn(f32) -> f32;

#[inline]
fn unit(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Straight line, also used for `none`.
#[inline]
pub fn linear(t: f32) -> f32 {
    unit(t)
}

/// Quadratic, slow finish.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - unit(t)).powi(2)
}

/// `power1.inOut`.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = unit(t);
    match t < 0.5 {
        true => 2.0 * t.powi(2),
        false => 1.0 - 2.0 * (1.0 - t).powi(2),
    }
}

/// `power2.out`.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - unit(t)).powi(3)
}

/// `power4.out`: covers most of the distance early, then creeps in.
#[inline]
pub fn ease_out_quint(t: f32) -> f32 {
    1.0 - (1.0 - unit(t)).powi(5)
}

/// Zero-length spans become one nanosecond so ratios stay finite.
#[inline]
fn at_least_1ns(span: Duration) -> Duration {
    span.max(Duration::from_nanos(1))
}

#[inline]
fn ratio(part: Duration, whole: Duration) -> f32 {
    unit((part.as_secs_f64() / whole.as_secs_f64()) as f32)
}

/// Something that moves with time and reports where it is in `[0, 1]`.
///
/// Animations are one-shot. To play again, build a fresh value.
pub trait Animation {
    /// Move forward by `dt`.
    fn tick(&mut self, dt: Duration);

    /// True once the end has been reached. Endless animations never report it.
    fn is_complete(&self) -> bool;

    /// Eased position, always inside `[0, 1]`.
    fn value(&self) -> f32;

    /// How far ticking has run past the end. Endless animations report zero.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// One eased pass from 0 to 1.
///
/// Progress is kept as accumulated [`Duration`] rather than a float, so a
/// long run of 16ms ticks lands exactly on the end.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    played: Duration,
    length: Duration,
    curve: EasingFn,
}

impl Fade {
    /// A linear pass lasting `length`.
    pub fn new(length: Duration) -> Self {
        Self {
            played: Duration::ZERO,
            length: at_least_1ns(length),
            curve: linear,
        }
    }

    pub fn easing(self, curve: EasingFn) -> Self {
        Self { curve, ..self }
    }

    /// Position before the curve is applied.
    pub fn raw_progress(&self) -> f32 {
        ratio(self.played, self.length)
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.played = self.played.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.played >= self.length
    }

    fn value(&self) -> f32 {
        (self.curve)(self.raw_progress())
    }

    fn overshoot(&self) -> Duration {
        self.played.saturating_sub(self.length)
    }
}

/// What a [`Loop`] does when a leg ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Snap to 0 and run the leg again.
    Restart,
    /// Run the leg in reverse, then forward again.
    Yoyo,
}

/// Endless repetition of one eased leg.
#[derive(Debug, Clone, Copy)]
pub struct Loop {
    leg: Duration,
    /// Offset into the current cycle. A cycle is one leg, or two for `Yoyo`.
    into_cycle: Duration,
    cycles: u64,
    curve: EasingFn,
    mode: LoopMode,
}

impl Loop {
    pub fn new(leg: Duration, mode: LoopMode) -> Self {
        Self {
            leg: at_least_1ns(leg),
            into_cycle: Duration::ZERO,
            cycles: 0,
            curve: linear,
            mode,
        }
    }

    /// Curve applied to each leg. Reverse legs replay it backwards.
    pub fn easing(self, curve: EasingFn) -> Self {
        Self { curve, ..self }
    }

    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    fn cycle_legs(&self) -> u64 {
        if self.mode == LoopMode::Yoyo { 2 } else { 1 }
    }

    /// Legs finished since the start, counting both directions for `Yoyo`.
    pub fn legs_completed(&self) -> u64 {
        let in_cycle = (self.into_cycle.as_nanos() / self.leg.as_nanos()) as u64;
        self.cycles * self.cycle_legs() + in_cycle
    }
}

impl Animation for Loop {
    fn tick(&mut self, dt: Duration) {
        // Only the offset within a cycle is kept so long sessions never lose precision.
        let cycle_ns = self.leg.as_nanos() * u128::from(self.cycle_legs());
        let ns = self.into_cycle.saturating_add(dt).as_nanos();
        self.cycles = self.cycles.saturating_add((ns / cycle_ns) as u64);
        self.into_cycle = Duration::from_nanos((ns % cycle_ns) as u64);
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn value(&self) -> f32 {
        let leg_ns = self.leg.as_nanos();
        let ns = self.into_cycle.as_nanos();
        let t = ratio(Duration::from_nanos((ns % leg_ns) as u64), self.leg);
        let reversing = ns / leg_ns == 1;
        (self.curve)(if reversing { 1.0 - t } else { t })
    }
}

/// Holds an animation at 0 until a delay has passed.
#[derive(Debug, Clone, Copy)]
pub struct Delayed<A> {
    wait: Duration,
    waited: Duration,
    inner: A,
}

impl<A: Animation> Delayed<A> {
    pub fn new(wait: Duration, inner: A) -> Self {
        Self {
            wait,
            waited: Duration::ZERO,
            inner,
        }
    }

    /// True once the wait is over and `inner` is receiving ticks.
    pub fn has_started(&self) -> bool {
        self.waited >= self.wait
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Animation> Animation for Delayed<A> {
    fn tick(&mut self, dt: Duration) {
        if self.has_started() {
            self.inner.tick(dt);
            return;
        }
        self.waited = self.waited.saturating_add(dt);
        // Time past the wait belongs to the inner animation.
        let spill = self.waited.saturating_sub(self.wait);
        if self.has_started() && !spill.is_zero() {
            self.inner.tick(spill);
        }
    }

    fn is_complete(&self) -> bool {
        self.has_started() && self.inner.is_complete()
    }

    fn value(&self) -> f32 {
        match self.has_started() {
            true => self.inner.value(),
            false => 0.0,
        }
    }

    fn overshoot(&self) -> Duration {
        match self.has_started() {
            true => self.inner.overshoot(),
            false => Duration::ZERO,
        }
    }
}

/// Shorthand for [`Delayed::new`].
pub fn delay<A: Animation>(wait: Duration, inner: A) -> Delayed<A> {
    Delayed::new(wait, inner)
}
