#![forbid(unsafe_code)]

//! Cosmetic readouts: the fake ping, clock labels and session ids.
//!
//! None of these values measure anything.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bounded random walk standing in for a network latency reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyWalk {
    /// Current reading in milliseconds.
    pub value: f32,
    /// Lower clamp.
    pub min: f32,
    /// Upper clamp.
    pub max: f32,
    /// Largest change per step, in either direction.
    pub step: f32,
}

impl Default for LatencyWalk {
    fn default() -> Self {
        Self {
            value: 24.0,
            min: 18.0,
            max: 42.0,
            step: 2.0,
        }
    }
}

impl LatencyWalk {
    /// Move by a uniform amount in `[-step, step]` and clamp.
    ///
    /// A step that is not a positive finite number leaves the reading alone,
    /// as do bounds that cannot be ordered.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        if !(self.step.is_finite() && self.step > 0.0) {
            return self.value;
        }
        let (lo, hi) = (self.min.min(self.max), self.max.max(self.min));
        if lo <= hi {
            let next = self.value + self.step * rng.gen_range(-1.0f32..=1.0);
            self.value = next.clamp(lo, hi);
        }
        self.value
    }

    /// Every field is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.value, self.min, self.max, self.step].iter().all(|v| v.is_finite())
    }

    /// Whole-millisecond label, e.g. `"24ms"`.
    pub fn label(&self) -> String {
        format!("{:.0}ms", self.value)
    }
}

/// How a clock label is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockFormat {
    /// `2026-10-18T09:15:02.000Z`
    #[default]
    Iso8601,
    /// `09:15:02`
    TimeOfDay,
}

impl ClockFormat {
    pub fn render(self, at: DateTime<Utc>) -> String {
        match self {
            Self::Iso8601 => at.to_rfc3339_opts(SecondsFormat::Millis, true),
            Self::TimeOfDay => at.format("%H:%M:%S").to_string(),
        }
    }
}

/// Source of wall-clock time for labels.
///
/// `elapsed` is scheduler time since start; real clocks ignore it, while
/// simulated ones derive the reading from it.
pub trait ClockSource {
    fn now(&self, elapsed: Duration) -> DateTime<Utc>;
}

/// The host's real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self, _elapsed: Duration) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that starts at a fixed instant and follows scheduler time.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedClock {
    origin: DateTime<Utc>,
}

impl SimulatedClock {
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self { origin }
    }

    /// Start at `secs` seconds after the Unix epoch.
    pub fn from_unix(secs: i64) -> Self {
        Self {
            origin: DateTime::from_timestamp(secs, 0).unwrap_or_default(),
        }
    }
}

impl ClockSource for SimulatedClock {
    fn now(&self, elapsed: Duration) -> DateTime<Utc> {
        chrono::Duration::from_std(elapsed)
            .ok()
            .and_then(|d| self.origin.checked_add_signed(d))
            .unwrap_or(self.origin)
    }
}

/// Alphabet of session ids.
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated session ids.
pub const SESSION_ID_LEN: usize = 6;

/// Random uppercase base-36 session id.
pub fn session_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SESSION_ID_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn walk_starts_at_24_and_stays_bounded() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut walk = LatencyWalk::default();
        assert_eq!(walk.label(), "24ms");
        for _ in 0..10_000 {
            let v = walk.advance(&mut rng);
            assert!((18.0..=42.0).contains(&v));
        }
    }

    #[test]
    fn walk_moves_at_most_one_step() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut walk = LatencyWalk::default();
        for _ in 0..1000 {
            let before = walk.value;
            let after = walk.advance(&mut rng);
            assert!((after - before).abs() <= 2.0 + f32::EPSILON);
        }
    }

    #[test]
    fn zero_step_is_constant() {
        let mut walk = LatencyWalk {
            step: 0.0,
            ..LatencyWalk::default()
        };
        assert_eq!(walk.advance(&mut SmallRng::seed_from_u64(0)), 24.0);
    }

    #[test]
    fn infinite_step_is_ignored() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut walk = LatencyWalk {
            step: f32::INFINITY,
            ..LatencyWalk::default()
        };
        assert!(!walk.is_finite());
        assert_eq!(walk.advance(&mut rng), 24.0);

        walk.step = f32::NAN;
        assert_eq!(walk.advance(&mut rng), 24.0);
    }

    #[test]
    fn huge_finite_step_stays_clamped() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut walk = LatencyWalk {
            step: f32::MAX,
            ..LatencyWalk::default()
        };
        for _ in 0..100 {
            assert!((18.0..=42.0).contains(&walk.advance(&mut rng)));
        }
    }

    #[test]
    fn unordered_bounds_do_not_panic() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut swapped = LatencyWalk {
            min: 42.0,
            max: 18.0,
            ..LatencyWalk::default()
        };
        assert!((18.0..=42.0).contains(&swapped.advance(&mut rng)));

        let mut broken = LatencyWalk {
            min: f32::NAN,
            max: f32::NAN,
            ..LatencyWalk::default()
        };
        assert_eq!(broken.advance(&mut rng), 24.0);
    }

    #[test]
    fn clock_formats() {
        let clock = SimulatedClock::from_unix(0);
        let at = clock.now(Duration::from_secs(3_723));
        assert_eq!(ClockFormat::TimeOfDay.render(at), "01:02:03");
        assert_eq!(ClockFormat::Iso8601.render(at), "1970-01-01T01:02:03.000Z");
    }

    #[test]
    fn simulated_clock_follows_elapsed() {
        let clock = SimulatedClock::from_unix(1_000);
        let a = clock.now(Duration::ZERO);
        let b = clock.now(Duration::from_secs(5));
        assert_eq!((b - a).num_seconds(), 5);
    }

    #[test]
    fn session_ids_are_base36_uppercase() {
        let mut rng = SmallRng::seed_from_u64(8);
        for _ in 0..50 {
            let id = session_id(&mut rng);
            assert_eq!(id.len(), SESSION_ID_LEN);
            assert!(id.bytes().all(|b| BASE36.contains(&b)));
        }
    }
}
