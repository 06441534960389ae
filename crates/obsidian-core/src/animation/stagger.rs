#![forbid(unsafe_code)]

//! Stagger offsets: when each item of a list starts its entrance.
//!
//! # Invariants
//!
//! 1. `stagger_offsets(0, ..)` is empty.
//! 2. The first offset is always `Duration::ZERO`.
//! 3. `offset[i] == i * step`, computed in integer nanoseconds.

use std::time::Duration;

/// Start offsets for `count` items spaced evenly by `step`.
#[must_use]
pub fn stagger_offsets(count: usize, step: Duration) -> Vec<Duration> {
    (0..count)
        .map(|i| step.saturating_mul(u32::try_from(i).unwrap_or(u32::MAX)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn nothing_to_stagger() {
        assert!(stagger_offsets(0, ms(200)).is_empty());
        assert_eq!(stagger_offsets(1, ms(200)), vec![Duration::ZERO]);
    }

    #[test]
    fn hero_blocks_start_200ms_apart() {
        let expected: Vec<Duration> = [0, 200, 400, 600, 800].into_iter().map(ms).collect();
        assert_eq!(stagger_offsets(5, ms(200)), expected);
    }

    #[test]
    fn terminal_lines_cascade_every_50ms() {
        let offsets = stagger_offsets(7, ms(50));
        assert_eq!(offsets[3], ms(150));
        assert_eq!(offsets.last(), Some(&ms(300)));
    }

    #[test]
    fn zero_step_starts_everything_together() {
        assert!(stagger_offsets(8, Duration::ZERO).iter().all(Duration::is_zero));
    }
}
