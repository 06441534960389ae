#![forbid(unsafe_code)]

//! Random-to-resolved text reveal.
//!
//! At step `k` the first `min(k / 3, L)` characters of the target are shown
//! as-is and every other position shows a glyph drawn uniformly from
//! [`GLYPHS`]. Steps happen every [`SCRAMBLE_INTERVAL`]; the sequence ends on
//! the first frame where the whole target is fixed, so the last emitted
//! value always equals the target exactly.
//!
//! Two forms are offered: [`scramble_frames`], a lazy iterator with no
//! timing, and [`TextScrambler`], which owns an interval task.

use std::time::Duration;

use obsidian_runtime::{Fired, Host, TaskGuard, TaskId};
use rand::Rng;

/// Glyph pool for unresolved positions.
pub const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+";

/// Time between steps.
pub const SCRAMBLE_INTERVAL: Duration = Duration::from_millis(30);

/// Steps needed to fix one more character.
pub const STEPS_PER_CHAR: usize = 3;

/// Number of leading characters fixed at `step` for a target of `len` chars.
#[inline]
pub fn fixed_count(step: usize, len: usize) -> usize {
    (step / STEPS_PER_CHAR).min(len)
}

/// Render the frame for `step`.
pub fn scramble_frame<R: Rng + ?Sized>(target: &[char], step: usize, rng: &mut R) -> String {
    let fixed = fixed_count(step, target.len());
    target
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if i < fixed {
                c
            } else {
                char::from(GLYPHS[rng.gen_range(0..GLYPHS.len())])
            }
        })
        .collect()
}

/// Lazy frame sequence; see [`scramble_frames`].
#[derive(Debug)]
pub struct ScrambleFrames<'r, R: ?Sized> {
    target: Vec<char>,
    step: usize,
    exhausted: bool,
    rng: &'r mut R,
}

/// Every frame of a scramble towards `target`, ending with `target`.
///
/// An empty target yields a single empty string.
pub fn scramble_frames<'r, R: Rng + ?Sized>(target: &str, rng: &'r mut R) -> ScrambleFrames<'r, R> {
    ScrambleFrames {
        target: target.chars().collect(),
        step: 0,
        exhausted: false,
        rng,
    }
}

impl<R: Rng + ?Sized> Iterator for ScrambleFrames<'_, R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }
        let frame = scramble_frame(&self.target, self.step, &mut *self.rng);
        if fixed_count(self.step, self.target.len()) == self.target.len() {
            self.exhausted = true;
        }
        self.step += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let left = (self.target.len() * STEPS_PER_CHAR + 1).saturating_sub(self.step);
        (left, Some(left))
    }
}

/// Scrambling label driven by an interval task.
#[derive(Debug)]
pub struct TextScrambler {
    target: Vec<char>,
    step: usize,
    text: String,
    guard: Option<TaskGuard>,
}

impl TextScrambler {
    /// Show the first frame for `target` and start stepping.
    ///
    /// An empty target shows `""` and registers nothing.
    pub fn start<R: Rng + ?Sized>(target: &str, host: &mut dyn Host, rng: &mut R) -> Self {
        let mut scrambler = Self {
            target: Vec::new(),
            step: 0,
            text: String::new(),
            guard: None,
        };
        scrambler.retarget(target, host, rng);
        scrambler
    }

    /// Abandon the current run and scramble towards `target` from step 0.
    ///
    /// Passing the current target changes nothing: a running scramble keeps
    /// going and a resolved label stays resolved.
    pub fn retarget<R: Rng + ?Sized>(&mut self, target: &str, host: &mut dyn Host, rng: &mut R) {
        if target.chars().eq(self.target.iter().copied()) {
            return;
        }
        self.guard = None;
        self.target = target.chars().collect();
        self.step = 0;
        self.text = scramble_frame(&self.target, 0, rng);
        if self.target.is_empty() {
            return;
        }
        let guard = host.every(SCRAMBLE_INTERVAL);
        tracing::trace!(task_id = guard.id(), text = target, "scramble started");
        self.guard = Some(guard);
    }

    /// Current displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn target(&self) -> String {
        self.target.iter().collect()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Characters currently showing their final value.
    pub fn fixed(&self) -> usize {
        fixed_count(self.step, self.target.len())
    }

    pub fn is_done(&self) -> bool {
        self.fixed() == self.target.len()
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.guard.as_ref().map(TaskGuard::id)
    }

    /// Step once if `fired` belongs to this scrambler.
    pub fn handle<R: Rng + ?Sized>(&mut self, fired: &Fired, rng: &mut R) -> bool {
        match &self.guard {
            Some(g) if g.is_live() && g.id() == fired.id => {}
            _ => return false,
        }
        self.step += 1;
        self.text = scramble_frame(&self.target, self.step, rng);
        if self.is_done()
            && let Some(guard) = self.guard.take()
        {
            tracing::debug!(task_id = guard.id(), text = %self.text, "scramble resolved");
        }
        true
    }

    /// Stop stepping; the text keeps its last frame.
    pub fn cancel(&mut self) {
        self.guard = None;
    }
}
