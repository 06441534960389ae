#![forbid(unsafe_code)]

//! Looping decorations for the access screen: the biometric scan line and
//! the falling data packets. Neither ever completes; both stop only when
//! their frame task is revoked.

use std::time::Duration;

use obsidian_core::animation::{Animation, Delayed, Loop, LoopMode, delay, ease_in_out};
use obsidian_runtime::{Fired, Host, TaskGuard, TaskId};
use rand::Rng;

/// Travel of the scan line, in scanner units.
pub const SCAN_TRAVEL: f32 = 120.0;

/// Length of one sweep of the scan line.
pub const SCAN_LEG: Duration = Duration::from_secs(2);

/// Scan line sweeping down and back up forever.
#[derive(Debug)]
pub struct ScanLine {
    sweep: Loop,
    guard: Option<TaskGuard>,
}

impl ScanLine {
    pub fn start(host: &mut dyn Host) -> Self {
        Self {
            sweep: Loop::new(SCAN_LEG, LoopMode::Yoyo).easing(ease_in_out),
            guard: Some(host.request_frames()),
        }
    }

    /// Vertical position in `[0, SCAN_TRAVEL]`.
    pub fn offset(&self) -> f32 {
        self.sweep.value() * SCAN_TRAVEL
    }

    /// Completed sweeps, counting both directions.
    pub fn sweeps(&self) -> u64 {
        self.sweep.legs_completed()
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.guard.as_ref().map(TaskGuard::id)
    }

    pub fn handle(&mut self, fired: &Fired) -> bool {
        if self.task_id() != Some(fired.id) {
            return false;
        }
        self.sweep.tick(fired.dt);
        true
    }

    pub fn stop(&mut self) {
        self.guard = None;
    }
}

/// One falling label in the data stream.
#[derive(Debug, Clone)]
pub struct DataPacket {
    /// Horizontal position as a percentage of the viewport width.
    pub left: f32,
    /// Upper label, 13 uppercase hex digits.
    pub head: String,
    /// Lower label, 8 uppercase hex digits.
    pub tail: String,
    /// Peak opacity reached at the bottom of each fall.
    pub opacity: f32,
    fall: Delayed<Loop>,
}

fn hex_label<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| {
            let digit = rng.gen_range(0..16u32);
            char::from_digit(digit, 16).map_or('0', |c| c.to_ascii_uppercase())
        })
        .collect()
}

impl DataPacket {
    /// Build a packet with randomized placement, labels and timing.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let left = rng.gen_range(0.0..100.0);
        let head = hex_label(13, rng);
        let tail = hex_label(8, rng);
        let period = Duration::from_secs_f32(rng.gen_range(10.0..25.0));
        let wait = Duration::from_secs_f32(rng.gen_range(0.0..10.0));
        let opacity = rng.gen_range(0.1..0.4);
        Self {
            left,
            head,
            tail,
            opacity,
            fall: delay(wait, Loop::new(period, LoopMode::Restart)),
        }
    }

    /// Fall progress in `[0, 1)`; zero while still waiting.
    pub fn progress(&self) -> f32 {
        self.fall.value()
    }

    /// Opacity at the current point of the fall.
    pub fn current_opacity(&self) -> f32 {
        self.opacity * self.progress()
    }

    /// Whether the start delay has passed.
    pub fn is_falling(&self) -> bool {
        self.fall.has_started()
    }

    fn tick(&mut self, dt: Duration) {
        self.fall.tick(dt);
    }
}

/// The full set of packets, advanced by one frame task.
#[derive(Debug)]
pub struct DataStream {
    packets: Vec<DataPacket>,
    guard: Option<TaskGuard>,
}

impl DataStream {
    /// Generate `count` packets and start them falling.
    pub fn start<R: Rng + ?Sized>(count: usize, host: &mut dyn Host, rng: &mut R) -> Self {
        let packets: Vec<DataPacket> = (0..count).map(|_| DataPacket::random(rng)).collect();
        let guard = (!packets.is_empty()).then(|| host.request_frames());
        Self { packets, guard }
    }

    pub fn packets(&self) -> &[DataPacket] {
        &self.packets
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.guard.as_ref().map(TaskGuard::id)
    }

    pub fn handle(&mut self, fired: &Fired) -> bool {
        if self.task_id() != Some(fired.id) {
            return false;
        }
        for packet in &mut self.packets {
            packet.tick(fired.dt);
        }
        true
    }

    pub fn stop(&mut self) {
        self.guard = None;
    }
}
