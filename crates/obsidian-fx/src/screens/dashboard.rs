#![forbid(unsafe_code)]

//! Dashboard: the rotating network globe, card entrance and telemetry.

use std::time::Duration;

use obsidian_core::animation::ease_out_cubic;
use obsidian_runtime::{Fired, TaskScope};
use rand::rngs::SmallRng;

use super::{Readout, Screen, ScreenContext, ScreenId, screen_rng};
use crate::config::{DashboardConfig, ScreenConfig};
use crate::motion::MotionDriver;
use crate::particles::{Distribution, ParticleField};
use crate::render::PointSurface;
use crate::reveal::{RevealSequencer, RevealStep, RevealTimeline};
use crate::stage::Stage;
use crate::telemetry::LatencyWalk;

const TELEMETRY: &str = "telemetry";

/// Card titles in layout order.
pub const CARDS: [&str; 6] = [
    "Global Network Map",
    "Security Profile",
    "Active Operations",
    "Asset Vault",
    "Comms",
    "Performance Metrics",
];

pub struct DashboardScreen {
    config: DashboardConfig,
    rng: SmallRng,
    globe: ParticleField,
    motion: MotionDriver,
    stage: Stage,
    reveal: RevealSequencer,
    latency: LatencyWalk,
    clock_label: String,
    scope: TaskScope,
}

impl std::fmt::Debug for DashboardScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardScreen")
            .field("globe", &self.globe.len())
            .field("rotation", &self.globe.rotation())
            .field("latency", &self.latency.value)
            .field("scope", &self.scope)
            .finish()
    }
}

impl DashboardScreen {
    pub fn mount(config: &ScreenConfig, cx: &mut ScreenContext<'_>) -> Self {
        let cfg = config.dashboard.clone();
        let mut rng = screen_rng(ScreenId::Dashboard, config);
        let globe = ParticleField::generate(
            cfg.globe_points,
            Distribution::Shell {
                radius: cfg.globe_radius,
            },
            &mut rng,
        );
        let motion = MotionDriver::attach(cx.host, cfg.rate);

        let mut stage = Stage::new();
        for title in CARDS {
            stage.push(title, "card");
        }
        // Each card animates on its own; no stagger between them.
        let timeline = RevealTimeline::new().step(
            RevealStep::rise("card", 20.0, Duration::from_millis(600)).easing(ease_out_cubic),
        );
        let reveal = RevealSequencer::start(&timeline, &mut stage, cx.host);

        let mut scope = TaskScope::new("dashboard");
        scope.insert(TELEMETRY, cx.host.every(cfg.telemetry_interval()));
        let clock_label = cfg.clock.render(cx.clock.now(cx.host.now()));

        Self {
            latency: cfg.latency,
            config: cfg,
            rng,
            globe,
            motion,
            stage,
            reveal,
            clock_label,
            scope,
        }
    }

    pub fn globe(&self) -> &ParticleField {
        &self.globe
    }

    pub fn latency(&self) -> f32 {
        self.latency.value
    }

    pub fn clock_label(&self) -> &str {
        &self.clock_label
    }
}

impl Screen for DashboardScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Dashboard
    }

    fn handle(&mut self, fired: &Fired, cx: &mut ScreenContext<'_>) -> Option<ScreenId> {
        if self.motion.handle(fired, &mut self.globe)
            || self.reveal.handle(fired, &mut self.stage)
        {
            return None;
        }
        if self.scope.label_of(fired.id) == Some(TELEMETRY) {
            self.clock_label = self.config.clock.render(cx.clock.now(fired.at));
            self.latency.advance(&mut self.rng);
        }
        None
    }

    fn draw(&self, surface: &mut dyn PointSurface) {
        surface.draw_points(self.globe.points(), self.globe.transform());
    }

    fn readouts(&self) -> Vec<Readout> {
        vec![
            Readout::new("time", self.clock_label.clone()),
            Readout::new("ping", format!("Ping: {}", self.latency.label())),
        ]
    }

    fn stage(&self) -> &Stage {
        &self.stage
    }

    fn live_tasks(&self) -> usize {
        usize::from(self.motion.is_attached())
            + usize::from(self.reveal.is_running())
            + self.scope.live_count()
    }

    fn unmount(&mut self) {
        self.motion.detach();
        self.reveal.cancel();
        self.scope.dispose();
        tracing::info!(screen = "dashboard", "screen unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::VisualState;
    use crate::telemetry::SimulatedClock;
    use obsidian_runtime::Scheduler;

    fn mounted(host: &mut Scheduler) -> DashboardScreen {
        let clock = SimulatedClock::from_unix(0);
        let mut cx = ScreenContext { host, clock: &clock };
        DashboardScreen::mount(&ScreenConfig::default().with_seed(2), &mut cx)
    }

    fn run(host: &mut Scheduler, screen: &mut DashboardScreen, frames: usize, dt: Duration) {
        let clock = SimulatedClock::from_unix(0);
        for _ in 0..frames {
            for fired in host.advance(dt) {
                let mut cx = ScreenContext { host: &mut *host, clock: &clock };
                screen.handle(&fired, &mut cx);
            }
        }
    }

    #[test]
    fn globe_points_sit_on_radius() {
        let mut host = Scheduler::new();
        let screen = mounted(&mut host);
        assert_eq!(screen.globe().len(), 1500);
        assert!(screen.globe().points().iter().all(|p| (p.length() - 2.5).abs() < 1e-4));
    }

    #[test]
    fn rotation_is_per_frame() {
        let mut host = Scheduler::new();
        let mut screen = mounted(&mut host);
        run(&mut host, &mut screen, 1000, Duration::from_millis(33));
        let r = screen.globe().rotation();
        assert!((r.x - 1.0).abs() < 1e-9);
        assert!((r.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn cards_settle_together() {
        let mut host = Scheduler::new();
        let mut screen = mounted(&mut host);
        run(&mut host, &mut screen, 40, Duration::from_millis(16));
        assert!(screen.stage().elements().iter().all(|e| e.state() == VisualState::REST));
        // motion and telemetry remain
        assert_eq!(screen.live_tasks(), 2);
    }

    #[test]
    fn telemetry_updates_each_second() {
        let mut host = Scheduler::new();
        let mut screen = mounted(&mut host);
        assert_eq!(screen.clock_label(), "00:00:00");
        run(&mut host, &mut screen, 120, Duration::from_millis(500));
        assert_eq!(screen.clock_label(), "00:01:00");
        assert!((18.0..=42.0).contains(&screen.latency()));
    }
}
