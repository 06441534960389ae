#![forbid(unsafe_code)]

//! Landing screen: rotating node cube, starfield, floating data lines, the
//! hero reveal and the scrambled headline.

use std::time::Duration;

use glam::Vec3;
use obsidian_core::animation::{ease_out_quint, linear};
use obsidian_runtime::{Fired, TaskScope};
use rand::rngs::SmallRng;

use super::{Readout, Screen, ScreenContext, ScreenId, screen_rng};
use crate::config::{LandingConfig, ScreenConfig};
use crate::motion::MotionDriver;
use crate::particles::{Distribution, LineSegment, ParticleField, generate_segments};
use crate::render::PointSurface;
use crate::reveal::{RevealSequencer, RevealStep, RevealTimeline};
use crate::scramble::TextScrambler;
use crate::stage::{Stage, VisualState};

const CLOCK: &str = "clock";
const CLOCK_PERIOD: Duration = Duration::from_secs(1);

fn hero_stage() -> Stage {
    Stage::new()
        .with("clearance-badge", "reveal-up")
        .with("headline", "reveal-up")
        .with("tagline", "reveal-up")
        .with("actions", "reveal-up")
        .with("stats", "reveal-up")
        .with("scanlines", "scanline-overlay")
}

fn hero_timeline() -> RevealTimeline {
    RevealTimeline::new()
        .step(
            RevealStep::rise("reveal-up", 40.0, Duration::from_millis(1200))
                .stagger(Duration::from_millis(200))
                .easing(ease_out_quint),
        )
        .step(
            RevealStep::new(
                "scanline-overlay",
                VisualState::hidden(glam::Vec2::ZERO),
                Duration::from_secs(2),
            )
            .easing(linear),
        )
}

pub struct LandingScreen {
    config: LandingConfig,
    rng: SmallRng,
    nodes: ParticleField,
    stars: ParticleField,
    lines: Vec<LineSegment>,
    motion: MotionDriver,
    stage: Stage,
    reveal: RevealSequencer,
    headline: Vec<TextScrambler>,
    scope: TaskScope,
    clock_label: String,
    elapsed: Duration,
}

impl std::fmt::Debug for LandingScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandingScreen")
            .field("nodes", &self.nodes.len())
            .field("stars", &self.stars.len())
            .field("lines", &self.lines.len())
            .field("rotation", &self.nodes.rotation())
            .field("scope", &self.scope)
            .finish()
    }
}

impl LandingScreen {
    pub fn mount(config: &ScreenConfig, cx: &mut ScreenContext<'_>) -> Self {
        let cfg = config.landing.clone();
        let mut rng = screen_rng(ScreenId::Landing, config);

        let cube = Distribution::Cube {
            side: cfg.cube_side,
        };
        let nodes = ParticleField::generate(cfg.nodes, cube, &mut rng)
            .with_base_rotation(Vec3::new(0.0, 0.0, cfg.group_tilt));
        let stars = ParticleField::generate(
            cfg.stars,
            Distribution::Starfield {
                radius: cfg.star_radius,
                depth: cfg.star_depth,
            },
            &mut rng,
        );
        let lines = generate_segments(cfg.data_lines, cfg.line_spread, &mut rng);

        let motion = MotionDriver::attach(cx.host, cfg.rate);
        let mut stage = hero_stage();
        let reveal = RevealSequencer::start(&hero_timeline(), &mut stage, cx.host);
        let headline = cfg
            .headline
            .iter()
            .map(|word| TextScrambler::start(word, cx.host, &mut rng))
            .collect();

        let mut scope = TaskScope::new("landing");
        scope.insert(CLOCK, cx.host.every(CLOCK_PERIOD));
        let clock_label = cfg.clock.render(cx.clock.now(cx.host.now()));

        Self {
            config: cfg,
            rng,
            nodes,
            stars,
            lines,
            motion,
            stage,
            reveal,
            headline,
            scope,
            clock_label,
            elapsed: Duration::ZERO,
        }
    }

    /// The rotating node cube.
    pub fn nodes(&self) -> &ParticleField {
        &self.nodes
    }

    pub fn stars(&self) -> &ParticleField {
        &self.stars
    }

    pub fn lines(&self) -> &[LineSegment] {
        &self.lines
    }

    pub fn headline(&self) -> Vec<&str> {
        self.headline.iter().map(TextScrambler::text).collect()
    }

    pub fn clock_label(&self) -> &str {
        &self.clock_label
    }

    pub fn reveal(&self) -> &RevealSequencer {
        &self.reveal
    }

    /// Time covered by frames since mount.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Screen for LandingScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Landing
    }

    fn handle(&mut self, fired: &Fired, cx: &mut ScreenContext<'_>) -> Option<ScreenId> {
        if self.motion.handle(fired, &mut self.nodes) {
            self.elapsed += fired.dt;
            return None;
        }
        if self.reveal.handle(fired, &mut self.stage) {
            return None;
        }
        let rng = &mut self.rng;
        if self.headline.iter_mut().any(|s| s.handle(fired, rng)) {
            return None;
        }
        if self.scope.label_of(fired.id) == Some(CLOCK) {
            self.clock_label = self.config.clock.render(cx.clock.now(fired.at));
        }
        None
    }

    fn draw(&self, surface: &mut dyn PointSurface) {
        surface.draw_points(self.stars.points(), self.stars.transform());
        surface.draw_points(self.nodes.points(), self.nodes.transform());
        let t = self.elapsed.as_secs_f32();
        for line in &self.lines {
            let [a, b] = line.endpoints(&self.config.float, t);
            surface.draw_segment(a, b);
        }
    }

    fn readouts(&self) -> Vec<Readout> {
        let mut out: Vec<Readout> = self
            .headline
            .iter()
            .map(|s| Readout::new("headline", s.text()))
            .collect();
        out.push(Readout::new("timestamp", self.clock_label.clone()));
        out
    }

    fn stage(&self) -> &Stage {
        &self.stage
    }

    fn live_tasks(&self) -> usize {
        usize::from(self.motion.is_attached())
            + usize::from(self.reveal.is_running())
            + self.headline.iter().filter(|s| s.task_id().is_some()).count()
            + self.scope.live_count()
    }

    fn unmount(&mut self) {
        self.motion.detach();
        self.reveal.cancel();
        self.headline.iter_mut().for_each(TextScrambler::cancel);
        self.scope.dispose();
        tracing::info!(screen = "landing", "screen unmounted");
    }
}
