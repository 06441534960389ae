#![forbid(unsafe_code)]

//! Access screen: a fake authentication form with decorative chrome.
//!
//! Submitting a filled-in form always succeeds: after the configured delay
//! the screen asks the shell to navigate to the dashboard. Nothing is
//! checked and nothing is sent anywhere.

use std::time::Duration;

use obsidian_core::animation::{ease_out, ease_out_quint};
use obsidian_runtime::{Fired, TaskScope};
use rand::rngs::SmallRng;

use super::{Readout, Screen, ScreenContext, ScreenId, ScreenInput, screen_rng};
use crate::config::{AccessConfig, ScreenConfig};
use crate::decor::{DataStream, ScanLine};
use crate::render::PointSurface;
use crate::reveal::{RevealSequencer, RevealStep, RevealTimeline};
use crate::stage::Stage;
use crate::telemetry::session_id;

const REDIRECT: &str = "redirect";

static BOOT_LOG: [&str; 7] = [
    "[ 0.000000 ] Booting authentication kernel v4.2.0-syndicate...",
    "[ 0.041283 ] Initializing encrypted sandbox environment...",
    "[ 0.124551 ] Handshaking with obsidian-mesh-node-alpha...",
    "[ 0.182239 ] Loading RSA-4096 / AES-GCM-256 modules...",
    "[ 0.291002 ] Connection established via Secure Tunnel [402.112.5.1]",
    "[ 0.355112 ] Ready for user input. Awaiting ID_TOKEN.",
    "_",
];

fn access_stage() -> Stage {
    let mut stage = Stage::new().with("auth-card", "auth-card");
    for i in 0..BOOT_LOG.len() {
        stage.push(format!("boot-{i}"), "terminal-line");
    }
    stage
}

fn access_timeline() -> RevealTimeline {
    RevealTimeline::new()
        .step(
            RevealStep::rise("auth-card", 20.0, Duration::from_secs(1))
                .stagger(Duration::from_millis(200))
                .easing(ease_out_quint),
        )
        .step(
            RevealStep::slide("terminal-line", -10.0, Duration::from_millis(500))
                .stagger(Duration::from_millis(50))
                .delay(Duration::from_millis(500))
                .easing(ease_out),
        )
}

/// Form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    /// Operator identifier.
    Id,
    /// Access key.
    Key,
    /// Optional recovery seed.
    Seed,
}

/// Where the fake authentication stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Idle,
    /// Waiting out the delay that started at `since`.
    Authenticating { since: Duration },
    /// Redirect requested.
    Granted,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started,
    /// Id or key is empty.
    Incomplete,
    /// A submission is already in flight or done.
    Ignored,
}

#[derive(Debug, Default, Clone)]
struct AuthForm {
    id: String,
    key: String,
    seed: String,
    show_key: bool,
}

pub struct AccessScreen {
    config: AccessConfig,
    stage: Stage,
    reveal: RevealSequencer,
    scan: ScanLine,
    stream: DataStream,
    form: AuthForm,
    phase: AuthPhase,
    session: String,
    scope: TaskScope,
}

impl std::fmt::Debug for AccessScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessScreen")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("scope", &self.scope)
            .finish()
    }
}

impl AccessScreen {
    pub fn mount(config: &ScreenConfig, cx: &mut ScreenContext<'_>) -> Self {
        let mut rng: SmallRng = screen_rng(ScreenId::Access, config);
        let mut stage = access_stage();
        let reveal = RevealSequencer::start(&access_timeline(), &mut stage, cx.host);
        let scan = ScanLine::start(cx.host);
        let stream = DataStream::start(config.access.packets, cx.host, &mut rng);
        let session = session_id(&mut rng);
        Self {
            config: config.access.clone(),
            stage,
            reveal,
            scan,
            stream,
            form: AuthForm::default(),
            phase: AuthPhase::Idle,
            session,
            scope: TaskScope::new("access"),
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn session_id(&self) -> &str {
        &self.session
    }

    pub fn scan_line(&self) -> &ScanLine {
        &self.scan
    }

    pub fn data_stream(&self) -> &DataStream {
        &self.stream
    }

    pub fn boot_log(&self) -> &'static [&'static str] {
        &BOOT_LOG
    }

    pub fn set_field(&mut self, field: AuthField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AuthField::Id => self.form.id = value,
            AuthField::Key => self.form.key = value,
            AuthField::Seed => self.form.seed = value,
        }
    }

    pub fn toggle_key_visibility(&mut self) -> bool {
        self.form.show_key = !self.form.show_key;
        self.form.show_key
    }

    /// Key as displayed: bullets unless visibility is toggled on.
    pub fn displayed_key(&self) -> String {
        if self.form.show_key {
            self.form.key.clone()
        } else {
            "\u{2022}".repeat(self.form.key.chars().count())
        }
    }

    /// Start the fake authentication.
    pub fn submit(&mut self, cx: &mut ScreenContext<'_>) -> SubmitOutcome {
        if self.phase != AuthPhase::Idle {
            return SubmitOutcome::Ignored;
        }
        if self.form.id.trim().is_empty() || self.form.key.is_empty() {
            return SubmitOutcome::Incomplete;
        }
        let since = cx.host.now();
        self.scope.insert(REDIRECT, cx.host.after(self.config.auth_delay()));
        self.phase = AuthPhase::Authenticating { since };
        tracing::info!(operator = %self.form.id, "authentication started");
        SubmitOutcome::Started
    }
}

impl Screen for AccessScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Access
    }

    fn handle(&mut self, fired: &Fired, _cx: &mut ScreenContext<'_>) -> Option<ScreenId> {
        if self.scan.handle(fired) || self.stream.handle(fired) {
            return None;
        }
        if self.reveal.handle(fired, &mut self.stage) {
            return None;
        }
        if self.scope.label_of(fired.id) == Some(REDIRECT) {
            self.scope.prune();
            self.phase = AuthPhase::Granted;
            tracing::info!(to = ScreenId::Dashboard.path(), "access granted, redirecting");
            return Some(ScreenId::Dashboard);
        }
        None
    }

    fn input(&mut self, input: ScreenInput, cx: &mut ScreenContext<'_>) -> Option<ScreenId> {
        match input {
            ScreenInput::Field(field, value) => self.set_field(field, value),
            ScreenInput::ToggleKeyVisibility => {
                self.toggle_key_visibility();
            }
            ScreenInput::Submit => {
                self.submit(cx);
            }
        }
        None
    }

    fn draw(&self, surface: &mut dyn PointSurface) {
        // Packets fall through a flat plane behind the card.
        let plane: Vec<glam::Vec3> = self
            .stream
            .packets()
            .iter()
            .filter(|p| p.is_falling())
            .map(|p| glam::Vec3::new(p.left / 100.0 * 8.0 - 4.0, 3.0 - 6.0 * p.progress(), -2.0))
            .collect();
        surface.draw_points(&plane, glam::Mat4::IDENTITY);
        let y = 1.5 - self.scan.offset() / crate::decor::SCAN_TRAVEL * 3.0;
        surface.draw_segment(glam::Vec3::new(-1.5, y, 0.0), glam::Vec3::new(1.5, y, 0.0));
    }

    fn readouts(&self) -> Vec<Readout> {
        let status = match self.phase {
            AuthPhase::Idle => "AWAITING CREDENTIALS",
            AuthPhase::Authenticating { .. } => "AUTHENTICATING...",
            AuthPhase::Granted => "ACCESS GRANTED",
        };
        vec![
            Readout::new("status", status),
            Readout::new("operator", self.form.id.clone()),
            Readout::new("key", self.displayed_key()),
            Readout::new("session", format!("SESSION ID: {}", self.session)),
            Readout::new("scanner", format!("{:.0}", self.scan.offset())),
        ]
    }

    fn stage(&self) -> &Stage {
        &self.stage
    }

    fn live_tasks(&self) -> usize {
        usize::from(self.reveal.is_running())
            + usize::from(self.scan.task_id().is_some())
            + usize::from(self.stream.task_id().is_some())
            + self.scope.live_count()
    }

    fn unmount(&mut self) {
        self.reveal.cancel();
        self.scan.stop();
        self.stream.stop();
        self.scope.dispose();
        tracing::info!(screen = "access", "screen unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::SimulatedClock;
    use obsidian_runtime::Scheduler;

    fn mounted(host: &mut Scheduler) -> AccessScreen {
        let clock = SimulatedClock::from_unix(0);
        let mut cx = ScreenContext { host, clock: &clock };
        AccessScreen::mount(&ScreenConfig::default().with_seed(5), &mut cx)
    }

    #[test]
    fn mount_registers_decorations() {
        let mut host = Scheduler::new();
        let screen = mounted(&mut host);
        assert_eq!(screen.data_stream().packets().len(), 20);
        assert_eq!(screen.stage().select("terminal-line").len(), 7);
        // reveal, scan line, data stream
        assert_eq!(screen.live_tasks(), 3);
        assert_eq!(screen.phase(), AuthPhase::Idle);
        assert!(!screen.session_id().is_empty());
    }

    #[test]
    fn incomplete_form_is_rejected() {
        let mut host = Scheduler::new();
        let mut screen = mounted(&mut host);
        let clock = SimulatedClock::from_unix(0);
        let mut cx = ScreenContext { host: &mut host, clock: &clock };
        assert_eq!(screen.submit(&mut cx), SubmitOutcome::Incomplete);
        screen.set_field(AuthField::Id, "ghost");
        assert_eq!(screen.submit(&mut cx), SubmitOutcome::Incomplete);
        screen.set_field(AuthField::Key, "hunter2");
        assert_eq!(screen.submit(&mut cx), SubmitOutcome::Started);
        assert_eq!(screen.submit(&mut cx), SubmitOutcome::Ignored);
    }

    #[test]
    fn key_is_masked_until_toggled() {
        let mut host = Scheduler::new();
        let mut screen = mounted(&mut host);
        screen.set_field(AuthField::Key, "abc");
        assert_eq!(screen.displayed_key(), "\u{2022}\u{2022}\u{2022}");
        assert!(screen.toggle_key_visibility());
        assert_eq!(screen.displayed_key(), "abc");
    }
}
