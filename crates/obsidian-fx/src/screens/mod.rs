#![forbid(unsafe_code)]

//! The three routed screens and the contract the shell drives them through.
//!
//! A screen is mounted by constructing it: fields are generated, effects
//! register their tasks, and screen-level timers go into the screen's
//! [`TaskScope`](obsidian_runtime::TaskScope). Every [`Fired`] record is
//! offered to the mounted screen through [`Screen::handle`]. [`Screen::unmount`]
//! revokes everything in one call, and dropping a screen does the same.

pub mod access;
pub mod dashboard;
pub mod landing;

use std::fmt;
use std::str::FromStr;

use obsidian_runtime::{Fired, Host};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::ScreenConfig;
use crate::render::PointSurface;
use crate::stage::Stage;
use crate::telemetry::ClockSource;

pub use access::{AccessScreen, AuthField, AuthPhase, SubmitOutcome};
pub use dashboard::DashboardScreen;
pub use landing::LandingScreen;

/// Identifies a routed screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Landing,
    Access,
    Dashboard,
}

impl ScreenId {
    /// All screens in navigation order.
    pub const ALL: [ScreenId; 3] = [Self::Landing, Self::Access, Self::Dashboard];

    /// Canonical route path.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Access => "/access",
            Self::Dashboard => "/dashboard",
        }
    }

    /// Short name used on the command line and in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Access => "access",
            Self::Dashboard => "dashboard",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Landing => "Obsidian Syndicate",
            Self::Access => "Secure Access",
            Self::Dashboard => "Command Center",
        }
    }

    /// Resolve a route path. `/acces` is accepted for old links.
    pub fn from_path(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Ok(Self::Landing),
            "/access" | "/acces" => Ok(Self::Access),
            "/dashboard" => Ok(Self::Dashboard),
            _ => Err(RouteError::UnknownPath(path.to_string())),
        }
    }

    /// Per-screen salt mixed into a fixed seed so screens draw different
    /// sequences from the same configuration.
    const fn salt(self) -> u64 {
        match self {
            Self::Landing => 0x6c61_6e64,
            Self::Access => 0x6163_6373,
            Self::Dashboard => 0x6461_7368,
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScreenId {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landing" | "home" => Ok(Self::Landing),
            "access" | "login" => Ok(Self::Access),
            "dashboard" => Ok(Self::Dashboard),
            _ => Err(RouteError::UnknownScreen(s.to_string())),
        }
    }
}

/// A route or screen name that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    UnknownPath(String),
    UnknownScreen(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPath(p) => write!(f, "no screen is routed at {p:?}"),
            Self::UnknownScreen(s) => {
                write!(f, "unknown screen {s:?} (expected landing, access or dashboard)")
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// What a screen may use while mounting and handling tasks.
pub struct ScreenContext<'a> {
    pub host: &'a mut dyn Host,
    pub clock: &'a dyn ClockSource,
}

/// User input the shell forwards to the mounted screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenInput {
    /// Replace the contents of a form field.
    Field(AuthField, String),
    /// Show or hide the access key.
    ToggleKeyVisibility,
    /// Submit the form.
    Submit,
}

/// One labelled text readout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readout {
    pub label: &'static str,
    pub value: String,
}

impl Readout {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// A mounted screen.
pub trait Screen {
    fn id(&self) -> ScreenId;

    /// React to a fired task. Returns a navigation request, if any.
    fn handle(&mut self, fired: &Fired, cx: &mut ScreenContext<'_>) -> Option<ScreenId>;

    /// React to user input. Screens without a form ignore it.
    fn input(&mut self, _input: ScreenInput, _cx: &mut ScreenContext<'_>) -> Option<ScreenId> {
        None
    }

    /// Draw the 3D decorations.
    fn draw(&self, surface: &mut dyn PointSurface);

    /// Text readouts in display order.
    fn readouts(&self) -> Vec<Readout>;

    /// Elements animated by the entrance reveal.
    fn stage(&self) -> &Stage;

    /// Tasks this screen still holds.
    fn live_tasks(&self) -> usize;

    /// Revoke every task. Idempotent.
    fn unmount(&mut self);
}

/// Random source for a screen: seeded when the config fixes a seed.
pub(crate) fn screen_rng(id: ScreenId, config: &ScreenConfig) -> SmallRng {
    match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed ^ id.salt()),
        None => SmallRng::from_entropy(),
    }
}

/// Mount the screen `id`.
pub fn mount(id: ScreenId, config: &ScreenConfig, cx: &mut ScreenContext<'_>) -> Box<dyn Screen> {
    tracing::info!(screen = id.name(), "mounting screen");
    match id {
        ScreenId::Landing => Box::new(LandingScreen::mount(config, cx)),
        ScreenId::Access => Box::new(AccessScreen::mount(config, cx)),
        ScreenId::Dashboard => Box::new(DashboardScreen::mount(config, cx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve() {
        assert_eq!(ScreenId::from_path("/"), Ok(ScreenId::Landing));
        assert_eq!(ScreenId::from_path(""), Ok(ScreenId::Landing));
        assert_eq!(ScreenId::from_path("/access"), Ok(ScreenId::Access));
        assert_eq!(ScreenId::from_path("/acces"), Ok(ScreenId::Access));
        assert_eq!(ScreenId::from_path("/dashboard/"), Ok(ScreenId::Dashboard));
        assert_eq!(
            ScreenId::from_path("/vault"),
            Err(RouteError::UnknownPath("/vault".into()))
        );
    }

    #[test]
    fn canonical_paths_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_path(id.path()), Ok(id));
            assert_eq!(id.name().parse::<ScreenId>(), Ok(id));
        }
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!("Dashboard".parse::<ScreenId>(), Ok(ScreenId::Dashboard));
        assert!("nope".parse::<ScreenId>().is_err());
    }

    #[test]
    fn seeded_rngs_differ_per_screen() {
        use rand::Rng;
        let cfg = ScreenConfig::default().with_seed(1);
        let a: u64 = screen_rng(ScreenId::Landing, &cfg).gen_range(0..u64::MAX);
        let b: u64 = screen_rng(ScreenId::Dashboard, &cfg).gen_range(0..u64::MAX);
        let a2: u64 = screen_rng(ScreenId::Landing, &cfg).gen_range(0..u64::MAX);
        assert_ne!(a, b);
        assert_eq!(a, a2);
    }
}
