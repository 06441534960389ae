#![forbid(unsafe_code)]

//! Tunables for the three screens.
//!
//! Every field has a default matching the stock pages, and every section
//! is `#[serde(default)]`, so an override file only needs the keys it
//! changes:
//!
//! ```json
//! { "seed": 7, "landing": { "nodes": 500 } }
//! ```

use std::f32::consts::FRAC_PI_4;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::motion::AngularRate;
use crate::particles::FloatParams;
use crate::telemetry::{ClockFormat, LatencyWalk};

/// Landing screen: node cube, starfield, data lines and headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    pub nodes: usize,
    pub cube_side: f32,
    pub stars: usize,
    pub star_radius: f32,
    pub star_depth: f32,
    pub data_lines: usize,
    pub line_spread: f32,
    pub rate: AngularRate,
    /// Fixed Z tilt of the node group, radians.
    pub group_tilt: f32,
    pub float: FloatParams,
    pub headline: Vec<String>,
    pub clock: ClockFormat,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            nodes: 3000,
            cube_side: 15.0,
            stars: 5000,
            star_radius: 100.0,
            star_depth: 50.0,
            data_lines: 40,
            line_spread: 20.0,
            rate: AngularRate::Second {
                x: 1.0 / 15.0,
                y: 1.0 / 20.0,
            },
            group_tilt: FRAC_PI_4,
            float: FloatParams::default(),
            headline: vec!["OBSIDIAN".into(), "SYNDICATE".into()],
            clock: ClockFormat::Iso8601,
        }
    }
}

/// Access screen: packet stream and the fake authentication delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub packets: usize,
    pub auth_delay_ms: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            packets: 20,
            auth_delay_ms: 2400,
        }
    }
}

impl AccessConfig {
    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth_delay_ms)
    }
}

/// Dashboard: globe and telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub globe_points: usize,
    pub globe_radius: f32,
    pub rate: AngularRate,
    pub latency: LatencyWalk,
    pub clock: ClockFormat,
    pub telemetry_interval_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            globe_points: 1500,
            globe_radius: 2.5,
            rate: AngularRate::Frame { x: 0.001, y: 0.002 },
            latency: LatencyWalk::default(),
            clock: ClockFormat::TimeOfDay,
            telemetry_interval_ms: 1000,
        }
    }
}

impl DashboardConfig {
    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }
}

/// All screen tunables plus the random seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Fixed seed for every random draw; entropy when absent.
    pub seed: Option<u64>,
    pub landing: LandingConfig,
    pub access: AccessConfig,
    pub dashboard: DashboardConfig,
}

impl ScreenConfig {
    /// Parse a JSON override document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot drive the screens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dashboard.latency.is_finite() {
            return Err(ConfigError::Invalid("dashboard.latency must be finite"));
        }
        Ok(())
    }

    /// Read and parse a JSON override file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "screen config loaded");
        Ok(config)
    }

    /// Builder: fix the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Failure to obtain a [`ScreenConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(err) => write!(f, "invalid screen config: {err}"),
            Self::Invalid(reason) => write!(f, "invalid screen config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}
