#![forbid(unsafe_code)]

//! Visual effects and screens for the Obsidian demo.
//!
//! Effects are plain structs that register tasks on an
//! [`obsidian_runtime::Host`] and keep the returned guards. Whoever drives
//! the scheduler hands each fired record to the owning screen, and the
//! screen offers it to its effects in turn.
//!
//! # Modules
//!
//! - [`particles`]: point clouds and floating line segments
//! - [`motion`]: per-frame rotation of a field
//! - [`stage`] and [`reveal`]: staggered entrance animations
//! - [`scramble`]: random-to-resolved text
//! - [`decor`]: scan line and data packets
//! - [`telemetry`]: fake ping, clock labels, session ids
//! - [`render`]: point drawing and the ASCII surface
//! - [`screens`] and [`shell`]: routing and lifecycle

pub mod config;
pub mod decor;
pub mod motion;
pub mod particles;
pub mod render;
pub mod reveal;
pub mod scramble;
pub mod screens;
pub mod shell;
pub mod stage;
pub mod telemetry;

pub use config::{ConfigError, ScreenConfig};
pub use motion::{AngularRate, MotionDriver};
pub use particles::{Distribution, ParticleField, Rotation};
pub use render::{AsciiSurface, PointSurface};
pub use reveal::{RevealSequencer, RevealStep, RevealTimeline};
pub use scramble::{TextScrambler, scramble_frames};
pub use screens::{RouteError, Screen, ScreenId, ScreenInput};
pub use shell::Shell;
pub use stage::{Stage, VisualState};
