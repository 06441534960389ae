#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parsed by hand. Every option can also come from an `OBSIDIAN_DEMO_*`
//! environment variable; explicit flags win.

use std::fmt;
use std::path::PathBuf;

use obsidian_fx::ScreenId;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
Obsidian Demo: particle fields, reveals and scrambled text on a simulated clock

USAGE:
    obsidian-demo [OPTIONS]

OPTIONS:
    --screen=NAME        Screen to mount: landing (default), access, dashboard,
                         or a route path such as /access
    --frames=N           Frames to run before printing (default: 180)
    --fps=N              Simulated frame rate (default: 60)
    --seed=N             Fix every random draw
    --config=PATH        JSON file overriding screen settings
    --width=N            Output width in columns (default: 72)
    --height=N           Output height in rows (default: 24)
    --realtime           Sleep between frames and redraw each one
    --auto-login         On the access screen, fill in and submit the form
    --help, -h           Show this help message
    --version, -V        Show version

SCREENS:
    landing      /            Node cube, starfield, headline scramble
    access       /access      Fake authentication with scan line and packets
    dashboard    /dashboard   Network globe, cards, ping and clock

ENVIRONMENT VARIABLES:
    OBSIDIAN_DEMO_SCREEN      Override --screen
    OBSIDIAN_DEMO_FRAMES      Override --frames
    OBSIDIAN_DEMO_FPS         Override --fps
    OBSIDIAN_DEMO_SEED        Override --seed
    OBSIDIAN_DEMO_CONFIG      Override --config
    OBSIDIAN_DEMO_REALTIME    Set to 1 for --realtime
    OBSIDIAN_DEMO_LOG_FORMAT  'text' (default) or 'json'
    RUST_LOG                  Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub screen: ScreenId,
    pub frames: u64,
    pub fps: u32,
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
    pub width: usize,
    pub height: usize,
    pub realtime: bool,
    pub auto_login: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            screen: ScreenId::Landing,
            frames: 180,
            fps: 60,
            seed: None,
            config: None,
            width: 72,
            height: 24,
            realtime: false,
            auto_login: false,
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// A flag or environment value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn parse_screen(flag: &'static str, value: &str) -> Result<ScreenId, CliError> {
    let parsed = if value.starts_with('/') {
        ScreenId::from_path(value)
    } else {
        value.parse()
    };
    parsed.map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

fn parse_num<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

fn parse_positive<T>(flag: &'static str, value: &str) -> Result<T, CliError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let n: T = parse_num(flag, value)?;
    if n <= T::default() {
        return Err(CliError::InvalidValue {
            flag,
            value: value.to_string(),
        });
    }
    Ok(n)
}

fn truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl Opts {
    /// Parse the process arguments and environment.
    pub fn parse() -> Result<Command, CliError> {
        Self::parse_from(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Parse `args` (without the program name), reading environment
    /// overrides through `env`.
    pub fn parse_from<I, S, E>(args: I, env: E) -> Result<Command, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        E: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Environment first; flags below override.
        if let Some(val) = env("OBSIDIAN_DEMO_SCREEN") {
            opts.screen = parse_screen("OBSIDIAN_DEMO_SCREEN", &val)?;
        }
        if let Some(val) = env("OBSIDIAN_DEMO_FRAMES") {
            opts.frames = parse_num("OBSIDIAN_DEMO_FRAMES", &val)?;
        }
        if let Some(val) = env("OBSIDIAN_DEMO_FPS") {
            opts.fps = parse_positive("OBSIDIAN_DEMO_FPS", &val)?;
        }
        if let Some(val) = env("OBSIDIAN_DEMO_SEED") {
            opts.seed = Some(parse_num("OBSIDIAN_DEMO_SEED", &val)?);
        }
        if let Some(val) = env("OBSIDIAN_DEMO_CONFIG") {
            opts.config = Some(PathBuf::from(val));
        }
        if let Some(val) = env("OBSIDIAN_DEMO_REALTIME") {
            opts.realtime = truthy(&val);
        }

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--realtime" => opts.realtime = true,
                "--auto-login" => opts.auto_login = true,
                other => {
                    if let Some(val) = other.strip_prefix("--screen=") {
                        opts.screen = parse_screen("--screen", val)?;
                    } else if let Some(val) = other.strip_prefix("--frames=") {
                        opts.frames = parse_num("--frames", val)?;
                    } else if let Some(val) = other.strip_prefix("--fps=") {
                        opts.fps = parse_positive("--fps", val)?;
                    } else if let Some(val) = other.strip_prefix("--seed=") {
                        opts.seed = Some(parse_num("--seed", val)?);
                    } else if let Some(val) = other.strip_prefix("--config=") {
                        opts.config = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--width=") {
                        opts.width = parse_positive("--width", val)?;
                    } else if let Some(val) = other.strip_prefix("--height=") {
                        opts.height = parse_positive("--height", val)?;
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }
}
