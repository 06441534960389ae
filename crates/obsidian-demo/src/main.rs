#![forbid(unsafe_code)]

//! Obsidian demo binary.
//!
//! Mounts one screen on the scheduler, runs it for a number of frames and
//! prints the projected particles with the screen's readouts.

mod cli;
mod logging;

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use obsidian_fx::render::{AsciiSurface, PointSurface};
use obsidian_fx::screens::{AuthField, ScreenId, ScreenInput};
use obsidian_fx::telemetry::{SimulatedClock, SystemClock};
use obsidian_fx::{ConfigError, ScreenConfig, Shell};
use obsidian_runtime::Scheduler;

use cli::{Command, Opts};

#[derive(Debug)]
enum DemoError {
    Config(ConfigError),
    Io(io::Error),
}

impl From<ConfigError> for DemoError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<io::Error> for DemoError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl std::fmt::Display for DemoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "output error: {err}"),
        }
    }
}

impl std::error::Error for DemoError {}

fn main() {
    let opts = match Opts::parse() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            println!("{}", cli::HELP_TEXT);
            return;
        }
        Ok(Command::Version) => {
            println!("obsidian-demo {}", cli::VERSION);
            return;
        }
        Err(err) => {
            eprintln!("{err}");
            eprintln!("Run with --help for usage information.");
            process::exit(2);
        }
    };

    logging::init(logging::LogFormat::from_env());

    if let Err(err) = run(&opts) {
        tracing::error!(error = %err, "demo failed");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn load_config(opts: &Opts) -> Result<ScreenConfig, ConfigError> {
    let mut config = match &opts.config {
        Some(path) => ScreenConfig::load(path)?,
        None => ScreenConfig::default(),
    };
    if let Some(seed) = opts.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

fn run(opts: &Opts) -> Result<(), DemoError> {
    let config = load_config(opts)?;
    let mut shell = if opts.realtime {
        Shell::new(config, SystemClock)
    } else {
        Shell::new(config, SimulatedClock::starting_at(chrono::Utc::now()))
    };
    let mut scheduler = Scheduler::new();
    shell.navigate(opts.screen, &mut scheduler);

    if opts.auto_login && opts.screen == ScreenId::Access {
        shell.input(ScreenInput::Field(AuthField::Id, "operator".into()), &mut scheduler);
        shell.input(ScreenInput::Field(AuthField::Key, "obsidian".into()), &mut scheduler);
        shell.input(ScreenInput::Submit, &mut scheduler);
    }

    let dt = Duration::from_secs(1) / opts.fps.max(1);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for frame in 1..=opts.frames {
        shell.frame(&mut scheduler, dt);
        if opts.realtime {
            // Cursor home, clear screen.
            write!(out, "\x1b[H\x1b[2J")?;
            draw(&mut out, &shell, opts, frame)?;
            out.flush()?;
            std::thread::sleep(dt);
        }
    }
    if !opts.realtime {
        draw(&mut out, &shell, opts, opts.frames)?;
    }

    tracing::info!(
        frames = opts.frames,
        elapsed_ms = scheduler.now().as_millis() as u64,
        screens = shell.history().len(),
        "run finished"
    );
    shell.unmount();
    tracing::debug!(live_tasks = scheduler.live_tasks(), "shell unmounted");
    Ok(())
}

fn draw(out: &mut impl Write, shell: &Shell, opts: &Opts, frame: u64) -> io::Result<()> {
    let Some(screen) = shell.current() else {
        return Ok(());
    };
    let id = screen.id();
    let mut surface = AsciiSurface::new(opts.width, opts.height);
    screen.draw(&mut surface as &mut dyn PointSurface);

    writeln!(out, "{} [{}] frame {frame}", id.title(), id.path())?;
    writeln!(out, "+{}+", "-".repeat(surface.width()))?;
    for line in surface.lines() {
        writeln!(out, "|{line}|")?;
    }
    writeln!(out, "+{}+", "-".repeat(surface.width()))?;
    for readout in screen.readouts() {
        writeln!(out, "{:>10}: {}", readout.label, readout.value)?;
    }
    Ok(())
}
