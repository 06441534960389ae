#![forbid(unsafe_code)]

//! Routes between screens and feeds them scheduler firings.
//!
//! Exactly one screen is mounted at a time. Navigating unmounts the current
//! screen before the next one is mounted, so a task of the old screen that
//! was already due in the same frame is skipped.

use std::time::Duration;

use obsidian_runtime::{Fired, Host, Scheduler};

use crate::config::ScreenConfig;
use crate::screens::{self, RouteError, Screen, ScreenContext, ScreenId, ScreenInput};
use crate::telemetry::ClockSource;

pub struct Shell {
    config: ScreenConfig,
    clock: Box<dyn ClockSource>,
    current: Option<Box<dyn Screen>>,
    history: Vec<ScreenId>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("current", &self.current_id())
            .field("history", &self.history)
            .finish()
    }
}

impl Shell {
    /// A shell with nothing mounted.
    pub fn new(config: ScreenConfig, clock: impl ClockSource + 'static) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            current: None,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn current(&self) -> Option<&dyn Screen> {
        self.current.as_deref()
    }

    pub fn current_id(&self) -> Option<ScreenId> {
        self.current.as_ref().map(|s| s.id())
    }

    /// Screens mounted so far, oldest first.
    pub fn history(&self) -> &[ScreenId] {
        &self.history
    }

    /// Unmount whatever is showing and mount `id`.
    pub fn navigate(&mut self, id: ScreenId, host: &mut dyn Host) {
        if let Some(from) = self.current_id() {
            tracing::info!(from = from.path(), to = id.path(), "navigating");
        }
        self.unmount();
        let mut cx = ScreenContext {
            host,
            clock: self.clock.as_ref(),
        };
        self.current = Some(screens::mount(id, &self.config, &mut cx));
        self.history.push(id);
    }

    /// Navigate by route path.
    pub fn open(&mut self, path: &str, host: &mut dyn Host) -> Result<ScreenId, RouteError> {
        let id = ScreenId::from_path(path)?;
        self.navigate(id, host);
        Ok(id)
    }

    /// Offer `fired` to the mounted screen and follow any navigation request.
    pub fn dispatch(&mut self, fired: &Fired, host: &mut dyn Host) -> Option<ScreenId> {
        let screen = self.current.as_mut()?;
        let mut cx = ScreenContext {
            host: &mut *host,
            clock: self.clock.as_ref(),
        };
        let next = screen.handle(fired, &mut cx)?;
        self.navigate(next, host);
        Some(next)
    }

    /// Forward user input to the mounted screen.
    pub fn input(&mut self, input: ScreenInput, host: &mut dyn Host) -> Option<ScreenId> {
        let screen = self.current.as_mut()?;
        let mut cx = ScreenContext {
            host: &mut *host,
            clock: self.clock.as_ref(),
        };
        let next = screen.input(input, &mut cx)?;
        self.navigate(next, host);
        Some(next)
    }

    /// Advance `scheduler` by one frame and dispatch everything that fired.
    /// Returns the number of records dispatched.
    pub fn frame(&mut self, scheduler: &mut Scheduler, dt: Duration) -> usize {
        let mut dispatched = 0;
        for fired in scheduler.advance(dt) {
            self.dispatch(&fired, scheduler);
            dispatched += 1;
        }
        dispatched
    }

    /// Unmount the current screen, if any.
    pub fn unmount(&mut self) {
        if let Some(mut screen) = self.current.take() {
            screen.unmount();
        }
    }
}
