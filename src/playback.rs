//! Playback cursor for scrubbing and animating a trace.
//!
//! The cursor is fractional so that time-based advancement accumulates
//! smoothly; renderers read the whole-command count via
//! [`PlaybackController::executed_count`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SPEED: f64 = 360.0;
pub const MIN_SPEED: f64 = 10.0;
pub const MAX_SPEED: f64 = 4000.0;
/// Shortest tick credited by [`PlaybackController::advance`], in seconds.
pub const MIN_TICK_SECS: f64 = 1.0 / 240.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// The whole trace is shown.
    #[default]
    Static,
    /// Only the commands up to the cursor are shown.
    Step,
}

/// Read-only view handed to renderers and GUIs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub mode: PlaybackMode,
    pub playing: bool,
    pub step_index: f64,
    pub total_steps: usize,
    /// Symbols per second.
    pub speed: f64,
}

#[derive(Clone, Debug)]
pub struct PlaybackController {
    mode: PlaybackMode,
    playing: bool,
    step_index: f64,
    speed: f64,
    total_steps: usize,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            mode: PlaybackMode::Static,
            playing: false,
            step_index: 0.0,
            speed: DEFAULT_SPEED,
            total_steps: 0,
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            mode: self.mode,
            playing: self.playing,
            step_index: self.step_index,
            total_steps: self.total_steps,
            speed: self.speed,
        }
    }

    fn clamp_index(&self, value: f64) -> f64 {
        if self.total_steps == 0 || value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, self.total_steps as f64)
    }

    /// Rebinds the cursor to a freshly built trace of `total_steps` commands.
    ///
    /// Step mode restarts at the beginning, static mode shows everything.
    pub fn reset_for(&mut self, total_steps: usize) {
        self.total_steps = total_steps;
        self.playing = false;
        self.step_index = match self.mode {
            PlaybackMode::Step => 0.0,
            PlaybackMode::Static => total_steps as f64,
        };
    }

    /// Switches mode. Re-selecting the current mode is a no-op unless `reset`.
    pub fn set_mode(&mut self, mode: PlaybackMode, reset: bool) {
        if mode == self.mode && !reset {
            return;
        }
        tracing::trace!(?mode, reset, "playback mode change");
        self.mode = mode;
        self.playing = false;
        match mode {
            PlaybackMode::Step => {
                if reset || self.step_index >= self.total_steps as f64 {
                    self.step_index = 0.0;
                }
            }
            PlaybackMode::Static => self.step_index = self.total_steps as f64,
        }
    }

    pub fn toggle_step_mode(&mut self) {
        match self.mode {
            PlaybackMode::Step => self.set_mode(PlaybackMode::Static, true),
            PlaybackMode::Static => self.set_mode(PlaybackMode::Step, true),
        }
    }

    /// Moves the cursor by `delta` commands, pausing and entering step mode.
    pub fn step(&mut self, delta: i64) {
        if self.total_steps == 0 {
            return;
        }
        if self.mode != PlaybackMode::Step {
            self.set_mode(PlaybackMode::Step, false);
        }
        self.pause();
        self.step_index = self.clamp_index(self.step_index + delta as f64);
    }

    /// Rewinds to the first command in step mode.
    pub fn reset_step(&mut self) {
        if self.total_steps == 0 {
            return;
        }
        if self.mode != PlaybackMode::Step {
            self.set_mode(PlaybackMode::Step, true);
            return;
        }
        self.pause();
        self.step_index = 0.0;
    }

    /// Sets symbols per second, clamped to `[MIN_SPEED, MAX_SPEED]`. Non-finite input is ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() {
            self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        }
    }

    pub fn start(&mut self, restart: bool) {
        if self.total_steps == 0 {
            return;
        }
        if self.mode != PlaybackMode::Step {
            self.set_mode(PlaybackMode::Step, true);
        }
        if restart {
            self.step_index = 0.0;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.mode != PlaybackMode::Step {
            self.start(true);
        } else if self.playing {
            self.pause();
        } else {
            self.start(false);
        }
    }

    /// Advances a playing cursor by `speed × elapsed`, crediting at least
    /// [`MIN_TICK_SECS`]. Pauses on reaching the end.
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }
        if self.total_steps == 0 {
            self.step_index = 0.0;
            self.pause();
            return;
        }

        let increment = self.speed * elapsed.as_secs_f64().max(MIN_TICK_SECS);
        self.step_index = self.clamp_index(self.step_index + increment);
        if self.step_index >= self.total_steps as f64 {
            self.step_index = self.total_steps as f64;
            self.pause();
        }
    }

    /// Number of commands a renderer should execute.
    pub fn executed_count(&self) -> usize {
        match self.mode {
            PlaybackMode::Step => self.clamp_index(self.step_index).floor() as usize,
            PlaybackMode::Static => self.total_steps,
        }
    }

    /// Index of the command to highlight, only in step mode.
    pub fn highlight_index(&self) -> Option<usize> {
        let executed = self.executed_count();
        (self.mode == PlaybackMode::Step && executed > 0 && self.total_steps > 0)
            .then(|| (executed - 1).min(self.total_steps - 1))
    }
}
