#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure session system that drives run-mode transitions around the engine.
//!
//! Hosts translate raw input into [`SessionInput`] values and report the
//! elapsed host time between calls. The system answers with
//! [`SessionRequest`] values: run-mode commands for the engine, or a request
//! to discard the finished engine and build a fresh one.

use std::time::Duration;

use gridsnake_core::{Command, Event, RunMode};

const DEFAULT_RESUME_DELAY: Duration = Duration::from_millis(500);

/// Configuration parameters required to construct the session system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    resume_delay: Duration,
}

impl Config {
    /// Creates a new configuration using the provided resume grace period.
    #[must_use]
    pub const fn new(resume_delay: Duration) -> Self {
        Self { resume_delay }
    }

    /// Grace period spent in [`RunMode::Resuming`] before play continues.
    #[must_use]
    pub const fn resume_delay(&self) -> Duration {
        self.resume_delay
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RESUME_DELAY)
    }
}

/// Player intent already decoupled from any input device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionInput {
    /// Begin a session that has not started yet.
    Start,
    /// Pause a running session, or begin resuming a paused one.
    TogglePause,
    /// Replace a finished session with a fresh one.
    Restart,
}

/// Output of the session system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionRequest {
    /// Command to apply to the current engine.
    Engine(Command),
    /// Discard the current engine and construct a new one.
    Restart,
}

/// Pure system that owns every run-mode edge except the engine's own
/// `Started -> Over` transition.
#[derive(Debug)]
pub struct Session {
    resume_delay: Duration,
    resume_elapsed: Duration,
}

impl Session {
    /// Creates a new session system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            resume_delay: config.resume_delay,
            resume_elapsed: Duration::ZERO,
        }
    }

    /// Consumes engine events, player inputs and elapsed time to emit requests.
    ///
    /// `mode` is the engine's run mode as observed before this call.
    pub fn handle(
        &mut self,
        events: &[Event],
        inputs: &[SessionInput],
        mode: RunMode,
        elapsed: Duration,
        out: &mut Vec<SessionRequest>,
    ) {
        let mut mode = mode;
        for event in events {
            match event {
                Event::RunModeChanged { mode: changed } => mode = *changed,
                Event::GameOver { .. } => mode = RunMode::Over,
                _ => {}
            }
        }
        if mode == RunMode::Over {
            self.resume_elapsed = Duration::ZERO;
        }
        let was_resuming = mode == RunMode::Resuming;

        for input in inputs {
            let Some(next) = self.transition(mode, *input, out) else {
                continue;
            };
            mode = next;
        }

        // Time only counts once the host has observed the resuming mode.
        if was_resuming && mode == RunMode::Resuming {
            self.advance_resume(elapsed, out);
        }
    }

    fn transition(
        &mut self,
        mode: RunMode,
        input: SessionInput,
        out: &mut Vec<SessionRequest>,
    ) -> Option<RunMode> {
        let next = match (mode, input) {
            (RunMode::NotStarted, SessionInput::Start) => RunMode::Started,
            (RunMode::Started, SessionInput::TogglePause) => RunMode::Paused,
            (RunMode::Paused, SessionInput::TogglePause) => {
                self.resume_elapsed = Duration::ZERO;
                RunMode::Resuming
            }
            (RunMode::Over, SessionInput::Restart) => {
                out.push(SessionRequest::Restart);
                return Some(RunMode::NotStarted);
            }
            _ => return None,
        };
        out.push(SessionRequest::Engine(Command::SetRunMode { mode: next }));
        Some(next)
    }

    fn advance_resume(&mut self, elapsed: Duration, out: &mut Vec<SessionRequest>) {
        self.resume_elapsed = self.resume_elapsed.saturating_add(elapsed);
        if self.resume_elapsed >= self.resume_delay {
            self.resume_elapsed = Duration::ZERO;
            out.push(SessionRequest::Engine(Command::SetRunMode {
                mode: RunMode::Started,
            }));
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
