//! Headless simulation loop driven by a simulated clock.

use std::fmt;

use anyhow::{Context, Result};
use gridsnake_core::{CollisionCause, Command, Event, RunMode};
use gridsnake_system_autopilot::Autopilot;
use gridsnake_system_session::{
    Config as SessionConfig, Session, SessionInput, SessionRequest,
};
use gridsnake_world::{self as world, query, Engine};
use tracing::{debug, info};

use crate::config::SimulationConfig;

/// Reason a round stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RoundEnd {
    Collision(CollisionCause),
    BoardFilled,
    TickBudget,
}

impl fmt::Display for RoundEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collision(CollisionCause::Boundary) => f.write_str("hit the boundary"),
            Self::Collision(CollisionCause::SelfCollision) => f.write_str("hit its own body"),
            Self::BoardFilled => f.write_str("filled the board"),
            Self::TickBudget => f.write_str("ran out of ticks"),
        }
    }
}

/// Final figures for one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RoundSummary {
    pub(crate) round: u32,
    pub(crate) score: u32,
    pub(crate) ticks: u64,
    pub(crate) length: usize,
    pub(crate) end: RoundEnd,
}

impl RoundSummary {
    fn capture(round: u32, engine: &Engine, end: RoundEnd) -> Self {
        Self {
            round,
            score: engine.score(),
            ticks: engine.tick_index(),
            length: engine.body().len(),
            end,
        }
    }
}

/// Runs rounds until one ends without a collision or the round count is spent.
pub(crate) fn run(config: &SimulationConfig) -> Result<Vec<RoundSummary>> {
    let mut session = Session::new(SessionConfig::new(config.resume_delay()));
    let mut autopilot = Autopilot::new();
    let mut summaries = Vec::new();

    let mut round = 0;
    let mut engine = build_engine(config, round)?;
    let mut inputs = vec![SessionInput::Start];
    let mut observed = Vec::new();
    let mut events = Vec::new();
    let mut requests = Vec::new();
    let mut commands = Vec::new();
    let mut frames: u64 = 0;

    loop {
        frames += 1;
        events.clear();
        requests.clear();
        session.handle(
            &observed,
            &inputs,
            query::run_mode(&engine),
            config.tick_interval(),
            &mut requests,
        );
        inputs.clear();

        for request in requests.drain(..) {
            match request {
                SessionRequest::Engine(command) => world::apply(&mut engine, command, &mut events),
                SessionRequest::Restart => {
                    round += 1;
                    engine = build_engine(config, round)?;
                    inputs.push(SessionInput::Start);
                    debug!(round, "restarted session");
                }
            }
        }

        commands.clear();
        autopilot.handle(
            &query::snake_snapshot(&engine),
            query::grid_view(&engine),
            &mut commands,
        );
        for command in commands.drain(..) {
            world::apply(&mut engine, command, &mut events);
        }
        world::apply(&mut engine, Command::Tick, &mut events);

        if let Some(end) = round_end(&events, &engine, config.max_ticks) {
            let summary = RoundSummary::capture(round, &engine, end);
            info!(
                round = summary.round,
                score = summary.score,
                ticks = summary.ticks,
                length = summary.length,
                "snake {}",
                summary.end
            );
            summaries.push(summary);

            let restart = matches!(end, RoundEnd::Collision(_)) && round + 1 < config.rounds;
            if !restart {
                break;
            }
            inputs.push(SessionInput::Restart);
        } else if let Some(every) = config.pause_every_ticks {
            schedule_pause(&engine, &events, every, &mut inputs);
        }

        std::mem::swap(&mut observed, &mut events);
    }

    debug!(frames, rounds = summaries.len(), "simulation finished");
    Ok(summaries)
}

fn build_engine(config: &SimulationConfig, round: u32) -> Result<Engine> {
    Engine::from_config(&config.engine_config(round))
        .with_context(|| format!("failed to build a {}x{} engine", config.rows, config.cols))
}

fn round_end(events: &[Event], engine: &Engine, max_ticks: u64) -> Option<RoundEnd> {
    let ended = events.iter().find_map(|event| match event {
        Event::GameOver { cause, .. } => Some(RoundEnd::Collision(*cause)),
        Event::BoardFilled => Some(RoundEnd::BoardFilled),
        _ => None,
    });
    ended.or_else(|| (engine.tick_index() >= max_ticks).then_some(RoundEnd::TickBudget))
}

fn schedule_pause(engine: &Engine, events: &[Event], every: u64, inputs: &mut Vec<SessionInput>) {
    match query::run_mode(engine) {
        RunMode::Started => {
            let advanced = events
                .iter()
                .any(|event| matches!(event, Event::SnakeAdvanced { .. }));
            if advanced && engine.tick_index() % every == 0 {
                debug!(tick = engine.tick_index(), "pausing session");
                inputs.push(SessionInput::TogglePause);
            }
        }
        RunMode::Paused => inputs.push(SessionInput::TogglePause),
        RunMode::NotStarted | RunMode::Resuming | RunMode::Over => {}
    }
}
