use std::time::Duration;

use gridsnake_core::{Command, Event, RunMode};
use gridsnake_system_session::{Config, Session, SessionInput, SessionRequest};
use gridsnake_world::{self as world, query, Engine};

const FRAME: Duration = Duration::from_millis(250);

struct Host {
    engine: Engine,
    session: Session,
    events: Vec<Event>,
    restarts: u32,
}

impl Host {
    fn new(resume_delay: Duration) -> Self {
        Self {
            engine: fresh_engine(0),
            session: Session::new(Config::new(resume_delay)),
            events: Vec::new(),
            restarts: 0,
        }
    }

    /// Runs one host frame: session bookkeeping first, then a tick.
    fn frame(&mut self, inputs: &[SessionInput]) -> Step {
        let mut requests = Vec::new();
        let events = std::mem::take(&mut self.events);
        self.session.handle(
            &events,
            inputs,
            query::run_mode(&self.engine),
            FRAME,
            &mut requests,
        );

        for request in requests {
            match request {
                SessionRequest::Engine(command) => {
                    world::apply(&mut self.engine, command, &mut self.events);
                }
                SessionRequest::Restart => {
                    self.restarts += 1;
                    self.engine = fresh_engine(u64::from(self.restarts));
                }
            }
        }

        let before = self.events.len();
        world::apply(&mut self.engine, Command::Tick, &mut self.events);
        if self.events.len() == before {
            Step::Idle(query::run_mode(&self.engine))
        } else {
            Step::Advanced
        }
    }
}

/// What the tick at the end of a frame did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Idle(RunMode),
    Advanced,
}

fn fresh_engine(seed: u64) -> Engine {
    // A single row: the snake can only run right into the wall.
    Engine::with_seed(1, 40, seed).expect("valid grid")
}

#[test]
fn start_input_begins_play() {
    let mut host = Host::new(Duration::from_millis(500));
    assert!(matches!(host.frame(&[]), Step::Idle(_)));
    assert_eq!(query::run_mode(&host.engine), RunMode::NotStarted);

    assert!(matches!(
        host.frame(&[SessionInput::Start]),
        Step::Advanced
    ));
    assert_eq!(query::run_mode(&host.engine), RunMode::Started);
}

#[test]
fn pause_freezes_and_resume_waits_for_the_delay() {
    let mut host = Host::new(Duration::from_millis(500));
    let _ = host.frame(&[SessionInput::Start]);
    let head = host.engine.head();

    assert!(matches!(
        host.frame(&[SessionInput::TogglePause]),
        Step::Idle(RunMode::Paused)
    ));
    assert!(matches!(host.frame(&[]), Step::Idle(_)));
    assert_eq!(host.engine.head(), head);

    assert!(matches!(
        host.frame(&[SessionInput::TogglePause]),
        Step::Idle(RunMode::Resuming)
    ));
    // Two 250 ms frames cover the 500 ms grace period.
    assert!(matches!(
        host.frame(&[]),
        Step::Idle(RunMode::Resuming)
    ));
    assert!(matches!(host.frame(&[]), Step::Advanced));
    assert_eq!(query::run_mode(&host.engine), RunMode::Started);
    assert_ne!(host.engine.head(), head);
}

#[test]
fn inputs_without_a_transition_are_ignored() {
    let mut host = Host::new(Duration::from_millis(500));
    assert!(matches!(
        host.frame(&[SessionInput::TogglePause, SessionInput::Restart]),
        Step::Idle(RunMode::NotStarted)
    ));

    let _ = host.frame(&[SessionInput::Start]);
    let _ = host.frame(&[SessionInput::Start, SessionInput::Restart]);
    assert_eq!(query::run_mode(&host.engine), RunMode::Started);
    assert_eq!(host.restarts, 0);
}

#[test]
fn restart_after_game_over_builds_a_fresh_engine() {
    let mut host = Host::new(Duration::from_millis(500));
    let _ = host.frame(&[SessionInput::Start]);

    let mut frames = 0;
    while query::run_mode(&host.engine) != RunMode::Over {
        let _ = host.frame(&[]);
        frames += 1;
        assert!(frames < 100, "snake should reach the wall");
    }
    let final_score = host.engine.score();
    assert!(final_score >= 20);

    assert!(matches!(
        host.frame(&[SessionInput::TogglePause]),
        Step::Idle(RunMode::Over)
    ));

    let status = host.frame(&[SessionInput::Restart]);
    assert_eq!(host.restarts, 1);
    assert_eq!(status, Step::Idle(RunMode::NotStarted));
    assert_eq!(host.engine.score(), 20);
    assert_eq!(host.engine.head().col(), 20);

    let _ = host.frame(&[SessionInput::Start]);
    assert_eq!(query::run_mode(&host.engine), RunMode::Started);
}
