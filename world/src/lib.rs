#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative engine state for the grid snake simulation.

mod grid;
mod steering;

use gridsnake_core::{
    CellValue, CollisionCause, Command, Direction, Event, Position, RunMode, TickOutcome,
    TickStatus,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use grid::{GridState, InvariantViolation};
pub use steering::PENDING_DIRECTION_CAPACITY;

use steering::DirectionQueue;

/// Largest number of cells a grid may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

const INITIAL_HEADING: Direction = Direction::RIGHT;
const FIRST_BODY_COLUMN: i32 = 1;

/// Errors reported when an engine cannot be constructed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The grid needs at least one row and two columns to hold a snake, and
    /// no more than [`MAX_GRID_CELLS`] cells in total.
    #[error(
        "grid of {rows}x{cols} is unsupported (need at least 1 row and 2 columns, \
         and at most {max} cells)",
        max = MAX_GRID_CELLS
    )]
    InvalidDimensions {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        cols: u32,
    },
}

/// Parameters required to construct an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of grid rows.
    pub rows: u32,
    /// Number of grid columns.
    pub cols: u32,
    /// Seed for food placement. `None` draws one from the operating system.
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// Creates a configuration for an unseeded grid of the given size.
    #[must_use]
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            seed: None,
        }
    }

    /// Returns the configuration with a fixed food placement seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(32, 32)
    }
}

/// Represents the authoritative snake simulation state.
///
/// The engine is single-writer: hosts must serialize calls to
/// [`Engine::request_direction_change`] and [`Engine::advance_tick`].
#[derive(Clone, Debug)]
pub struct Engine {
    grid: GridState,
    heading: Direction,
    pending: DirectionQueue,
    score: u32,
    mode: RunMode,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl Engine {
    /// Creates an engine whose food placement is seeded from the operating system.
    pub fn new(rows: u32, cols: u32) -> Result<Self, EngineError> {
        Self::from_config(&EngineConfig::new(rows, cols))
    }

    /// Creates an engine with reproducible food placement.
    pub fn with_seed(rows: u32, cols: u32, seed: u64) -> Result<Self, EngineError> {
        Self::from_config(&EngineConfig::new(rows, cols).with_seed(seed))
    }

    /// Creates an engine from a full configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let EngineConfig { rows, cols, seed } = *config;
        let invalid = EngineError::InvalidDimensions { rows, cols };
        if rows == 0 || cols < 2 {
            return Err(invalid);
        }
        if i32::try_from(rows).is_err() || i32::try_from(cols).is_err() {
            return Err(invalid);
        }
        let cell_count = u64::from(rows) * u64::from(cols);
        if cell_count > MAX_GRID_CELLS || usize::try_from(cell_count).is_err() {
            return Err(invalid);
        }

        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut engine = Self {
            grid: GridState::new(rows, cols),
            heading: INITIAL_HEADING,
            pending: DirectionQueue::default(),
            score: 0,
            mode: RunMode::NotStarted,
            rng,
            tick_index: 0,
        };
        engine.add_snake();
        let _ = engine.grid.place_food(&mut engine.rng);
        Ok(engine)
    }

    fn add_snake(&mut self) {
        let row = i32::try_from(self.grid.rows() / 2).unwrap_or(0);
        let length = initial_length(self.grid.cols());
        let last_column = FIRST_BODY_COLUMN.saturating_add(i32::try_from(length).unwrap_or(0));
        for col in FIRST_BODY_COLUMN..last_column {
            enforce(self.grid.add_head(Position::new(row, col)));
        }
        self.score = length;
    }

    /// Queues a heading change for an upcoming tick.
    ///
    /// Requests are silently dropped when two changes are already pending,
    /// when they repeat or reverse the most recently queued heading (or the
    /// current heading if nothing is queued), or once the game is over.
    pub fn request_direction_change(&mut self, direction: Direction) {
        let _ = self.try_queue_direction(direction);
    }

    fn try_queue_direction(&mut self, direction: Direction) -> bool {
        if self.mode == RunMode::Over {
            return false;
        }
        let accepted = self.pending.try_push(direction, self.heading);
        if !accepted {
            tracing::trace!(?direction, "direction change rejected");
        }
        accepted
    }

    /// Advances the snake by one cell.
    ///
    /// Only runs while the engine is [`RunMode::Started`]; in any other mode
    /// the state stays frozen and the outcome reports [`TickStatus::Idle`].
    pub fn advance_tick(&mut self) -> TickOutcome {
        if self.mode != RunMode::Started {
            return self.outcome(TickStatus::Idle { mode: self.mode });
        }

        self.tick_index = self.tick_index.saturating_add(1);
        if let Some(direction) = self.pending.pop_front() {
            self.heading = direction;
        }

        let new_head = self.head().translate(self.heading);
        let status = match self.resolve_collision(new_head) {
            CellValue::Outside => self.finish(CollisionCause::Boundary),
            CellValue::Snake => self.finish(CollisionCause::SelfCollision),
            CellValue::Empty => {
                let _ = enforce(self.grid.remove_tail());
                enforce(self.grid.add_head(new_head));
                TickStatus::Moved { head: new_head }
            }
            CellValue::Food => {
                enforce(self.grid.add_head(new_head));
                self.score = self.score.saturating_add(1);
                let food = self.grid.place_food(&mut self.rng);
                tracing::debug!(
                    row = new_head.row(),
                    col = new_head.col(),
                    score = self.score,
                    board_full = food.is_none(),
                    "food consumed"
                );
                TickStatus::Grew {
                    head: new_head,
                    food,
                }
            }
        };
        self.outcome(status)
    }

    /// Classifies the cell the head is about to enter.
    ///
    /// The current tail counts as empty because it vacates during the same tick.
    fn resolve_collision(&self, position: Position) -> CellValue {
        if !self.grid.contains(position) {
            return CellValue::Outside;
        }
        if position == self.tail() {
            return CellValue::Empty;
        }
        self.grid.cell(position)
    }

    fn finish(&mut self, cause: CollisionCause) -> TickStatus {
        self.mode = RunMode::Over;
        tracing::info!(
            ?cause,
            score = self.score,
            ticks = self.tick_index,
            length = self.grid.len(),
            "game over"
        );
        TickStatus::GameOver { cause }
    }

    fn outcome(&self, status: TickStatus) -> TickOutcome {
        TickOutcome {
            score: self.score,
            status,
        }
    }

    /// Switches the run mode on behalf of the host session.
    ///
    /// Leaving [`RunMode::Over`] is refused; a restart needs a new engine.
    /// Returns whether the mode changed.
    pub fn set_run_mode(&mut self, mode: RunMode) -> bool {
        if self.mode == mode || self.mode == RunMode::Over {
            return false;
        }
        self.mode = mode;
        true
    }

    /// First body segment.
    ///
    /// # Panics
    ///
    /// Panics if the body is empty, which indicates corrupted state.
    #[must_use]
    pub fn head(&self) -> Position {
        enforce(self.grid.head())
    }

    /// Last body segment.
    ///
    /// # Panics
    ///
    /// Panics if the body is empty, which indicates corrupted state.
    #[must_use]
    pub fn tail(&self) -> Position {
        enforce(self.grid.tail())
    }

    /// Body segments in head-to-tail order.
    pub fn body(&self) -> impl ExactSizeIterator<Item = Position> + '_ {
        self.grid.body()
    }

    /// Read-only access to the grid and body.
    #[must_use]
    pub const fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Heading applied on the most recent tick.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Current run mode.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.grid.rows()
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.grid.cols()
    }

    /// Number of ticks resolved while started.
    #[must_use]
    pub const fn tick_index(&self) -> u64 {
        self.tick_index
    }
}

/// Number of segments a fresh snake spans on a grid with `cols` columns.
#[must_use]
pub const fn initial_length(cols: u32) -> u32 {
    cols / 2
}

fn enforce<T>(result: Result<T, InvariantViolation>) -> T {
    match result {
        Ok(value) => value,
        Err(violation) => panic!("engine invariant violated: {violation}"),
    }
}

/// Applies the provided command to the engine, mutating state deterministically.
pub fn apply(engine: &mut Engine, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ChangeDirection { direction } => {
            if engine.try_queue_direction(direction) {
                out_events.push(Event::DirectionQueued { direction });
            }
        }
        Command::Tick => {
            let from = engine.head();
            let outcome = engine.advance_tick();
            match outcome.status {
                TickStatus::Moved { head } => {
                    out_events.push(Event::SnakeAdvanced { from, to: head });
                }
                TickStatus::Grew { head, food } => {
                    out_events.push(Event::SnakeAdvanced { from, to: head });
                    out_events.push(Event::FoodConsumed {
                        cell: head,
                        score: outcome.score,
                    });
                    match food {
                        Some(cell) => out_events.push(Event::FoodPlaced { cell }),
                        None => out_events.push(Event::BoardFilled),
                    }
                }
                TickStatus::GameOver { cause } => {
                    out_events.push(Event::GameOver {
                        cause,
                        score: outcome.score,
                    });
                    out_events.push(Event::RunModeChanged {
                        mode: RunMode::Over,
                    });
                }
                TickStatus::Idle { .. } => {}
            }
        }
        Command::SetRunMode { mode } => {
            if engine.set_run_mode(mode) {
                out_events.push(Event::RunModeChanged { mode });
            }
        }
    }
}

/// Query functions that provide read-only access to the engine state.
pub mod query {
    use super::Engine;
    use gridsnake_core::{Direction, GridView, Position, RunMode, SnakeSnapshot};

    /// Exposes a read-only view of the cell grid.
    #[must_use]
    pub fn grid_view(engine: &Engine) -> GridView<'_> {
        engine.grid.view()
    }

    /// Captures the snake's head, tail, headings, score and food in one snapshot.
    #[must_use]
    pub fn snake_snapshot(engine: &Engine) -> SnakeSnapshot {
        SnakeSnapshot {
            head: engine.head(),
            tail: engine.tail(),
            length: engine.grid.len(),
            heading: engine.heading,
            effective_heading: engine.pending.effective_last(engine.heading),
            pending: engine.pending.len(),
            score: engine.score,
            mode: engine.mode,
            food: engine.grid.food(),
        }
    }

    /// Body segments in head-to-tail order.
    #[must_use]
    pub fn body(engine: &Engine) -> Vec<Position> {
        engine.body().collect()
    }

    /// Heading changes waiting to be applied, oldest first.
    #[must_use]
    pub fn pending_directions(engine: &Engine) -> Vec<Direction> {
        engine.pending.iter().collect()
    }

    /// Cell currently holding the food, if any.
    #[must_use]
    pub fn food(engine: &Engine) -> Option<Position> {
        engine.grid.food()
    }

    /// Current run mode.
    #[must_use]
    pub fn run_mode(engine: &Engine) -> RunMode {
        engine.mode
    }

    /// Grid dimensions as `(rows, cols)`.
    #[must_use]
    pub fn dimensions(engine: &Engine) -> (u32, u32) {
        (engine.rows(), engine.cols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_grids_that_cannot_hold_a_snake() {
        assert_eq!(
            Engine::with_seed(0, 8, 1).err(),
            Some(EngineError::InvalidDimensions { rows: 0, cols: 8 })
        );
        assert_eq!(
            Engine::with_seed(8, 1, 1).err(),
            Some(EngineError::InvalidDimensions { rows: 8, cols: 1 })
        );
        assert!(Engine::with_seed(1, 2, 1).is_ok());
    }

    #[test]
    fn rejects_grids_beyond_the_cell_cap() {
        let side = i32::MAX as u32;
        assert_eq!(
            Engine::with_seed(side, side, 1).err(),
            Some(EngineError::InvalidDimensions {
                rows: side,
                cols: side
            })
        );
        assert_eq!(
            Engine::with_seed(1, (MAX_GRID_CELLS + 1) as u32, 1).err(),
            Some(EngineError::InvalidDimensions {
                rows: 1,
                cols: (MAX_GRID_CELLS + 1) as u32
            })
        );
    }

    #[test]
    fn initial_body_spans_half_the_columns_on_the_middle_row() {
        let engine = Engine::with_seed(7, 9, 5).expect("valid grid");
        let body: Vec<_> = engine.body().collect();

        assert_eq!(initial_length(9), 4);
        assert_eq!(
            body,
            vec![
                Position::new(3, 4),
                Position::new(3, 3),
                Position::new(3, 2),
                Position::new(3, 1),
            ]
        );
        assert_eq!(engine.score(), 4);
        assert_eq!(engine.heading(), Direction::RIGHT);
        assert_eq!(engine.mode(), RunMode::NotStarted);
    }

    #[test]
    fn fresh_engine_has_exactly_one_food_off_the_snake() {
        let engine = Engine::with_seed(6, 6, 42).expect("valid grid");
        let view = query::grid_view(&engine);
        let food = query::food(&engine).expect("room for food");

        assert_eq!(view.count(CellValue::Food), 1);
        assert_eq!(view.cell(food), CellValue::Food);
        assert!(!engine.body().any(|segment| segment == food));
    }

    #[test]
    fn ticks_are_idle_until_started() {
        let mut engine = Engine::with_seed(8, 8, 3).expect("valid grid");
        let before: Vec<_> = engine.body().collect();

        let outcome = engine.advance_tick();

        assert_eq!(
            outcome.status,
            TickStatus::Idle {
                mode: RunMode::NotStarted
            }
        );
        assert_eq!(outcome.score, 4);
        assert_eq!(engine.body().collect::<Vec<_>>(), before);
        assert_eq!(engine.tick_index(), 0);
    }

    #[test]
    fn over_is_terminal() {
        let mut engine = Engine::with_seed(8, 8, 3).expect("valid grid");
        assert!(engine.set_run_mode(RunMode::Over));
        assert!(!engine.set_run_mode(RunMode::Started));
        assert_eq!(engine.mode(), RunMode::Over);

        engine.request_direction_change(Direction::UP);
        assert!(query::pending_directions(&engine).is_empty());
    }

    #[test]
    fn set_run_mode_reports_only_real_changes() {
        let mut engine = Engine::with_seed(8, 8, 3).expect("valid grid");
        let mut events = Vec::new();
        apply(
            &mut engine,
            Command::SetRunMode {
                mode: RunMode::NotStarted,
            },
            &mut events,
        );
        assert!(events.is_empty());

        apply(
            &mut engine,
            Command::SetRunMode {
                mode: RunMode::Started,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::RunModeChanged {
                mode: RunMode::Started
            }]
        );
    }
}
