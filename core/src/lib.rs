#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the grid snake engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative engine, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the engine executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

/// Value stored in a single grid cell, or reported by a boundary check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellValue {
    /// Cell holds nothing.
    #[default]
    Empty,
    /// Cell is occupied by a snake segment.
    Snake,
    /// Cell holds the food item.
    Food,
    /// Sentinel produced for positions beyond the grid bounds. Never stored.
    Outside,
}

/// Location of a single grid cell expressed as row and column coordinates.
///
/// Coordinates are signed so that a translation off the grid stays
/// representable and can be classified as [`CellValue::Outside`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: i32,
    col: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Zero-based row index of the position.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the position.
    #[must_use]
    pub const fn col(&self) -> i32 {
        self.col
    }

    /// Returns the position offset by the direction's row and column deltas.
    #[must_use]
    pub const fn translate(self, direction: Direction) -> Self {
        Self {
            row: self.row.saturating_add(direction.row_offset()),
            col: self.col.saturating_add(direction.col_offset()),
        }
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Heading expressed as a row and column offset applied once per tick.
///
/// The four orthogonal and four diagonal compass headings are provided as
/// constants; any other non-zero offset pair can be built with
/// [`Direction::from_offsets`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    row_offset: i32,
    col_offset: i32,
}

impl Direction {
    /// Movement toward decreasing row indices.
    pub const UP: Self = Self::raw(-1, 0);
    /// Movement toward increasing row indices.
    pub const DOWN: Self = Self::raw(1, 0);
    /// Movement toward decreasing column indices.
    pub const LEFT: Self = Self::raw(0, -1);
    /// Movement toward increasing column indices.
    pub const RIGHT: Self = Self::raw(0, 1);
    /// Diagonal movement up and to the left.
    pub const UP_LEFT: Self = Self::raw(-1, -1);
    /// Diagonal movement up and to the right.
    pub const UP_RIGHT: Self = Self::raw(-1, 1);
    /// Diagonal movement down and to the left.
    pub const DOWN_LEFT: Self = Self::raw(1, -1);
    /// Diagonal movement down and to the right.
    pub const DOWN_RIGHT: Self = Self::raw(1, 1);

    /// Orthogonal headings in clockwise order starting from [`Direction::UP`].
    pub const ORTHOGONAL: [Self; 4] = [Self::UP, Self::RIGHT, Self::DOWN, Self::LEFT];

    /// All eight compass headings in clockwise order starting from [`Direction::UP`].
    pub const COMPASS: [Self; 8] = [
        Self::UP,
        Self::UP_RIGHT,
        Self::RIGHT,
        Self::DOWN_RIGHT,
        Self::DOWN,
        Self::DOWN_LEFT,
        Self::LEFT,
        Self::UP_LEFT,
    ];

    const fn raw(row_offset: i32, col_offset: i32) -> Self {
        Self {
            row_offset,
            col_offset,
        }
    }

    /// Creates a heading from an arbitrary offset pair.
    ///
    /// Returns `None` for the zero offset, which would leave the head in place.
    #[must_use]
    pub const fn from_offsets(row_offset: i32, col_offset: i32) -> Option<Self> {
        if row_offset == 0 && col_offset == 0 {
            None
        } else {
            Some(Self::raw(row_offset, col_offset))
        }
    }

    /// Row delta applied per tick.
    #[must_use]
    pub const fn row_offset(&self) -> i32 {
        self.row_offset
    }

    /// Column delta applied per tick.
    #[must_use]
    pub const fn col_offset(&self) -> i32 {
        self.col_offset
    }

    /// Heading pointing the exact reverse way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::raw(
            self.row_offset.saturating_neg(),
            self.col_offset.saturating_neg(),
        )
    }

    /// Reports whether `other` is the exact reverse of this heading.
    #[must_use]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Run mode of a game session.
///
/// The engine only ever performs the `Started -> Over` edge; every other
/// transition belongs to the host session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunMode {
    /// Session created but waiting for the player to begin.
    #[default]
    NotStarted,
    /// Ticks advance the snake.
    Started,
    /// Host withholds ticks until the player resumes.
    Paused,
    /// Short grace period between pause and play.
    Resuming,
    /// Terminal mode entered on a fatal collision.
    Over,
}

/// Reason the snake died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionCause {
    /// The head left the grid.
    Boundary,
    /// The head entered a cell held by a non-tail body segment.
    SelfCollision,
}

/// Result of a single tick request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Score after the tick was resolved.
    pub score: u32,
    /// What happened during the tick.
    pub status: TickStatus,
}

impl TickOutcome {
    /// Reports whether the tick ended the game.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.status, TickStatus::GameOver { .. })
    }
}

/// Classification of a resolved tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    /// The snake advanced without growing.
    Moved {
        /// Head position after the move.
        head: Position,
    },
    /// The snake ate and grew by one segment.
    Grew {
        /// Head position after the move.
        head: Position,
        /// Replacement food, or `None` once the board is full.
        food: Option<Position>,
    },
    /// The snake died; nothing was mutated.
    GameOver {
        /// Reason the snake died.
        cause: CollisionCause,
    },
    /// The engine was not in [`RunMode::Started`]; nothing was mutated.
    Idle {
        /// Mode the engine was in.
        mode: RunMode,
    },
}

/// Commands that express all permissible engine mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Queues a heading change for an upcoming tick.
    ChangeDirection {
        /// Requested heading.
        direction: Direction,
    },
    /// Advances the simulation by one tick.
    Tick,
    /// Requests that the engine transition to the provided run mode.
    SetRunMode {
        /// Mode the engine should activate.
        mode: RunMode,
    },
}

/// Events broadcast by the engine after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A heading change was accepted into the pending queue.
    DirectionQueued {
        /// Heading that was queued.
        direction: Direction,
    },
    /// The head moved one step.
    SnakeAdvanced {
        /// Head position before the tick.
        from: Position,
        /// Head position after the tick.
        to: Position,
    },
    /// The snake ate the food item.
    FoodConsumed {
        /// Cell that held the food.
        cell: Position,
        /// Score after eating.
        score: u32,
    },
    /// A new food item appeared.
    FoodPlaced {
        /// Cell that now holds the food.
        cell: Position,
    },
    /// No empty cell remained for food placement.
    BoardFilled,
    /// The run mode changed.
    RunModeChanged {
        /// Mode that became active.
        mode: RunMode,
    },
    /// The snake died.
    GameOver {
        /// Reason the snake died.
        cause: CollisionCause,
        /// Final score.
        score: u32,
    },
}

/// Read-only view into the dense cell grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellValue],
    rows: u32,
    cols: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellValue], rows: u32, cols: u32) -> Self {
        Self { cells, rows, cols }
    }

    /// Returns the value stored at `position`, or [`CellValue::Outside`] beyond the bounds.
    #[must_use]
    pub fn cell(&self, position: Position) -> CellValue {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(CellValue::Outside)
    }

    /// Reports whether the position lies within the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Returns the cells of a single row, if it exists.
    #[must_use]
    pub fn row(&self, row: u32) -> Option<&'a [CellValue]> {
        if row >= self.rows {
            return None;
        }
        let width = usize::try_from(self.cols).ok()?;
        let start = usize::try_from(row).ok()?.checked_mul(width)?;
        self.cells.get(start..start.checked_add(width)?)
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellValue> + 'a {
        self.cells.iter().copied()
    }

    /// Counts the cells holding `value`.
    #[must_use]
    pub fn count(&self, value: CellValue) -> usize {
        self.cells.iter().filter(|cell| **cell == value).count()
    }

    /// Provides the dimensions of the underlying grid as `(rows, cols)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    fn index(&self, position: Position) -> Option<usize> {
        let row = u32::try_from(position.row()).ok()?;
        let col = u32::try_from(position.col()).ok()?;
        if row < self.rows && col < self.cols {
            let row = usize::try_from(row).ok()?;
            let col = usize::try_from(col).ok()?;
            let width = usize::try_from(self.cols).ok()?;
            Some(row * width + col)
        } else {
            None
        }
    }
}

/// Immutable summary of the snake used by systems between ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnakeSnapshot {
    /// First body segment.
    pub head: Position,
    /// Last body segment.
    pub tail: Position,
    /// Number of body segments.
    pub length: usize,
    /// Heading applied on the last tick.
    pub heading: Direction,
    /// Last queued heading, or `heading` when nothing is queued.
    pub effective_heading: Direction,
    /// Number of heading changes waiting to be applied.
    pub pending: usize,
    /// Current score.
    pub score: u32,
    /// Current run mode.
    pub mode: RunMode,
    /// Current food cell, if the board is not full.
    pub food: Option<Position>,
}
