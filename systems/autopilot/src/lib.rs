#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that steers the snake greedily towards the food.
//!
//! The autopilot reads the query snapshot and grid view and emits at most one
//! [`Command::ChangeDirection`] per call. It only decides while the direction
//! queue is empty so each decision is applied by the very next tick.

use gridsnake_core::{CellValue, Command, Direction, GridView, Position, RunMode, SnakeSnapshot};

/// Greedy steering system driven by Manhattan distance to the food.
#[derive(Debug, Default)]
pub struct Autopilot {
    candidates: Vec<Direction>,
}

impl Autopilot {
    /// Creates a new autopilot with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the steering command for the upcoming tick, if any.
    pub fn handle(&mut self, snapshot: &SnakeSnapshot, grid: GridView<'_>, out: &mut Vec<Command>) {
        if snapshot.mode != RunMode::Started || snapshot.pending > 0 {
            return;
        }

        let current = snapshot.effective_heading;
        let chosen = self.choose(snapshot, grid).unwrap_or(current);
        if chosen != current {
            out.push(Command::ChangeDirection { direction: chosen });
        }
    }

    fn choose(&mut self, snapshot: &SnakeSnapshot, grid: GridView<'_>) -> Option<Direction> {
        let current = snapshot.effective_heading;
        self.candidates.clear();
        self.candidates.extend(
            Direction::ORTHOGONAL
                .into_iter()
                .filter(|direction| !direction.is_opposite(current))
                .filter(|direction| is_safe(snapshot, grid, snapshot.head.translate(*direction))),
        );

        let Some(food) = snapshot.food else {
            // Nothing to chase: hold course while it stays safe.
            if self.candidates.contains(&current) {
                return Some(current);
            }
            return self.candidates.first().copied();
        };

        // `min_by_key` keeps the first minimum, so ORTHOGONAL order breaks ties.
        self.candidates
            .iter()
            .copied()
            .min_by_key(|direction| snapshot.head.translate(*direction).manhattan_distance(food))
    }
}

fn is_safe(snapshot: &SnakeSnapshot, grid: GridView<'_>, target: Position) -> bool {
    match grid.cell(target) {
        CellValue::Empty | CellValue::Food => true,
        CellValue::Snake => target == snapshot.tail,
        CellValue::Outside => false,
    }
}
