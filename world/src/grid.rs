//! Dense cell grid and the snake body that lives on it.

use std::collections::VecDeque;

use gridsnake_core::{CellValue, GridView, Position};
use rand::{seq::IteratorRandom, Rng};
use thiserror::Error;

/// Corrupted internal state detected while manipulating the grid.
///
/// Never expected in normal operation; the engine turns these into panics.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The body was queried or shortened while holding no segments.
    #[error("snake body is empty")]
    EmptyBody,
    /// A segment was pushed onto a position beyond the grid bounds.
    #[error("position {position:?} lies outside the grid")]
    OutOfBounds {
        /// Offending position.
        position: Position,
    },
}

/// Cell grid plus the ordered, head-first chain of snake segments.
///
/// A cell is [`CellValue::Snake`] exactly when its position is in the body.
#[derive(Clone, Debug)]
pub struct GridState {
    rows: u32,
    cols: u32,
    cells: Vec<CellValue>,
    body: VecDeque<Position>,
    food: Option<Position>,
}

impl GridState {
    /// Allocates an all-empty grid without any snake segments.
    #[must_use]
    pub fn new(rows: u32, cols: u32) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(cols);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            cols,
            cells: vec![CellValue::Empty; capacity],
            body: VecDeque::new(),
            food: None,
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// First body segment.
    pub fn head(&self) -> Result<Position, InvariantViolation> {
        self.body.front().copied().ok_or(InvariantViolation::EmptyBody)
    }

    /// Last body segment.
    pub fn tail(&self) -> Result<Position, InvariantViolation> {
        self.body.back().copied().ok_or(InvariantViolation::EmptyBody)
    }

    /// Body segments in head-to-tail order.
    pub fn body(&self) -> impl ExactSizeIterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    /// Number of body segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Reports whether the body holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Cell holding the food, if any.
    #[must_use]
    pub const fn food(&self) -> Option<Position> {
        self.food
    }

    /// Reports whether the position lies within the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Value stored at `position`, or [`CellValue::Outside`] beyond the bounds.
    #[must_use]
    pub fn cell(&self, position: Position) -> CellValue {
        self.view().cell(position)
    }

    /// Read-only view over the cells.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.rows, self.cols)
    }

    /// Prepends a segment and marks its cell as snake.
    ///
    /// The caller guarantees the destination is legal; only the bounds are
    /// re-checked here.
    pub fn add_head(&mut self, position: Position) -> Result<(), InvariantViolation> {
        let index = self
            .index(position)
            .ok_or(InvariantViolation::OutOfBounds { position })?;
        self.cells[index] = CellValue::Snake;
        self.body.push_front(position);
        if self.food == Some(position) {
            self.food = None;
        }
        Ok(())
    }

    /// Clears the tail cell and drops the tail segment.
    pub fn remove_tail(&mut self) -> Result<Position, InvariantViolation> {
        let tail = self.body.pop_back().ok_or(InvariantViolation::EmptyBody)?;
        if let Some(index) = self.index(tail) {
            self.cells[index] = CellValue::Empty;
        }
        Ok(tail)
    }

    /// Lazily walks every empty cell in row-major order.
    ///
    /// The walk reads the live grid, so each call reflects the current state.
    pub fn empty_positions(&self) -> impl Iterator<Item = Position> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == CellValue::Empty)
            .filter_map(move |(index, _)| position_at(index, cols))
    }

    /// Marks one uniformly chosen empty cell as food.
    ///
    /// Leaves the grid without food when every cell is taken.
    pub fn place_food<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Position> {
        let chosen = self.empty_positions().choose(rng)?;
        let index = self.index(chosen)?;
        self.cells[index] = CellValue::Food;
        self.food = Some(chosen);
        Some(chosen)
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

fn position_at(index: usize, cols: u32) -> Option<Position> {
    let width = usize::try_from(cols).ok()?;
    if width == 0 {
        return None;
    }
    let row = i32::try_from(index / width).ok()?;
    let col = i32::try_from(index % width).ok()?;
    Some(Position::new(row, col))
}
