use crate::grid::{Grid, GridCell};

/// A planned route plus a cursor over its unconsumed cells.
///
/// `cells[0]` is the start; the cursor begins at index 1 so the first
/// waypoint handed to steering is the first cell after the unit's own.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPath {
    cells: Vec<GridCell>,
    cost: f64,
    goal: GridCell,
    next_index: usize,
}

impl PlannedPath {
    pub(crate) fn new(cells: Vec<GridCell>, cost: f64, goal: GridCell) -> Self {
        Self {
            cells,
            cost,
            goal,
            next_index: 1,
        }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Total traversal cost of the full route.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Goal cell this route was planned for.
    pub fn goal(&self) -> GridCell {
        self.goal
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Next unconsumed waypoint, `None` once the cursor has run off the end.
    pub fn next_cell(&self) -> Option<GridCell> {
        self.cells.get(self.next_index).copied()
    }

    pub fn advance(&mut self) {
        self.next_index += 1;
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_index >= self.cells.len()
    }

    /// Re-align the cursor with the unit's actual cell.
    ///
    /// If the unit sits on a cell later in the route (it cut a corner or was
    /// displaced forward), consume everything up to and including that cell.
    pub fn resync(&mut self, current: GridCell) {
        let from = self.next_index.saturating_sub(1);
        if let Some(offset) = self.cells[from..].iter().position(|&c| c == current) {
            self.next_index = self.next_index.max(from + offset + 1);
        }
    }

    /// Whether this route can keep being followed on the given grid.
    ///
    /// A route goes stale when its cursor is exhausted, its next waypoint is
    /// no longer traversable (map change), or the goal has moved more than
    /// `goal_tolerance` cells from where it was planned.
    pub fn still_valid(&self, grid: &Grid, goal: GridCell, goal_tolerance: f64) -> bool {
        let Some(next) = self.next_cell() else {
            return false;
        };
        if grid.cost(next).is_none() {
            return false;
        }
        self.goal.distance(goal) <= goal_tolerance
    }
}
