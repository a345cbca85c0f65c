use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lower bound applied to per-cell traversal costs.
///
/// Keeps the planner's heuristic scale finite and strictly positive even when
/// a terrain patch reports an effectively free cell.
pub const MIN_CELL_COST: f64 = 0.05;

/// Largest accepted grid dimension per axis.
///
/// Cells are addressed as `i32` and linearized into one allocation; the cap
/// keeps both in range (at most 2^30 cells) on every platform.
pub const MAX_GRID_DIM: u32 = 1 << 15;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Discrete map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in cell units.
    pub fn distance(self, other: GridCell) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }

    /// Chessboard distance in cell units.
    pub fn chebyshev(self, other: GridCell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Continuous position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

impl WorldPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: WorldPos) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Bearing from `self` to `other` in degrees, zero along +x, counter-clockwise.
    pub fn bearing_to(self, other: WorldPos) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

/// Per-cell traversal cost override supplied by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostPatch {
    pub cell: GridCell,
    pub cost: f64,
}

#[derive(Debug, Error)]
pub enum MalformedMapError {
    #[error("grid bounds must be positive, got {width}x{height}")]
    EmptyBounds { width: u32, height: u32 },
    #[error("grid bounds {width}x{height} exceed the 32768 per-axis limit")]
    OversizedBounds { width: u32, height: u32 },
    #[error("cell size must be finite and > 0, got {0}")]
    BadCellSize(f64),
    #[error("cell ({}, {}) is outside {width}x{height} bounds", cell.x, cell.y)]
    OutOfBounds { cell: GridCell, width: u32, height: u32 },
    #[error("traversal cost for cell ({}, {}) must be finite and >= 0, got {cost}", cell.x, cell.y)]
    BadCost { cell: GridCell, cost: f64 },
}

/// Immutable snapshot of the traversable map.
///
/// Built wholesale from an engine map report and never mutated afterwards;
/// map changes produce a fresh `Grid` and sessions swap snapshots atomically.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cell_size: f64,
    blocked: Vec<bool>,
    cost: Vec<f64>,
    min_cost: f64,
}

// Fixed order for determinism: N, NE, E, SE, S, SW, W, NW.
const NEIGHBOR_OFFSETS: [(i32, i32, bool); 8] = [
    (0, -1, false),
    (1, -1, true),
    (1, 0, false),
    (1, 1, true),
    (0, 1, false),
    (-1, 1, true),
    (-1, 0, false),
    (-1, -1, true),
];

impl Grid {
    /// Fully open grid with unit traversal cost everywhere.
    pub fn open(width: u32, height: u32, cell_size: f64) -> Result<Self, MalformedMapError> {
        Self::build(width, height, cell_size, &[], &[])
    }

    /// Validate and assemble a snapshot from engine-reported obstacles and
    /// terrain cost patches. Unlisted cells default to cost 1.
    pub fn build(
        width: u32,
        height: u32,
        cell_size: f64,
        obstacles: &[GridCell],
        patches: &[CostPatch],
    ) -> Result<Self, MalformedMapError> {
        if width == 0 || height == 0 {
            return Err(MalformedMapError::EmptyBounds { width, height });
        }
        if width > MAX_GRID_DIM || height > MAX_GRID_DIM {
            return Err(MalformedMapError::OversizedBounds { width, height });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(MalformedMapError::BadCellSize(cell_size));
        }

        let len = width as usize * height as usize;
        let mut grid = Self {
            width: width as i32,
            height: height as i32,
            cell_size,
            blocked: vec![false; len],
            cost: vec![1.0; len],
            min_cost: 1.0,
        };

        for &cell in obstacles {
            let idx = grid
                .idx(cell)
                .ok_or(MalformedMapError::OutOfBounds { cell, width, height })?;
            grid.blocked[idx] = true;
        }

        for &CostPatch { cell, cost } in patches {
            let idx = grid
                .idx(cell)
                .ok_or(MalformedMapError::OutOfBounds { cell, width, height })?;
            if !cost.is_finite() || cost < 0.0 {
                return Err(MalformedMapError::BadCost { cell, cost });
            }
            grid.cost[idx] = cost.max(MIN_CELL_COST);
        }

        grid.min_cost = grid
            .cost
            .iter()
            .zip(&grid.blocked)
            .filter(|(_, &blocked)| !blocked)
            .map(|(&c, _)| c)
            .fold(f64::INFINITY, f64::min);
        if !grid.min_cost.is_finite() {
            // Every cell blocked; planning will fail, keep the scale sane.
            grid.min_cost = 1.0;
        }

        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Smallest traversal cost of any open cell. Scales the planner heuristic.
    pub fn min_cost(&self) -> f64 {
        self.min_cost
    }

    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    pub(crate) fn idx(&self, cell: GridCell) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some((cell.y * self.width + cell.x) as usize)
    }

    pub(crate) fn cell_from_idx(&self, idx: usize) -> GridCell {
        let idx = idx as i32;
        GridCell::new(idx % self.width, idx / self.width)
    }

    pub(crate) fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Traversal cost of a cell, `None` when blocked or out of bounds.
    pub fn cost(&self, cell: GridCell) -> Option<f64> {
        let idx = self.idx(cell)?;
        if self.blocked[idx] {
            return None;
        }
        Some(self.cost[idx])
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, cell: GridCell) -> bool {
        self.idx(cell).map(|idx| self.blocked[idx]).unwrap_or(true)
    }

    /// Open neighbors with their step cost: destination cell cost, times
    /// sqrt(2) for diagonal moves.
    pub fn neighbors(&self, cell: GridCell) -> impl Iterator<Item = (GridCell, f64)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy, diagonal)| {
            let n = GridCell::new(cell.x + dx, cell.y + dy);
            let cost = self.cost(n)?;
            let step = if diagonal { cost * SQRT_2 } else { cost };
            Some((n, step))
        })
    }

    /// Map a world position to its containing cell, clamped into bounds.
    pub fn world_to_cell(&self, pos: WorldPos) -> GridCell {
        let x = (pos.x / self.cell_size).floor() as i32;
        let y = (pos.y / self.cell_size).floor() as i32;
        GridCell::new(x.clamp(0, self.width - 1), y.clamp(0, self.height - 1))
    }

    pub fn cell_center(&self, cell: GridCell) -> WorldPos {
        WorldPos::new(
            (f64::from(cell.x) + 0.5) * self.cell_size,
            (f64::from(cell.y) + 0.5) * self.cell_size,
        )
    }

    /// Nearest open cell to `cell` within `max_radius` rings, scanning each
    /// ring in a fixed order so the result is deterministic. Returns `cell`
    /// itself when it is already open.
    pub fn nearest_open(&self, cell: GridCell, max_radius: i32) -> Option<GridCell> {
        if self.cost(cell).is_some() {
            return Some(cell);
        }
        for radius in 1..=max_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs().max(dy.abs()) != radius {
                        continue;
                    }
                    let candidate = GridCell::new(cell.x + dx, cell.y + dy);
                    if self.cost(candidate).is_some() {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}
