use core::cmp::Ordering;
use std::collections::BinaryHeap;

use thiserror::Error;

use crate::grid::{Grid, GridCell};
use crate::path::PlannedPath;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no traversable route from ({}, {}) to ({}, {})", start.x, start.y, goal.x, goal.y)]
pub struct NoPathError {
    pub start: GridCell,
    pub goal: GridCell,
}

#[derive(Debug)]
struct OpenNode {
    f: f64,
    h: f64,
    g: f64,
    cell: GridCell,
    tie: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        // Ties on f prefer the smaller h, then the earlier insertion, so
        // equal-cost frontiers expand in a reproducible order.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.tie.cmp(&self.tie))
    }
}

/// Straight-line distance scaled by the cheapest open cell.
///
/// Never overestimates: any route from `a` to `b` covers at least their
/// Euclidean separation, and every step is charged at least `min_cost`.
fn heuristic(grid: &Grid, a: GridCell, b: GridCell) -> f64 {
    a.distance(b) * grid.min_cost()
}

/// A* over the grid's 8-connected neighborhood.
///
/// Identical inputs produce byte-identical paths. Returns [`NoPathError`]
/// when the goal is unreachable, including blocked or out-of-bounds
/// endpoints; never a partial path.
pub fn plan(grid: &Grid, start: GridCell, goal: GridCell) -> Result<PlannedPath, NoPathError> {
    let no_path = NoPathError { start, goal };
    let (Some(start_idx), Some(goal_idx)) = (grid.idx(start), grid.idx(goal)) else {
        return Err(no_path);
    };
    if grid.cost(start).is_none() || grid.cost(goal).is_none() {
        return Err(no_path);
    }

    let mut open = BinaryHeap::<OpenNode>::new();
    let mut tie: u64 = 0;

    let mut g_score = vec![f64::INFINITY; grid.cell_count()];
    let mut came_from: Vec<Option<usize>> = vec![None; grid.cell_count()];

    g_score[start_idx] = 0.0;
    let h0 = heuristic(grid, start, goal);
    open.push(OpenNode {
        f: h0,
        h: h0,
        g: 0.0,
        cell: start,
        tie,
    });
    tie += 1;

    while let Some(node) = open.pop() {
        if node.cell == goal {
            let cells = reconstruct_path(grid, &came_from, goal_idx);
            return Ok(PlannedPath::new(cells, node.g, goal));
        }

        let Some(node_idx) = grid.idx(node.cell) else {
            continue;
        };
        if node.g != g_score[node_idx] {
            // Stale heap entry.
            continue;
        }

        for (n, step) in grid.neighbors(node.cell) {
            let Some(n_idx) = grid.idx(n) else { continue };

            let tentative_g = node.g + step;
            if tentative_g >= g_score[n_idx] {
                continue;
            }

            came_from[n_idx] = Some(node_idx);
            g_score[n_idx] = tentative_g;
            let h = heuristic(grid, n, goal);
            open.push(OpenNode {
                f: tentative_g + h,
                h,
                g: tentative_g,
                cell: n,
                tie,
            });
            tie += 1;
        }
    }

    Err(no_path)
}

fn reconstruct_path(grid: &Grid, came_from: &[Option<usize>], mut current: usize) -> Vec<GridCell> {
    let mut out = vec![grid.cell_from_idx(current)];
    while let Some(prev) = came_from[current] {
        current = prev;
        out.push(grid.cell_from_idx(current));
    }
    out.reverse();
    out
}
