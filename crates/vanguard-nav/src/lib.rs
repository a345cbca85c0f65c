//! Grid map runtime and deterministic A* path planner.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod grid;
pub mod path;
pub mod planner;

pub use grid::{CostPatch, Grid, GridCell, MalformedMapError, WorldPos, MAX_GRID_DIM, MIN_CELL_COST};
pub use path::PlannedPath;
pub use planner::{plan, NoPathError};
