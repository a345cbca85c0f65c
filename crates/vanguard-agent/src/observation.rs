//! Engine-facing observation types and angle helpers.
//!
//! Angles are degrees throughout: zero along +x, counter-clockwise positive,
//! wrapped to (-180, 180].

use serde::{Deserialize, Serialize};
use vanguard_nav::{CostPatch, Grid, GridCell, MalformedMapError, WorldPos};

/// Wrap an angle in degrees to (-180, 180].
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Hull and turret pose as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub heading_deg: f64,
    #[serde(default)]
    pub turret_bearing_deg: f64,
    #[serde(default)]
    pub turret_elevation_deg: f64,
}

impl Pose {
    pub fn position(&self) -> WorldPos {
        WorldPos::new(self.x, self.y)
    }
}

/// A sighted enemy unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetReport {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub velocity_x: f64,
    #[serde(default)]
    pub velocity_y: f64,
    /// Whether the firing lane to the target is clear. A sighting with no
    /// explicit flag counts as clear.
    #[serde(default = "default_line_of_sight")]
    pub line_of_sight: bool,
}

fn default_line_of_sight() -> bool {
    true
}

impl TargetReport {
    pub fn position(&self) -> WorldPos {
        WorldPos::new(self.x, self.y)
    }
}

/// Engine-reported map contents. Present in an observation only when the
/// map changed; the grid snapshot is rebuilt wholesale from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapReport {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
    #[serde(default)]
    pub blocked: Vec<GridCell>,
    #[serde(default)]
    pub cost_patches: Vec<CostPatch>,
}

fn default_cell_size() -> f64 {
    5.0
}

impl MapReport {
    pub fn build_grid(&self) -> Result<Grid, MalformedMapError> {
        Grid::build(
            self.width,
            self.height,
            self.cell_size,
            &self.blocked,
            &self.cost_patches,
        )
    }
}

/// Everything the engine tells the agent for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub tick: u64,
    pub pose: Pose,
    #[serde(default)]
    pub target: Option<TargetReport>,
    #[serde(default)]
    pub map: Option<MapReport>,
}
