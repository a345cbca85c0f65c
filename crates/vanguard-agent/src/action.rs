use serde::{Deserialize, Serialize};

/// Hull drive command, both axes in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementCommand {
    pub throttle: f64,
    pub steering: f64,
}

/// Turret correction for this tick, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TurretDelta {
    pub bearing_deg: f64,
    pub elevation_deg: f64,
}

/// The complete per-tick command handed back to the engine.
///
/// Assembled fresh every tick and never retained; every failure path in the
/// pipeline maps to a fully-populated value, most of them to [`Action::halt`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub movement: MovementCommand,
    pub fire: bool,
    pub turret_delta: TurretDelta,
}

impl Action {
    /// Safe no-op: full stop, guns quiet, turret held.
    pub fn halt() -> Self {
        Self {
            movement: MovementCommand::default(),
            fire: false,
            turret_delta: TurretDelta::default(),
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::halt()
    }
}
