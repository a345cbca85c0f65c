//! Waypoint-following movement controller.

use vanguard_fuzzy::{RuleEvaluationError, TskEngine};
use vanguard_nav::{Grid, PlannedPath};

use crate::action::MovementCommand;
use crate::config::MovementConfig;
use crate::observation::{wrap_degrees, Pose};

/// Fraction of the steering command taken from the rule base; the remainder
/// is a proportional bearing term that keeps small errors from dithering.
const RULE_BLEND: f64 = 0.7;

/// Bearing error at which throttle is fully suppressed (turn in place).
const ALIGNMENT_CUTOFF_DEG: f64 = 120.0;

/// Turns the next path waypoint into hull throttle/steering.
///
/// Wraps a TSK engine over `{distance_to_waypoint, bearing_error}`, advances
/// the path cursor within the arrival tolerance, and slew-limits both axes
/// against the previous tick's command so the hull never sees a step input.
#[derive(Debug, Clone)]
pub struct MovementController {
    engine: TskEngine,
    max_throttle_step: f64,
    max_steering_step: f64,
}

impl MovementController {
    /// Outputs the controller reads from its rule base every tick.
    pub const OUTPUTS: [&'static str; 2] = ["throttle", "steering"];

    /// Fails if the rule base does not declare [`Self::OUTPUTS`].
    pub fn new(engine: TskEngine, config: &MovementConfig) -> Result<Self, RuleEvaluationError> {
        super::require_outputs(&engine, &Self::OUTPUTS)?;
        Ok(Self {
            engine,
            max_throttle_step: config.max_throttle_step,
            max_steering_step: config.max_steering_step,
        })
    }

    /// One movement tick against the given path.
    ///
    /// Consumes every waypoint already inside the arrival tolerance, so a
    /// fast unit crossing several cell centers in one tick does not loop
    /// back. An exhausted path coasts to a stop.
    pub fn command(
        &self,
        pose: &Pose,
        grid: &Grid,
        path: &mut PlannedPath,
        arrival_tolerance: f64,
        previous: MovementCommand,
    ) -> MovementCommand {
        let pos = pose.position();
        while let Some(cell) = path.next_cell() {
            if grid.cell_center(cell).distance(pos) <= arrival_tolerance {
                path.advance();
            } else {
                break;
            }
        }

        let Some(cell) = path.next_cell() else {
            return self.limit(previous, MovementCommand::default());
        };
        let waypoint = grid.cell_center(cell);
        let distance = pos.distance(waypoint);
        let bearing_error = wrap_degrees(pos.bearing_to(waypoint) - pose.heading_deg);

        let out = self.engine.evaluate(&[
            ("distance_to_waypoint", distance),
            ("bearing_error", bearing_error),
        ]);

        let steering = (RULE_BLEND * out["steering"]
            + (1.0 - RULE_BLEND) * (bearing_error / 90.0))
            .clamp(-1.0, 1.0);
        let alignment = (1.0 - bearing_error.abs() / ALIGNMENT_CUTOFF_DEG).clamp(0.0, 1.0);
        let throttle = (out["throttle"] * alignment).clamp(-1.0, 1.0);

        self.limit(previous, MovementCommand { throttle, steering })
    }

    /// Slew-limit `target` against the previous tick's command.
    pub fn limit(&self, previous: MovementCommand, target: MovementCommand) -> MovementCommand {
        MovementCommand {
            throttle: step_toward(previous.throttle, target.throttle, self.max_throttle_step),
            steering: step_toward(previous.steering, target.steering, self.max_steering_step),
        }
    }
}

fn step_toward(current: f64, target: f64, max_step: f64) -> f64 {
    current + (target - current).clamp(-max_step, max_step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanguard_nav::{plan, GridCell};

    fn controller() -> MovementController {
        let engine = TskEngine::new(vanguard_fuzzy::builtin::movement_rules()).unwrap();
        MovementController::new(engine, &MovementConfig::default()).unwrap()
    }

    fn straight_path(grid: &Grid) -> PlannedPath {
        plan(grid, GridCell::new(0, 0), GridCell::new(7, 0)).unwrap()
    }

    fn pose_at(x: f64, y: f64, heading_deg: f64) -> Pose {
        Pose {
            x,
            y,
            heading_deg,
            turret_bearing_deg: 0.0,
            turret_elevation_deg: 0.0,
        }
    }

    #[test]
    fn rule_base_without_the_steering_output_is_rejected() {
        let mut set = vanguard_fuzzy::builtin::movement_rules();
        set.rules.retain(|rule| rule.output != "steering");
        set.defaults.remove("steering");
        let engine = TskEngine::new(set).unwrap();
        assert!(MovementController::new(engine, &MovementConfig::default()).is_err());
    }

    #[test]
    fn aligned_run_reaches_near_max_throttle() {
        let grid = Grid::open(8, 8, 5.0).unwrap();
        let ctrl = controller();
        let mut path = straight_path(&grid);
        let pose = pose_at(2.5, 2.5, 0.0);

        let mut command = MovementCommand::default();
        for _ in 0..8 {
            command = ctrl.command(&pose, &grid, &mut path, 3.0, command);
        }
        assert!(command.throttle >= 0.8, "throttle was {}", command.throttle);
        assert!(command.steering.abs() < 0.1);
    }

    #[test]
    fn waypoints_inside_tolerance_are_consumed() {
        let grid = Grid::open(8, 8, 5.0).unwrap();
        let ctrl = controller();
        let mut path = straight_path(&grid);
        // Standing between the first two waypoint centers, within tolerance
        // of both: both are consumed in one tick.
        let pose = pose_at(10.0, 2.5, 0.0);
        ctrl.command(&pose, &grid, &mut path, 3.0, MovementCommand::default());
        assert_eq!(path.next_cell(), Some(GridCell::new(3, 0)));
    }

    #[test]
    fn large_bearing_error_turns_in_place() {
        let grid = Grid::open(8, 8, 5.0).unwrap();
        let ctrl = controller();
        let mut path = straight_path(&grid);
        // Facing away from the route.
        let pose = pose_at(2.5, 2.5, 180.0);
        let command = ctrl.command(&pose, &grid, &mut path, 3.0, MovementCommand::default());
        assert!(command.throttle.abs() < 0.05, "throttle {}", command.throttle);
        assert!(command.steering.abs() > 0.3, "steering {}", command.steering);
    }

    #[test]
    fn commands_are_slew_limited() {
        let grid = Grid::open(8, 8, 5.0).unwrap();
        let ctrl = controller();
        let mut path = straight_path(&grid);
        let pose = pose_at(2.5, 2.5, 0.0);
        let command = ctrl.command(&pose, &grid, &mut path, 3.0, MovementCommand::default());
        let config = MovementConfig::default();
        assert!(command.throttle <= config.max_throttle_step + 1e-9);
        assert!(command.steering.abs() <= config.max_steering_step + 1e-9);
    }

    #[test]
    fn exhausted_path_coasts_to_a_stop() {
        let grid = Grid::open(8, 8, 5.0).unwrap();
        let ctrl = controller();
        let mut path = plan(&grid, GridCell::new(0, 0), GridCell::new(1, 0)).unwrap();
        // Unit sits on the goal; the only waypoint is within tolerance.
        let pose = pose_at(7.5, 2.5, 0.0);
        let previous = MovementCommand {
            throttle: 1.0,
            steering: 0.0,
        };
        let command = ctrl.command(&pose, &grid, &mut path, 3.0, previous);
        assert!(path.is_exhausted());
        assert!(command.throttle < previous.throttle);
    }
}
