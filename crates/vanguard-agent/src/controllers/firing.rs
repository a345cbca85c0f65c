//! Target engagement: fire decision and coarse turret traverse.

use vanguard_fuzzy::{RuleEvaluationError, TskEngine};

use crate::config::FiringConfig;
use crate::observation::{wrap_degrees, Pose, TargetReport};

/// One tick's firing verdict, before aim refinement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FireCommand {
    pub fire: bool,
    /// Raw rule-base confidence in [0, 1]; `fire` is this thresholded.
    pub confidence: f64,
    /// Turret traverse rate in [-1, 1], positive counter-clockwise.
    pub coarse_traverse: f64,
}

/// Turns a target sighting into a fire decision and a coarse traverse rate.
///
/// Wraps a TSK engine over `{target_range, target_bearing, line_of_sight}`.
/// With no target known the turret sweeps instead: a slow traverse whose
/// direction alternates every `scan_flip_ticks`, so the unit keeps scanning
/// its surroundings rather than freezing.
#[derive(Debug, Clone)]
pub struct FiringController {
    engine: TskEngine,
    fire_threshold: f64,
    scan_rate: f64,
    scan_flip_ticks: u64,
}

impl FiringController {
    /// Outputs the controller reads from its rule base every tick.
    pub const OUTPUTS: [&'static str; 2] = ["fire_decision", "coarse_traverse"];

    /// Fails if the rule base does not declare [`Self::OUTPUTS`].
    pub fn new(engine: TskEngine, config: &FiringConfig) -> Result<Self, RuleEvaluationError> {
        super::require_outputs(&engine, &Self::OUTPUTS)?;
        Ok(Self {
            engine,
            fire_threshold: config.fire_threshold,
            scan_rate: config.scan_rate,
            scan_flip_ticks: config.scan_flip_ticks.max(1),
        })
    }

    pub fn command(&self, pose: &Pose, target: Option<&TargetReport>, tick: u64) -> FireCommand {
        let Some(target) = target else {
            return self.scan(tick);
        };

        let pos = pose.position();
        let range = pos.distance(target.position());
        let bearing =
            wrap_degrees(pos.bearing_to(target.position()) - pose.turret_bearing_deg);
        let los = if target.line_of_sight { 1.0 } else { 0.0 };

        let out = self.engine.evaluate(&[
            ("target_range", range),
            ("target_bearing", bearing),
            ("line_of_sight", los),
        ]);

        let confidence = out["fire_decision"].clamp(0.0, 1.0);
        FireCommand {
            fire: confidence >= self.fire_threshold,
            confidence,
            coarse_traverse: out["coarse_traverse"].clamp(-1.0, 1.0),
        }
    }

    fn scan(&self, tick: u64) -> FireCommand {
        let direction = if (tick / self.scan_flip_ticks) % 2 == 0 {
            1.0
        } else {
            -1.0
        };
        FireCommand {
            fire: false,
            confidence: 0.0,
            coarse_traverse: direction * self.scan_rate,
        }
    }
}
