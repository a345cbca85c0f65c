//! Composition of coarse turret traverse with the learned aim offset.

use vanguard_aim::AimCorrection;

use crate::action::TurretDelta;
use crate::config::TurretLimits;

/// Merge the firing controller's traverse rate with the predictor's offset
/// into the turret delta for this tick.
///
/// The coarse rate is a fraction of the physical per-tick slew; the offset is
/// added on top and the sum re-clamped, so no checkpoint can command more
/// traverse than the turret can actually do. Elevation additionally respects
/// the absolute elevation envelope relative to the current elevation. With
/// the predictor disabled or unavailable the offset is exactly zero and the
/// result is the coarse command alone.
pub fn compose(
    coarse_traverse: f64,
    offset: AimCorrection,
    current_elevation_deg: f64,
    limits: &TurretLimits,
) -> TurretDelta {
    let slew = limits.max_slew_deg;
    let bearing_deg =
        (coarse_traverse.clamp(-1.0, 1.0) * slew + offset.bearing_deg).clamp(-slew, slew);

    let elevation_deg = offset.elevation_deg.clamp(-slew, slew).clamp(
        limits.min_elevation_deg - current_elevation_deg,
        limits.max_elevation_deg - current_elevation_deg,
    );

    TurretDelta {
        bearing_deg,
        elevation_deg,
    }
}
