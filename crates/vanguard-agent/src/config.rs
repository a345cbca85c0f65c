//! Agent configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level agent configuration, loaded from a YAML file. Every field has a
/// default, so an empty file (or none at all) yields a runnable agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub map: MapDefaults,
    pub navigation: NavigationConfig,
    pub movement: MovementConfig,
    pub firing: FiringConfig,
    pub aim: AimConfig,
    pub turret: TurretLimits,
}

/// Grid dimensions assumed until the engine reports a map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDefaults {
    #[serde(default = "default_map_width")]
    pub width: u32,
    #[serde(default = "default_map_height")]
    pub height: u32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// World-unit radius within which a waypoint counts as reached.
    #[serde(default = "default_arrival_tolerance")]
    pub arrival_tolerance: f64,

    /// Cells the goal may drift from the planned goal before a replan.
    #[serde(default = "default_goal_tolerance")]
    pub goal_tolerance_cells: f64,

    /// Ring-search radius when clamping a goal onto passable ground.
    #[serde(default = "default_clamp_radius")]
    pub clamp_radius_cells: i32,

    /// Ticks a vanished target keeps steering the chase before the agent
    /// falls back to exploring.
    #[serde(default = "default_target_memory")]
    pub target_memory_ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Rule artifact path; the built-in rule base when absent.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    /// Per-tick slew limit on commanded throttle.
    #[serde(default = "default_throttle_step")]
    pub max_throttle_step: f64,

    /// Per-tick slew limit on commanded steering.
    #[serde(default = "default_steering_step")]
    pub max_steering_step: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiringConfig {
    /// Rule artifact path; the built-in rule base when absent.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    /// Fire-decision confidence at or above which the trigger latches.
    #[serde(default = "default_fire_threshold")]
    pub fire_threshold: f64,

    /// Turret sweep rate while no target is known, fraction of full slew.
    #[serde(default = "default_scan_rate")]
    pub scan_rate: f64,

    /// Ticks between sweep direction flips.
    #[serde(default = "default_scan_flip_ticks")]
    pub scan_flip_ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AimConfig {
    /// Master switch for the neural predictor.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Checkpoint path. Absent means coarse-only control by configuration,
    /// which is not a degraded state.
    #[serde(default)]
    pub checkpoint_path: Option<PathBuf>,

    /// Per-tick time budget; aim inference is skipped once exceeded.
    #[serde(default = "default_tick_budget_us")]
    pub tick_budget_us: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurretLimits {
    /// Physical traverse limit per tick, degrees.
    #[serde(default = "default_max_slew")]
    pub max_slew_deg: f64,

    #[serde(default = "default_min_elevation")]
    pub min_elevation_deg: f64,

    #[serde(default = "default_max_elevation")]
    pub max_elevation_deg: f64,
}

fn default_map_width() -> u32 {
    100
}
fn default_map_height() -> u32 {
    100
}
fn default_cell_size() -> f64 {
    5.0
}
fn default_arrival_tolerance() -> f64 {
    3.0
}
fn default_goal_tolerance() -> f64 {
    1.5
}
fn default_clamp_radius() -> i32 {
    6
}
fn default_target_memory() -> u64 {
    90
}
fn default_throttle_step() -> f64 {
    0.25
}
fn default_steering_step() -> f64 {
    0.5
}
fn default_fire_threshold() -> f64 {
    0.48
}
fn default_scan_rate() -> f64 {
    0.35
}
fn default_scan_flip_ticks() -> u64 {
    120
}
fn default_true() -> bool {
    true
}
fn default_tick_budget_us() -> u64 {
    2_000
}
fn default_max_slew() -> f64 {
    9.0
}
fn default_min_elevation() -> f64 {
    -8.0
}
fn default_max_elevation() -> f64 {
    20.0
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_height(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            arrival_tolerance: default_arrival_tolerance(),
            goal_tolerance_cells: default_goal_tolerance(),
            clamp_radius_cells: default_clamp_radius(),
            target_memory_ticks: default_target_memory(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            max_throttle_step: default_throttle_step(),
            max_steering_step: default_steering_step(),
        }
    }
}

impl Default for FiringConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            fire_threshold: default_fire_threshold(),
            scan_rate: default_scan_rate(),
            scan_flip_ticks: default_scan_flip_ticks(),
        }
    }
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            checkpoint_path: None,
            tick_budget_us: default_tick_budget_us(),
        }
    }
}

impl Default for TurretLimits {
    fn default() -> Self {
        Self {
            max_slew_deg: default_max_slew(),
            min_elevation_deg: default_min_elevation(),
            max_elevation_deg: default_max_elevation(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.map.width > 0 && self.map.height > 0,
            "map defaults must be non-empty, got {}x{}",
            self.map.width,
            self.map.height
        );
        ensure!(
            self.map.cell_size > 0.0,
            "map cell_size must be > 0, got {}",
            self.map.cell_size
        );
        ensure!(
            self.navigation.arrival_tolerance > 0.0,
            "arrival_tolerance must be > 0"
        );
        ensure!(
            self.navigation.goal_tolerance_cells >= 0.0,
            "goal_tolerance_cells must be >= 0"
        );
        ensure!(
            self.navigation.clamp_radius_cells >= 0,
            "clamp_radius_cells must be >= 0"
        );
        ensure!(
            self.movement.max_throttle_step > 0.0 && self.movement.max_steering_step > 0.0,
            "slew steps must be > 0"
        );
        ensure!(
            (0.0..=1.0).contains(&self.firing.fire_threshold),
            "fire_threshold must be within [0, 1], got {}",
            self.firing.fire_threshold
        );
        ensure!(
            (0.0..=1.0).contains(&self.firing.scan_rate),
            "scan_rate must be within [0, 1], got {}",
            self.firing.scan_rate
        );
        ensure!(self.firing.scan_flip_ticks > 0, "scan_flip_ticks must be > 0");
        ensure!(self.turret.max_slew_deg > 0.0, "max_slew_deg must be > 0");
        ensure!(
            self.turret.min_elevation_deg < self.turret.max_elevation_deg,
            "elevation limits are inverted: [{}, {}]",
            self.turret.min_elevation_deg,
            self.turret.max_elevation_deg
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_working_defaults() {
        let config: AgentConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.map.width, 100);
        assert_eq!(config.firing.fire_threshold, 0.48);
        assert!(config.aim.enabled);
        assert!(config.movement.rules_path.is_none());
    }

    #[test]
    fn partial_sections_keep_sibling_defaults() {
        let yaml = r#"
firing:
  fire_threshold: 0.6
turret:
  max_slew_deg: 12.0
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.firing.fire_threshold, 0.6);
        assert_eq!(config.firing.scan_flip_ticks, 120);
        assert_eq!(config.turret.max_slew_deg, 12.0);
        assert_eq!(config.turret.min_elevation_deg, -8.0);
    }

    #[test]
    fn inverted_elevation_limits_fail_validation() {
        let yaml = r#"
turret:
  min_elevation_deg: 30.0
  max_elevation_deg: 10.0
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let yaml = "firing:\n  fire_threshold: 1.5\n";
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }
}
