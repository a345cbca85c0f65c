//! The per-tick decision pipeline and process-wide runtime handles.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use vanguard_aim::{AimCorrection, AimInputs, AimModel};
use vanguard_fuzzy::{builtin, RuleSet, TskEngine};
use vanguard_nav::{plan, Grid, GridCell, WorldPos};

use crate::action::{Action, MovementCommand};
use crate::config::AgentConfig;
use crate::controllers::{turret, FiringController, MovementController};
use crate::observation::{wrap_degrees, Observation};
use crate::session::{AgentSession, SessionPhase};
use crate::store::{SessionCounts, SessionStore};

/// Runtime diagnostics exposed on the liveness probe.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeStatus {
    /// `"neural"` with the predictor loaded, `"coarse-only"` otherwise.
    pub weapon_backend: &'static str,
    /// Why the predictor is missing, when that was a failure rather than
    /// configuration.
    pub degraded_reason: Option<String>,
    pub sessions: SessionCounts,
}

/// One tick's result plus whether the learned offset made it in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionOutcome {
    pub action: Action,
    pub aim_applied: bool,
}

/// Everything loaded once at startup and shared read-only across sessions:
/// the two rule engines, the frozen aim model, configuration, and the
/// session store. One instance serves the whole process.
#[derive(Debug)]
pub struct AgentRuntime {
    config: AgentConfig,
    movement: MovementController,
    firing: FiringController,
    aim: Option<AimModel>,
    degraded_reason: Option<String>,
    default_grid: Arc<Grid>,
    store: SessionStore,
}

impl AgentRuntime {
    /// Assemble the runtime from configuration.
    ///
    /// Rule artifacts are load-or-die: a malformed rule base must never
    /// serve. A missing or corrupt aim checkpoint is survivable and drops
    /// the process into coarse-only turret control with a sticky warning.
    pub fn build(config: AgentConfig) -> Result<Self> {
        config.validate()?;

        let movement_rules = load_rules(config.movement.rules_path.as_deref(), builtin::movement_rules)
            .context("movement rule base rejected")?;
        let firing_rules = load_rules(config.firing.rules_path.as_deref(), builtin::firing_rules)
            .context("firing rule base rejected")?;

        let movement = MovementController::new(movement_rules, &config.movement)
            .context("movement rule base rejected")?;
        let firing = FiringController::new(firing_rules, &config.firing)
            .context("firing rule base rejected")?;

        let (aim, degraded_reason) = match (config.aim.enabled, &config.aim.checkpoint_path) {
            (false, _) => {
                info!("aim predictor disabled by configuration, coarse-only turret control");
                (None, None)
            }
            (true, None) => {
                info!("no aim checkpoint configured, coarse-only turret control");
                (None, None)
            }
            (true, Some(path)) => match AimModel::load(path) {
                Ok(model) => {
                    info!(checkpoint = %path.display(), "aim predictor loaded");
                    (Some(model), None)
                }
                Err(err) => {
                    warn!(checkpoint = %path.display(), %err, "aim predictor unavailable, serving degraded");
                    (None, Some(err.to_string()))
                }
            },
        };

        let default_grid = Grid::open(config.map.width, config.map.height, config.map.cell_size)
            .context("default map configuration rejected")?;

        Ok(Self {
            config,
            movement,
            firing,
            aim,
            degraded_reason,
            default_grid: Arc::new(default_grid),
            store: SessionStore::new(),
        })
    }

    pub fn status(&self) -> RuntimeStatus {
        RuntimeStatus {
            weapon_backend: if self.aim.is_some() {
                "neural"
            } else {
                "coarse-only"
            },
            degraded_reason: self.degraded_reason.clone(),
            sessions: self.store.counts(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Serve one action request. Total: every failure inside the tick maps
    /// to a documented fallback and a fully-formed action comes back.
    pub fn act(&self, session_id: &str, obs: &Observation) -> ActionOutcome {
        let started = Instant::now();

        let (slot, fresh) = self
            .store
            .checkout(session_id, || self.default_grid.clone());
        if fresh {
            debug!(session = session_id, "session initialized");
        }
        let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let session = &mut *guard;
        if session.phase != SessionPhase::Active {
            // A destroy/end signal overtook this tick between checkout and
            // lock; finish cheaply and let the engine's next request re-init.
            return ActionOutcome {
                action: Action::halt(),
                aim_applied: false,
            };
        }

        if let Some(map) = &obs.map {
            match map.build_grid() {
                Ok(grid) => session.replace_grid(Arc::new(grid)),
                Err(err) => {
                    warn!(session = session_id, %err, "malformed map report, rejecting tick");
                    return ActionOutcome {
                        action: Action::halt(),
                        aim_applied: false,
                    };
                }
            }
        }

        let grid = session.grid.clone();
        let pos = obs.pose.position();
        let current = grid.world_to_cell(pos);
        session.visit(current);
        if let Some(target) = &obs.target {
            session.track.observe(pos, target, obs.tick);
        }

        let movement = self.drive(session, obs, &grid, current);
        session.prev_command = movement;

        let fire = self.firing.command(&obs.pose, obs.target.as_ref(), obs.tick);
        let (offset, aim_applied) = self.refine_aim(session, obs, started);
        let turret_delta = turret::compose(
            fire.coarse_traverse,
            offset,
            obs.pose.turret_elevation_deg,
            &self.config.turret,
        );

        ActionOutcome {
            action: Action {
                movement,
                fire: fire.fire,
                turret_delta,
            },
            aim_applied,
        }
    }

    /// Destroy a session. Unknown ids are a logged no-op, so the call is
    /// idempotent from the engine's point of view.
    pub fn destroy(&self, session_id: &str) {
        if let Err(err) = self.store.destroy(session_id) {
            debug!(%err, "destroy for an unknown session, ignoring");
        }
    }

    /// End one session, or every live session when no id is given.
    pub fn end(&self, session_id: Option<&str>) {
        match session_id {
            Some(id) => {
                if let Err(err) = self.store.end(id) {
                    debug!(%err, "end for an unknown session, ignoring");
                }
            }
            None => {
                let ended = self.store.end_all();
                debug!(ended, "episode boundary, all sessions ended");
            }
        }
    }

    /// Goal selection, path upkeep, and the movement command.
    fn drive(
        &self,
        session: &mut AgentSession,
        obs: &Observation,
        grid: &Grid,
        current: GridCell,
    ) -> MovementCommand {
        let nav = &self.config.navigation;
        let goal = self.select_goal(session, obs, grid, current);

        let Some(goal) = goal else {
            return self.hold_position(session, obs, None);
        };

        let needs_replan = match &session.path {
            Some(path) => !path.still_valid(grid, goal, nav.goal_tolerance_cells),
            None => true,
        };
        if needs_replan {
            if goal == current {
                session.path = None;
                return self.hold_position(session, obs, None);
            }
            match plan(grid, current, goal) {
                Ok(path) => {
                    debug!(
                        session = %session.id,
                        cells = path.len(),
                        cost = path.cost(),
                        "replanned route"
                    );
                    session.path = Some(path);
                }
                Err(err) => {
                    debug!(session = %session.id, %err, "holding position");
                    session.path = None;
                    return self.hold_position(session, obs, obs.target.as_ref().map(|t| t.position()));
                }
            }
        }

        match session.path.as_mut() {
            Some(path) => {
                path.resync(current);
                self.movement.command(
                    &obs.pose,
                    grid,
                    path,
                    nav.arrival_tolerance,
                    session.prev_command,
                )
            }
            None => self.hold_position(session, obs, None),
        }
    }

    /// Engage a visible target, chase a remembered one, otherwise explore
    /// the least-visited ground. The raw goal is clamped onto passable
    /// terrain so a target parked in cover still produces a route.
    fn select_goal(
        &self,
        session: &AgentSession,
        obs: &Observation,
        grid: &Grid,
        current: GridCell,
    ) -> Option<GridCell> {
        let nav = &self.config.navigation;
        let raw = if let Some(target) = &obs.target {
            grid.world_to_cell(target.position())
        } else if let (Some(pos), Some(age)) = (
            session.track.last_seen_pos(),
            session.track.last_seen_age(obs.tick),
        ) {
            if age <= nav.target_memory_ticks {
                grid.world_to_cell(pos)
            } else {
                match &session.path {
                    // Keep following a live exploration route instead of
                    // re-picking a frontier every tick.
                    Some(path) if path.still_valid(grid, path.goal(), 0.0) => path.goal(),
                    _ => session.explore_goal(current)?,
                }
            }
        } else {
            match &session.path {
                Some(path) if path.still_valid(grid, path.goal(), 0.0) => path.goal(),
                _ => session.explore_goal(current)?,
            }
        };

        grid.nearest_open(raw, nav.clamp_radius_cells)
    }

    /// NoPathError / no-goal fallback: zero throttle, steering toward the
    /// target if one is known, all still slew-limited.
    fn hold_position(
        &self,
        session: &AgentSession,
        obs: &Observation,
        face: Option<WorldPos>,
    ) -> MovementCommand {
        let steering = face
            .map(|target| {
                let bearing =
                    wrap_degrees(obs.pose.position().bearing_to(target) - obs.pose.heading_deg);
                (bearing / 60.0).clamp(-1.0, 1.0)
            })
            .unwrap_or(0.0);
        self.movement.limit(
            session.prev_command,
            MovementCommand {
                throttle: 0.0,
                steering,
            },
        )
    }

    /// Run the predictor if it is loaded, a target is tracked, and the tick
    /// still has budget. Inference that finishes over budget is discarded,
    /// so a slow model degrades to the coarse command instead of stalling
    /// the response.
    fn refine_aim(
        &self,
        session: &AgentSession,
        obs: &Observation,
        started: Instant,
    ) -> (AimCorrection, bool) {
        let budget = Duration::from_micros(self.config.aim.tick_budget_us);
        let (Some(model), Some(target)) = (&self.aim, &obs.target) else {
            return (AimCorrection::default(), false);
        };
        let samples = session.track.samples();
        if samples.is_empty() {
            return (AimCorrection::default(), false);
        }
        if started.elapsed() >= budget {
            debug!(session = %session.id, "tick budget spent before aim inference, coarse-only");
            return (AimCorrection::default(), false);
        }

        let correction = model.predict(&AimInputs {
            samples,
            turret_bearing_deg: obs.pose.turret_bearing_deg,
            line_of_sight: target.line_of_sight,
        });
        if started.elapsed() > budget {
            debug!(session = %session.id, "aim inference blew the tick budget, discarding");
            return (AimCorrection::default(), false);
        }
        (correction, true)
    }
}

fn load_rules(
    path: Option<&Path>,
    fallback: fn() -> RuleSet,
) -> Result<TskEngine, vanguard_fuzzy::RuleEvaluationError> {
    let set = match path {
        Some(path) => RuleSet::load(path)?,
        None => fallback(),
    };
    TskEngine::new(set)
}
