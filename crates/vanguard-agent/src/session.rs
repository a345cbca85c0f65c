//! Per-episode mutable agent state and its lifecycle.

use std::sync::Arc;

use vanguard_aim::TrackSample;
use vanguard_nav::{Grid, GridCell, PlannedPath, WorldPos};

use crate::action::MovementCommand;
use crate::observation::{wrap_degrees, TargetReport};

/// Session lifecycle. Absence from the store is the uninitialized state; the
/// two terminal phases differ only for bookkeeping, never for behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Destroyed,
    Ended,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        self != SessionPhase::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LastSeen {
    pos: WorldPos,
    tick: u64,
}

/// Short history of target kinematics feeding the firing pipeline.
///
/// Holds the newest [`vanguard_aim::HISTORY`] samples, oldest first, plus
/// where and when the target was last sighted so the navigator can chase a
/// unit that broke contact.
#[derive(Debug, Clone, Default)]
pub struct TargetTrack {
    samples: Vec<TrackSample>,
    last_seen: Option<LastSeen>,
    last_tick: Option<u64>,
}

impl TargetTrack {
    /// Fold one sighting into the track.
    ///
    /// Rates come from the previous sample when one exists; the first sample
    /// of a track derives them from the engine-reported velocity instead.
    pub fn observe(&mut self, unit: WorldPos, report: &TargetReport, tick: u64) {
        let target = report.position();
        let range = unit.distance(target);
        let bearing_deg = unit.bearing_to(target);

        let (range_rate, bearing_rate_deg) = match (self.samples.last(), self.last_tick) {
            (Some(prev), Some(last_tick)) => {
                let dt = tick.saturating_sub(last_tick).max(1) as f64;
                (
                    (range - prev.range) / dt,
                    wrap_degrees(bearing_deg - prev.bearing_deg) / dt,
                )
            }
            _ => {
                let dx = target.x - unit.x;
                let dy = target.y - unit.y;
                if range > f64::EPSILON {
                    let radial = (report.velocity_x * dx + report.velocity_y * dy) / range;
                    let angular =
                        (dx * report.velocity_y - dy * report.velocity_x) / (range * range);
                    (radial, angular.to_degrees())
                } else {
                    (0.0, 0.0)
                }
            }
        };

        self.samples.push(TrackSample {
            range,
            bearing_deg,
            range_rate,
            bearing_rate_deg,
        });
        if self.samples.len() > vanguard_aim::HISTORY {
            self.samples.remove(0);
        }
        self.last_seen = Some(LastSeen { pos: target, tick });
        self.last_tick = Some(tick);
    }

    /// Samples oldest first, at most [`vanguard_aim::HISTORY`] of them.
    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    /// Where the target was last sighted, if ever this episode.
    pub fn last_seen_pos(&self) -> Option<WorldPos> {
        self.last_seen.map(|seen| seen.pos)
    }

    /// Ticks since the last sighting.
    pub fn last_seen_age(&self, tick: u64) -> Option<u64> {
        self.last_seen.map(|seen| tick.saturating_sub(seen.tick))
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.last_seen = None;
        self.last_tick = None;
    }
}

/// All mutable state for one unit's current episode.
///
/// Every field is rebuilt on re-initialization; only the episode counter
/// survives across destroy/end boundaries for the same identifier.
#[derive(Debug)]
pub struct AgentSession {
    pub id: String,
    pub episode: u64,
    pub phase: SessionPhase,
    pub grid: Arc<Grid>,
    pub path: Option<PlannedPath>,
    pub track: TargetTrack,
    pub prev_command: MovementCommand,
    visited: Vec<u32>,
}

impl AgentSession {
    pub fn new(id: impl Into<String>, episode: u64, grid: Arc<Grid>) -> Self {
        let visited = vec![0; cell_count(&grid)];
        Self {
            id: id.into(),
            episode,
            phase: SessionPhase::Active,
            grid,
            path: None,
            track: TargetTrack::default(),
            prev_command: MovementCommand::default(),
            visited,
        }
    }

    /// Swap in a freshly built grid snapshot. The cached path and the
    /// exploration counts are tied to the old snapshot and reset with it.
    pub fn replace_grid(&mut self, grid: Arc<Grid>) {
        self.visited = vec![0; cell_count(&grid)];
        self.path = None;
        self.grid = grid;
    }

    /// Record that the unit stands on `cell` this tick.
    pub fn visit(&mut self, cell: GridCell) {
        if let Some(count) = visited_index(&self.grid, cell)
            .and_then(|idx| self.visited.get_mut(idx))
        {
            *count = count.saturating_add(1);
        }
    }

    pub fn visits(&self, cell: GridCell) -> u32 {
        visited_index(&self.grid, cell)
            .and_then(|idx| self.visited.get(idx).copied())
            .unwrap_or(0)
    }

    /// Frontier goal: the least-visited open cell, nearest first among ties,
    /// scanned in a fixed row-major order so the choice is deterministic.
    pub fn explore_goal(&self, current: GridCell) -> Option<GridCell> {
        let mut best: Option<(u32, f64, GridCell)> = None;
        for y in 0..self.grid.height() as i32 {
            for x in 0..self.grid.width() as i32 {
                let cell = GridCell::new(x, y);
                if cell == current || self.grid.cost(cell).is_none() {
                    continue;
                }
                let visits = self.visits(cell);
                let distance = current.distance(cell);
                let better = match best {
                    None => true,
                    Some((bv, bd, _)) => visits < bv || (visits == bv && distance < bd),
                };
                if better {
                    best = Some((visits, distance, cell));
                }
            }
        }
        best.map(|(_, _, cell)| cell)
    }

    /// Drop into a terminal phase, releasing per-episode resources. The slot
    /// stays in the store so the episode counter survives a re-init.
    pub fn retire(&mut self, phase: SessionPhase) {
        debug_assert!(phase.is_terminal());
        self.phase = phase;
        self.path = None;
        self.track.clear();
        self.visited = Vec::new();
        self.prev_command = MovementCommand::default();
    }
}

fn cell_count(grid: &Grid) -> usize {
    grid.width() as usize * grid.height() as usize
}

fn visited_index(grid: &Grid, cell: GridCell) -> Option<usize> {
    if !grid.in_bounds(cell) {
        return None;
    }
    Some(cell.y as usize * grid.width() as usize + cell.x as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> Arc<Grid> {
        Arc::new(Grid::open(8, 8, 5.0).unwrap())
    }

    #[test]
    fn track_rates_come_from_sample_deltas() {
        let mut track = TargetTrack::default();
        let unit = WorldPos::new(0.0, 0.0);
        let report = |x: f64| TargetReport {
            x,
            y: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            line_of_sight: true,
        };
        track.observe(unit, &report(50.0), 1);
        track.observe(unit, &report(47.0), 2);
        let latest = *track.samples().last().unwrap();
        assert!((latest.range_rate + 3.0).abs() < 1e-9);
        assert_eq!(track.last_seen_age(5), Some(3));
    }

    #[test]
    fn first_sample_rates_use_reported_velocity() {
        let mut track = TargetTrack::default();
        let unit = WorldPos::new(0.0, 0.0);
        let report = TargetReport {
            x: 40.0,
            y: 0.0,
            velocity_x: -2.0,
            velocity_y: 0.0,
            line_of_sight: true,
        };
        track.observe(unit, &report, 1);
        let sample = track.samples()[0];
        assert!((sample.range_rate + 2.0).abs() < 1e-9);
        assert!(sample.bearing_rate_deg.abs() < 1e-9);
    }

    #[test]
    fn track_keeps_only_the_newest_history() {
        let mut track = TargetTrack::default();
        let unit = WorldPos::new(0.0, 0.0);
        for tick in 0..10 {
            let report = TargetReport {
                x: 50.0 + tick as f64,
                y: 0.0,
                velocity_x: 0.0,
                velocity_y: 0.0,
                line_of_sight: true,
            };
            track.observe(unit, &report, tick);
        }
        assert_eq!(track.samples().len(), vanguard_aim::HISTORY);
        assert!((track.samples().last().unwrap().range - 59.0).abs() < 1e-9);
    }

    #[test]
    fn explore_prefers_unvisited_then_nearest() {
        let mut session = AgentSession::new("t", 1, open_grid());
        let current = GridCell::new(0, 0);
        for y in 0..8 {
            for x in 0..8 {
                if !(x >= 6 && y >= 6) {
                    session.visit(GridCell::new(x, y));
                }
            }
        }
        let goal = session.explore_goal(current).unwrap();
        assert_eq!(goal, GridCell::new(6, 6));
    }

    #[test]
    fn retire_releases_episode_state() {
        let mut session = AgentSession::new("t", 1, open_grid());
        session.visit(GridCell::new(2, 2));
        session.track.observe(
            WorldPos::new(0.0, 0.0),
            &TargetReport {
                x: 10.0,
                y: 0.0,
                velocity_x: 0.0,
                velocity_y: 0.0,
                line_of_sight: true,
            },
            1,
        );
        session.retire(SessionPhase::Destroyed);
        assert_eq!(session.phase, SessionPhase::Destroyed);
        assert!(session.path.is_none());
        assert!(session.track.samples().is_empty());
    }
}
