//! Wire types for the engine protocol.

use serde::{Deserialize, Serialize};
use vanguard_agent::{Action, Observation};

/// `POST /agent/action` body: the session identifier plus one tick's
/// observed state (pose, optional target, optional map delta).
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub session_id: String,
    #[serde(flatten)]
    pub observation: Observation,
}

/// `POST /agent/action` response. The action fields are flattened so the
/// engine sees `{movement, fire, turret_delta, mode, degraded}`.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    #[serde(flatten)]
    pub action: Action,
    /// `"neural"` when the aim offset was applied this tick, else `"coarse"`.
    pub mode: &'static str,
    /// Sticky flag: the aim checkpoint failed to load at startup.
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct DestroyRequest {
    pub session_id: String,
}

/// `POST /agent/end` body; an omitted identifier ends every live session.
#[derive(Debug, Deserialize)]
pub struct EndRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionCountsDto {
    pub active: usize,
    pub destroyed_total: u64,
    pub ended_total: u64,
}

/// `GET /` liveness/identity probe.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub name: String,
    pub version: &'static str,
    pub status: &'static str,
    pub weapon_backend: &'static str,
    pub degraded_reason: Option<String>,
    pub sessions: SessionCountsDto,
}
