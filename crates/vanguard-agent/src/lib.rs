//! Combat-unit decision core: controllers, sessions, and the per-tick pipeline.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod config;
pub mod controllers;
pub mod error;
pub mod observation;
pub mod pipeline;
pub mod session;
pub mod store;

pub use action::{Action, MovementCommand, TurretDelta};
pub use config::AgentConfig;
pub use error::UnknownSessionError;
pub use observation::{MapReport, Observation, Pose, TargetReport};
pub use controllers::{FireCommand, FiringController, MovementController};
pub use pipeline::{ActionOutcome, AgentRuntime, RuntimeStatus};
pub use session::{AgentSession, SessionPhase, TargetTrack};
pub use store::{SessionCounts, SessionStore};
