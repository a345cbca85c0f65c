//! Concurrent session store with per-identifier isolation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use vanguard_nav::Grid;

use crate::error::UnknownSessionError;
use crate::session::{AgentSession, SessionPhase};

/// Session population snapshot for the liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionCounts {
    pub active: usize,
    pub destroyed_total: u64,
    pub ended_total: u64,
}

/// All known sessions, live and retired.
///
/// The map lock is held only to clone a slot's `Arc`; ticks for the same
/// identifier serialize on the slot's own mutex, so independent sessions
/// never contend. Retired slots stay in the map as tombstones carrying the
/// episode counter for the silent re-initialization policy.
#[derive(Debug, Default)]
pub struct SessionStore {
    slots: RwLock<HashMap<String, Arc<Mutex<AgentSession>>>>,
    destroyed_total: AtomicU64,
    ended_total: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the live session for `id`, creating or re-initializing one as
    /// needed. Returns the slot and whether this call started a new episode.
    ///
    /// An id in a terminal phase is deliberately treated as a fresh episode
    /// rather than an error: the engine destroys and respawns units freely,
    /// and a respawned unit's first action request must just work. The old
    /// slot is replaced wholesale, so an in-flight tick still holding it
    /// finishes against retired state and its result is discarded.
    pub fn checkout(
        &self,
        id: &str,
        fresh_grid: impl FnOnce() -> Arc<Grid>,
    ) -> (Arc<Mutex<AgentSession>>, bool) {
        {
            let slots = read(&self.slots);
            if let Some(slot) = slots.get(id) {
                if lock(slot).phase == SessionPhase::Active {
                    return (slot.clone(), false);
                }
            }
        }

        let mut slots = write(&self.slots);
        // Re-check under the write lock; another tick may have won the race.
        if let Some(slot) = slots.get(id) {
            let episode = {
                let session = lock(slot);
                if session.phase == SessionPhase::Active {
                    return (slot.clone(), false);
                }
                session.episode
            };
            let fresh = Arc::new(Mutex::new(AgentSession::new(id, episode + 1, fresh_grid())));
            slots.insert(id.to_owned(), fresh.clone());
            return (fresh, true);
        }

        let fresh = Arc::new(Mutex::new(AgentSession::new(id, 1, fresh_grid())));
        slots.insert(id.to_owned(), fresh.clone());
        (fresh, true)
    }

    /// Transition a session to DESTROYED. Unknown ids error (callers decide
    /// whether that matters); an already-retired session is a no-op.
    pub fn destroy(&self, id: &str) -> Result<(), UnknownSessionError> {
        self.retire(id, SessionPhase::Destroyed)
    }

    /// Transition a session to ENDED.
    pub fn end(&self, id: &str) -> Result<(), UnknownSessionError> {
        self.retire(id, SessionPhase::Ended)
    }

    /// End every live session; returns how many were still active.
    pub fn end_all(&self) -> usize {
        let slots = read(&self.slots);
        let mut ended = 0;
        for slot in slots.values() {
            let mut session = lock(slot);
            if session.phase == SessionPhase::Active {
                session.retire(SessionPhase::Ended);
                ended += 1;
            }
        }
        self.ended_total.fetch_add(ended as u64, Ordering::Relaxed);
        ended
    }

    fn retire(&self, id: &str, phase: SessionPhase) -> Result<(), UnknownSessionError> {
        let slots = read(&self.slots);
        let slot = slots.get(id).ok_or_else(|| UnknownSessionError::new(id))?;
        let mut session = lock(slot);
        if session.phase == SessionPhase::Active {
            session.retire(phase);
            let counter = match phase {
                SessionPhase::Destroyed => &self.destroyed_total,
                _ => &self.ended_total,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    pub fn counts(&self) -> SessionCounts {
        let slots = read(&self.slots);
        let active = slots
            .values()
            .filter(|slot| lock(slot).phase == SessionPhase::Active)
            .count();
        SessionCounts {
            active,
            destroyed_total: self.destroyed_total.load(Ordering::Relaxed),
            ended_total: self.ended_total.load(Ordering::Relaxed),
        }
    }
}

// A poisoned lock means another tick panicked mid-update; the session data is
// still structurally sound, so recover the guard rather than cascading.
fn lock<'a>(slot: &'a Arc<Mutex<AgentSession>>) -> MutexGuard<'a, AgentSession> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read<'a, T>(lock: &'a RwLock<T>) -> std::sync::RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<'a, T>(lock: &'a RwLock<T>) -> std::sync::RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Arc<Grid> {
        Arc::new(Grid::open(4, 4, 5.0).unwrap())
    }

    #[test]
    fn first_checkout_creates_episode_one() {
        let store = SessionStore::new();
        let (slot, fresh) = store.checkout("a", grid);
        assert!(fresh);
        assert_eq!(lock(&slot).episode, 1);
        assert_eq!(store.counts().active, 1);
    }

    #[test]
    fn steady_ticks_reuse_the_slot() {
        let store = SessionStore::new();
        let (first, _) = store.checkout("a", grid);
        let (second, fresh) = store.checkout("a", grid);
        assert!(!fresh);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn destroyed_id_reinitializes_with_a_bumped_episode() {
        let store = SessionStore::new();
        store.checkout("a", grid);
        store.destroy("a").unwrap();
        assert_eq!(store.counts().active, 0);

        let (slot, fresh) = store.checkout("a", grid);
        assert!(fresh);
        let session = lock(&slot);
        assert_eq!(session.episode, 2);
        assert_eq!(session.phase, SessionPhase::Active);
    }

    #[test]
    fn destroy_is_idempotent_and_counted_once() {
        let store = SessionStore::new();
        store.checkout("a", grid);
        store.destroy("a").unwrap();
        store.destroy("a").unwrap();
        assert_eq!(store.counts().destroyed_total, 1);
    }

    #[test]
    fn destroy_of_an_unknown_id_errors() {
        let store = SessionStore::new();
        let err = store.destroy("ghost").unwrap_err();
        assert_eq!(err.id, "ghost");
    }

    #[test]
    fn end_all_retires_only_live_sessions() {
        let store = SessionStore::new();
        store.checkout("a", grid);
        store.checkout("b", grid);
        store.destroy("a").unwrap();
        assert_eq!(store.end_all(), 1);
        let counts = store.counts();
        assert_eq!(counts.active, 0);
        assert_eq!(counts.destroyed_total, 1);
        assert_eq!(counts.ended_total, 1);
    }
}
