//! In-memory capture sessions with idle expiry.
//!
//! Every access refreshes a session's `last_touched` stamp. Sessions idle for
//! longer than the TTL are dropped on the next insert, by the background
//! sweep, or when looked up.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use prylom_analysis::ConfiguredAnalyzer;
use prylom_capture::CaptureController;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

pub type Controller = CaptureController<ConfiguredAnalyzer>;

struct CaptureSession {
    controller: Controller,
    last_touched: Instant,
}

#[derive(Clone)]
pub struct CaptureStore {
    idle_ttl: Duration,
    sessions: Arc<Mutex<HashMap<Uuid, CaptureSession>>>,
}

impl CaptureStore {
    #[must_use]
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            idle_ttl,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Stores a new session, first dropping any that have gone idle.
    pub async fn insert(&self, id: Uuid, controller: Controller) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        Self::evict(&mut sessions, now, self.idle_ttl);
        sessions.insert(
            id,
            CaptureSession {
                controller,
                last_touched: now,
            },
        );
    }

    /// Runs `f` against a live session and refreshes its stamp. Returns
    /// `None` for unknown or expired ids.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Controller) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        let expired = sessions
            .get(&id)
            .is_some_and(|s| now.duration_since(s.last_touched) > self.idle_ttl);
        if expired {
            sessions.remove(&id);
            tracing::debug!(capture_id = %id, "capture session expired");
            return None;
        }

        let session = sessions.get_mut(&id)?;
        session.last_touched = now;
        Some(f(&mut session.controller))
    }

    /// Returns whether a session was removed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    /// Drops idle sessions and returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        Self::evict(&mut sessions, Instant::now(), self.idle_ttl)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn evict(sessions: &mut HashMap<Uuid, CaptureSession>, now: Instant, ttl: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.last_touched) <= ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(
                evicted,
                remaining = sessions.len(),
                "idle capture sessions dropped"
            );
        }
        evicted
    }
}

/// Spawns a task that sweeps idle sessions every `every`.
pub fn spawn_idle_sweep(store: CaptureStore, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            store.evict_idle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use prylom_core::CaptureMode;

    use super::*;

    fn controller() -> Controller {
        CaptureController::new(Arc::new(ConfiguredAnalyzer::Disabled), CaptureMode::Point)
    }

    #[tokio::test(start_paused = true)]
    async fn insert_drops_sessions_past_ttl() {
        let store = CaptureStore::new(Duration::from_secs(60));
        store.insert(Uuid::new_v4(), controller()).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        store.insert(Uuid::new_v4(), controller()).await;
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn access_keeps_a_session_alive() {
        let store = CaptureStore::new(Duration::from_secs(60));
        let id = Uuid::new_v4();
        store.insert(id, controller()).await;

        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(40)).await;
            assert!(store.with_session(id, |c| c.mode()).await.is_some());
        }
        assert_eq!(store.evict_idle().await, 0);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.with_session(id, |c| c.mode()).await.is_none());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweep_empties_idle_store() {
        let store = CaptureStore::new(Duration::from_secs(30));
        store.insert(Uuid::new_v4(), controller()).await;
        store.insert(Uuid::new_v4(), controller()).await;
        let sweep = spawn_idle_sweep(store.clone(), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(store.session_count().await, 0);
        sweep.abort();
    }
}
