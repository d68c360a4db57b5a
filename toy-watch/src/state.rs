//! Shared service state
//!
//! Registry of mounted watch sessions plus the event broadcaster feeding SSE
//! observers. Sessions whose viewer went away without unmounting are expired
//! by a periodic sweep.

use crate::config::SessionLimits;
use crate::session::{SessionUpdate, WatchSession};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use toy_common::events::WatchEvent;
use tracing::{debug, info};
use uuid::Uuid;

/// Handle to one session; the mutex serializes all events for it
pub type SessionHandle = Arc<Mutex<WatchSession>>;

/// Shared state accessible by all handlers
///
/// Uses RwLock for the registry: lookups are frequent, inserts and removals rare
pub struct SharedState {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,

    /// Event broadcaster for SSE events
    pub event_tx: broadcast::Sender<WatchEvent>,
}

impl SharedState {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_tx,
        }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: WatchEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    pub fn broadcast_all(&self, events: Vec<WatchEvent>) {
        for event in events {
            self.broadcast_event(event);
        }
    }

    /// Subscribe to event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<WatchEvent> {
        self.event_tx.subscribe()
    }

    pub async fn insert_session(&self, session: WatchSession) -> SessionHandle {
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, Arc::clone(&handle));
        debug!(session_id = %id, "Session registered");
        handle
    }

    pub async fn get_session(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove_session(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session_handles(&self) -> Vec<(Uuid, SessionHandle)> {
        self.sessions
            .read()
            .await
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Broadcast an update's events and arm its loading wait
///
/// The wait runs on its own task; on expiry the timeout is fed back into the
/// session, where a stale generation is ignored.
pub fn publish_update(state: &Arc<SharedState>, session: &SessionHandle, update: SessionUpdate) {
    state.broadcast_all(update.events);

    let Some(timer) = update.load_timer else {
        return;
    };
    let state = Arc::clone(state);
    let session = Arc::clone(session);
    tokio::spawn(async move {
        tokio::time::sleep(timer.after).await;
        let mut session = session.lock().await;
        let expired = session.update(|player| player.dispatch(timer.event()));
        debug!(
            session_id = %session.id(),
            generation = timer.generation,
            "Loading wait elapsed"
        );
        // A timeout never arms another wait
        state.broadcast_all(expired.events);
    });
}

/// Unmount and drop every session idle for at least `idle_timeout`
///
/// Returns the number of sessions expired.
pub async fn expire_idle_sessions(state: &Arc<SharedState>, idle_timeout: Duration) -> usize {
    let mut expired = 0;

    for (id, handle) in state.session_handles().await {
        let mut session = handle.lock().await;
        let idle_for = session.idle_for();
        if idle_for < idle_timeout {
            continue;
        }
        // Already unmounted by an explicit delete
        if state.remove_session(id).await.is_none() {
            continue;
        }

        let update = session.unmount();
        publish_update(state, &handle, update);
        info!(
            session_id = %id,
            idle_secs = idle_for.as_secs(),
            "Idle watch session expired"
        );
        expired += 1;
    }

    expired
}

/// Run the idle-session sweep every `limits.sweep_interval`
pub fn spawn_session_reaper(state: Arc<SharedState>, limits: SessionLimits) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limits.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let expired = expire_idle_sessions(&state, limits.idle_timeout).await;
            if expired > 0 {
                let remaining = state.session_count().await;
                debug!(expired = expired, remaining = remaining, "Session sweep");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerSettings;
    use toy_common::{CardSummary, ClipDescriptor, ResolvedCard, ResolvedMedia};

    fn session() -> WatchSession {
        let resolved = ResolvedCard {
            card: CardSummary {
                title: "t".to_string(),
                recipient_name: "r".to_string(),
                occasion: None,
            },
            media: ResolvedMedia::clips(vec![ClipDescriptor::new("a", "a.mp4")]),
            poster_url: None,
        };
        WatchSession::mount("tok", resolved, PlayerSettings::default()).0
    }

    #[tokio::test]
    async fn test_session_registry() {
        let state = SharedState::new();
        let session = session();
        let id = session.id();

        state.insert_session(session).await;
        assert_eq!(state.session_count().await, 1);
        assert!(state.get_session(id).await.is_some());

        assert!(state.remove_session(id).await.is_some());
        assert!(state.get_session(id).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_keeps_active_sessions() {
        let state = Arc::new(SharedState::new());
        state.insert_session(session()).await;

        let expired = expire_idle_sessions(&state, Duration::from_secs(60)).await;

        assert_eq!(expired, 0);
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_with_zero_idle_expires_everything() {
        let state = Arc::new(SharedState::new());
        let handle = state.insert_session(session()).await;

        let expired = expire_idle_sessions(&state, Duration::ZERO).await;

        assert_eq!(expired, 1);
        assert_eq!(state.session_count().await, 0);
        assert!(handle.lock().await.player().is_released());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let state = SharedState::new();
        let mut rx = state.subscribe_events();
        let id = Uuid::new_v4();

        state.broadcast_event(WatchEvent::SessionEnded {
            session_id: id,
            timestamp: chrono::Utc::now(),
        });

        assert_eq!(rx.recv().await.unwrap().session_id(), id);
    }
}
