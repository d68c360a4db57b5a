//! Watch sessions
//!
//! A `WatchSession` is one mounted player driven over HTTP. Its two slots
//! are `RemoteSlot`s sharing an outbox, so every slot operation becomes a
//! `RendererCommand` the page's renderer collects on its next call.

use crate::config::PlayerSettings;
use crate::playback::{LoadTimer, MountRequest, Overlay, Player, PlayerSnapshot, RemoteOutbox, RemoteSlot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use toy_common::api::RendererCommand;
use toy_common::events::WatchEvent;
use toy_common::{CardSummary, ResolvedCard};
use uuid::Uuid;

/// Mutating session call response
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub snapshot: PlayerSnapshot,
    pub overlay: Overlay,
    /// Renderer commands queued since the previous call
    pub commands: Vec<RendererCommand>,
}

/// Result of one player mutation
#[derive(Debug, Default)]
pub struct SessionUpdate {
    /// Observer events derived from the state change
    pub events: Vec<WatchEvent>,
    /// Loading wait the host must arm
    pub load_timer: Option<LoadTimer>,
}

pub struct WatchSession {
    id: Uuid,
    share_token: String,
    card: CardSummary,
    player: Player<RemoteSlot>,
    outbox: RemoteOutbox,
    created_at: DateTime<Utc>,
    /// Last response served to the viewer; timers do not count
    last_active: Instant,
}

impl WatchSession {
    /// Mount a player for a resolved card
    ///
    /// Returns the session plus its start-up update (session started,
    /// initial status, first loading wait).
    pub fn mount(share_token: impl Into<String>, resolved: ResolvedCard, settings: PlayerSettings) -> (Self, SessionUpdate) {
        let id = Uuid::new_v4();
        let card = resolved.card.clone();
        let outbox = RemoteOutbox::new();
        let slot_outbox = outbox.clone();

        let mut player = Player::mount(MountRequest::from(resolved), settings, move |slot| {
            RemoteSlot::new(slot, slot_outbox.clone())
        });

        let now = Utc::now();
        let snapshot = player.snapshot();
        let update = SessionUpdate {
            events: vec![
                WatchEvent::SessionStarted {
                    session_id: id,
                    clip_count: snapshot.clip_count,
                    montage: snapshot.mode == crate::playback::PlayerMode::Montage,
                    timestamp: now,
                },
                WatchEvent::StatusChanged {
                    session_id: id,
                    status: snapshot.status,
                    timestamp: now,
                },
            ],
            load_timer: player.take_load_timer(),
        };

        let session = Self {
            id,
            share_token: share_token.into(),
            card,
            player,
            outbox,
            created_at: now,
            last_active: Instant::now(),
        };
        (session, update)
    }

    /// Run `f` against the player and report what changed
    pub fn update<F>(&mut self, f: F) -> SessionUpdate
    where
        F: FnOnce(&mut Player<RemoteSlot>),
    {
        let before = self.player.snapshot();
        f(&mut self.player);
        let after = self.player.snapshot();

        SessionUpdate {
            events: self.diff(&before, &after),
            load_timer: self.player.take_load_timer(),
        }
    }

    /// Release both slots
    pub fn unmount(&mut self) -> SessionUpdate {
        let mut update = self.update(|player| player.unmount());
        update.events.push(WatchEvent::SessionEnded {
            session_id: self.id,
            timestamp: Utc::now(),
        });
        update
    }

    /// Snapshot, overlay and every renderer command queued so far
    pub fn response(&mut self) -> SessionResponse {
        self.touch();
        SessionResponse {
            session_id: self.id,
            snapshot: self.player.snapshot(),
            overlay: self.player.overlay(),
            commands: self.outbox.drain(),
        }
    }

    fn diff(&self, before: &PlayerSnapshot, after: &PlayerSnapshot) -> Vec<WatchEvent> {
        let now = Utc::now();
        let mut events = Vec::new();

        if before.status != after.status {
            events.push(WatchEvent::StatusChanged {
                session_id: self.id,
                status: after.status,
                timestamp: now,
            });
        }

        if before.current_index != after.current_index {
            if let Some(index) = after.current_index {
                let clip = self.player.sequencer().and_then(|seq| seq.clip(index));
                if let Some(clip) = clip {
                    events.push(WatchEvent::ClipChanged {
                        session_id: self.id,
                        index,
                        clip_id: clip.id.clone(),
                        contributor_name: clip.contributor_name.clone(),
                        timestamp: now,
                    });
                }
            }
        }

        if before.muted != after.muted {
            events.push(WatchEvent::MuteChanged {
                session_id: self.id,
                muted: after.muted,
                timestamp: now,
            });
        }

        events
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn share_token(&self) -> &str {
        &self.share_token
    }

    pub fn card(&self) -> &CardSummary {
        &self.card
    }

    pub fn player(&self) -> &Player<RemoteSlot> {
        &self.player
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mark the session as in use by its viewer
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Time since the last request reached this session
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }
}
