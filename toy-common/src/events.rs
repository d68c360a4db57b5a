//! Event types for the TOY watch event stream

use crate::playback::PlaybackStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Watch session events, broadcast to SSE observers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WatchEvent {
    /// A player session was mounted
    SessionStarted {
        session_id: Uuid,
        clip_count: usize,
        montage: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Player status changed
    StatusChanged {
        session_id: Uuid,
        status: PlaybackStatus,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Sequential playback moved to another clip
    ClipChanged {
        session_id: Uuid,
        index: usize,
        clip_id: String,
        contributor_name: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Mute toggled
    MuteChanged {
        session_id: Uuid,
        muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session unmounted, slots released
    SessionEnded {
        session_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl WatchEvent {
    /// Session this event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            WatchEvent::SessionStarted { session_id, .. }
            | WatchEvent::StatusChanged { session_id, .. }
            | WatchEvent::ClipChanged { session_id, .. }
            | WatchEvent::MuteChanged { session_id, .. }
            | WatchEvent::SessionEnded { session_id, .. } => *session_id,
        }
    }

    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            WatchEvent::SessionStarted { .. } => "SessionStarted",
            WatchEvent::StatusChanged { .. } => "StatusChanged",
            WatchEvent::ClipChanged { .. } => "ClipChanged",
            WatchEvent::MuteChanged { .. } => "MuteChanged",
            WatchEvent::SessionEnded { .. } => "SessionEnded",
        }
    }
}
