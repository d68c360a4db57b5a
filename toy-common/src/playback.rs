//! Playback status and buffer slot identifiers

use serde::{Deserialize, Serialize};

/// Status of a watch session's player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Mounted, nothing requested yet
    Idle,
    /// Sources assigned, waiting for readiness or the bounded wait
    Loading,
    Playing,
    Paused,
    /// Last clip completed; replay is available
    Finished,
    /// Terminal for the session
    Errored,
}

impl PlaybackStatus {
    /// Whether a session in this status has started playing at least once
    /// and is still showing clip content (Playing or Paused)
    pub fn is_engaged(self) -> bool {
        matches!(self, PlaybackStatus::Playing | PlaybackStatus::Paused)
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Idle => write!(f, "idle"),
            PlaybackStatus::Loading => write!(f, "loading"),
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Finished => write!(f, "finished"),
            PlaybackStatus::Errored => write!(f, "errored"),
        }
    }
}

/// One of the two interchangeable video-rendering slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotId {
    A,
    B,
}

impl SlotId {
    /// The slot a session starts on
    pub const INITIAL: SlotId = SlotId::A;

    /// The opposite slot
    pub fn other(self) -> SlotId {
        match self {
            SlotId::A => SlotId::B,
            SlotId::B => SlotId::A,
        }
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotId::A => write!(f, "A"),
            SlotId::B => write!(f, "B"),
        }
    }
}
