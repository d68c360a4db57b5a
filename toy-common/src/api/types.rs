//! Shared API request/response types
//!
//! A remote renderer owns the actual media elements. It executes
//! `RendererCommand`s issued by the watch service and reports media signals
//! back as `MediaReport`s.

use crate::playback::SlotId;
use serde::{Deserialize, Serialize};

// ========================================
// Renderer Commands
// ========================================

/// One instruction for the renderer's media element in `slot`
///
/// # Examples
///
/// ```
/// use toy_common::api::types::RendererCommand;
/// use toy_common::SlotId;
///
/// let cmd = RendererCommand::Play { slot: SlotId::B };
/// let json = serde_json::to_string(&cmd).unwrap();
/// assert_eq!(json, r#"{"op":"play","slot":"b"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RendererCommand {
    /// Point the element at a new source and start loading (no playback)
    Load {
        slot: SlotId,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        poster_url: Option<String>,
    },
    Play { slot: SlotId },
    Pause { slot: SlotId },
    Show { slot: SlotId },
    Hide { slot: SlotId },
    Mute { slot: SlotId, muted: bool },
    /// Stop playback, detach listeners, drop the source
    Release { slot: SlotId },
}

impl RendererCommand {
    /// Slot the command targets
    pub fn slot(&self) -> SlotId {
        match self {
            RendererCommand::Load { slot, .. }
            | RendererCommand::Play { slot }
            | RendererCommand::Pause { slot }
            | RendererCommand::Show { slot }
            | RendererCommand::Hide { slot }
            | RendererCommand::Mute { slot, .. }
            | RendererCommand::Release { slot } => *slot,
        }
    }
}

// ========================================
// Renderer Reports
// ========================================

/// Media signal kinds a renderer reports for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Source loaded enough to play
    Ready,
    /// Source reached its natural end
    Ended,
    /// Load or decode failure
    Error,
    /// A play request was refused or interrupted (autoplay policy, abort)
    PlayRejected,
}

/// POST /sessions/{id}/media body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaReport {
    pub slot: SlotId,
    pub signal: SignalKind,
    /// Error detail, only meaningful for `SignalKind::Error`
    #[serde(default)]
    pub message: Option<String>,
}

/// User intents accepted by a player session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Play,
    Pause,
    /// Tap on the playback surface
    Toggle,
    Replay,
    ToggleMute,
}

/// POST /sessions/{id}/actions body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionRequest {
    pub action: UserAction,
}

// ========================================
// Error Response
// ========================================

/// Standard error response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    /// Short error title
    pub error: String,

    /// Human-readable description
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
