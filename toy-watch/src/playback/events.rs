//! Internal player events and commands
//!
//! Every input to a player session (user intent, slot signal, timer expiry)
//! is a `PlayerEvent`. The state machines answer each event with a list of
//! `Command`s for the engine to apply to the buffer manager. Neither type is
//! exposed over the wire; observers see `toy_common::events::WatchEvent`.

use std::time::Duration;
use toy_common::api::UserAction;
use toy_common::SlotId;

/// Input to the playback state machines
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Explicit user intent
    User(UserAction),

    /// Slot finished loading its clip
    SlotReady { slot: SlotId, clip_index: usize },

    /// Slot reached the natural end of its clip
    SlotEnded { slot: SlotId, clip_index: usize },

    /// Slot failed to load or decode its clip
    SlotError {
        slot: SlotId,
        clip_index: usize,
        message: String,
    },

    /// Slot refused or aborted a play request
    PlayRejected { slot: SlotId, clip_index: usize },

    /// Bounded loading wait elapsed
    ///
    /// `generation` identifies the loading round that armed the timer; a
    /// timer from an earlier round is stale and ignored.
    LoadTimeout { generation: u64 },
}

/// Output of the playback state machines
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Bind a slot to a clip and begin loading it
    Assign { slot: SlotId, clip_index: usize },
    Play(SlotId),
    Pause(SlotId),
    /// Show this slot, hide the other
    Show(SlotId),
    SetMuted(bool),
    /// Start the bounded loading wait
    ArmLoadTimeout { generation: u64, after: Duration },
}

/// Loading sub-phase of the `Loading` status
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingPhase {
    /// Neither readiness nor the bounded wait has resolved yet
    Waiting,
    /// Active slot reported ready first
    Ready,
    /// Bounded wait elapsed first; proceed anyway
    TimedOut,
}

impl LoadingPhase {
    pub fn is_settled(self) -> bool {
        !matches!(self, LoadingPhase::Waiting)
    }
}
