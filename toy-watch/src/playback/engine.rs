//! Player engine
//!
//! Wires one watch session together: the playback state machine (sequencer
//! or legacy montage player), the buffer manager owning the two media slots,
//! and the overlay presenter.
//!
//! **Event flow:**
//! ```text
//! renderer signal ─► BufferManager::dispatch ─► slot callback ─┐
//!                                                              ▼
//! user action / timer ─────────────────────────────► event queue (mpsc)
//!                                                              │
//!                  BufferManager ◄── apply(commands) ◄── state machine
//! ```
//!
//! Events are drained one at a time, so a completion is fully processed
//! (advance, swap, repurpose) before the next event is looked at.

use super::buffer_manager::{BufferManager, SlotNotice};
use super::events::{Command, LoadingPhase, PlayerEvent};
use super::montage::MontagePlayer;
use super::overlay::{self, Overlay, PlaybackView};
use super::sequencer::Sequencer;
use super::slot::{MediaSlot, SlotSignal};
use crate::config::PlayerSettings;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use toy_common::api::UserAction;
use toy_common::{ClipDescriptor, PlaybackStatus, ResolvedCard, ResolvedMedia, SlotId};
use tracing::{debug, info, warn};

/// Player inputs at mount time
#[derive(Debug, Clone, Default)]
pub struct MountRequest {
    /// Possibly empty; order is fixed by `order_position`
    pub clips: Vec<ClipDescriptor>,
    /// Legacy pre-combined video; takes precedence over `clips`
    pub montage_url: Option<String>,
    pub poster_url: Option<String>,
    /// Presentational only
    pub recipient_name: Option<String>,
}

impl From<ResolvedCard> for MountRequest {
    fn from(resolved: ResolvedCard) -> Self {
        let (clips, montage_url) = match resolved.media {
            ResolvedMedia::Clips { clips } => (clips, None),
            ResolvedMedia::Montage { video_url } => (Vec::new(), Some(video_url)),
        };
        Self {
            clips,
            montage_url,
            poster_url: resolved.poster_url,
            recipient_name: Some(resolved.card.recipient_name),
        }
    }
}

/// How a mounted player plays its media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMode {
    Sequential,
    Montage,
    /// Nothing playable: no slots, no state machine
    NoContent,
}

/// Bounded loading wait requested by the state machine
///
/// The host arms it and feeds `PlayerEvent::LoadTimeout { generation }` back
/// once `after` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTimer {
    pub generation: u64,
    pub after: Duration,
}

impl LoadTimer {
    pub fn event(&self) -> PlayerEvent {
        PlayerEvent::LoadTimeout {
            generation: self.generation,
        }
    }
}

/// Serializable view of a player session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    pub mode: PlayerMode,
    pub status: PlaybackStatus,
    pub current_index: Option<usize>,
    pub active_slot: Option<SlotId>,
    pub preloaded_index: Option<usize>,
    pub clip_count: usize,
    pub muted: bool,
    pub loading_settled: bool,
    pub error: Option<String>,
    pub released: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
}

enum Machine {
    Sequential(Sequencer),
    Montage(MontagePlayer),
    NoContent,
}

impl Machine {
    fn mount(&mut self) -> Vec<Command> {
        match self {
            Machine::Sequential(seq) => seq.mount(),
            Machine::Montage(montage) => montage.mount(),
            Machine::NoContent => Vec::new(),
        }
    }

    fn handle(&mut self, event: PlayerEvent) -> Vec<Command> {
        match self {
            Machine::Sequential(seq) => seq.handle(event),
            Machine::Montage(montage) => montage.handle(event),
            Machine::NoContent => Vec::new(),
        }
    }

    fn clip(&self, index: usize) -> Option<&ClipDescriptor> {
        match self {
            Machine::Sequential(seq) => seq.clip(index),
            Machine::Montage(montage) => (index == 0).then(|| montage.clip()),
            Machine::NoContent => None,
        }
    }

    fn status(&self) -> PlaybackStatus {
        match self {
            Machine::Sequential(seq) => seq.status(),
            Machine::Montage(montage) => montage.status(),
            Machine::NoContent => PlaybackStatus::Idle,
        }
    }

    fn loading_phase(&self) -> LoadingPhase {
        match self {
            Machine::Sequential(seq) => seq.loading_phase(),
            Machine::Montage(montage) => montage.loading_phase(),
            Machine::NoContent => LoadingPhase::Waiting,
        }
    }

    fn awaits_user_start(&self) -> bool {
        match self {
            Machine::Sequential(seq) => seq.awaits_user_start(),
            Machine::Montage(montage) => montage.awaits_user_start(),
            Machine::NoContent => false,
        }
    }

    fn muted(&self) -> bool {
        match self {
            Machine::Sequential(seq) => seq.is_muted(),
            Machine::Montage(montage) => montage.is_muted(),
            Machine::NoContent => false,
        }
    }

    fn error(&self) -> Option<&str> {
        match self {
            Machine::Sequential(seq) => seq.error(),
            Machine::Montage(montage) => montage.error(),
            Machine::NoContent => None,
        }
    }
}

/// One mounted watch session
pub struct Player<S: MediaSlot> {
    machine: Machine,
    /// `None` in no-content mode: no slot is ever created
    buffers: Option<BufferManager<S>>,
    events_tx: mpsc::UnboundedSender<PlayerEvent>,
    events_rx: mpsc::UnboundedReceiver<PlayerEvent>,
    pending_timer: Option<LoadTimer>,
    poster_url: Option<String>,
    recipient_name: Option<String>,
}

impl<S: MediaSlot> Player<S> {
    /// Mount a player for `request`
    ///
    /// `slot_factory` is called once per slot, and only when there is
    /// something to play.
    pub fn mount<F>(request: MountRequest, settings: PlayerSettings, mut slot_factory: F) -> Self
    where
        F: FnMut(SlotId) -> S,
    {
        let MountRequest {
            clips,
            montage_url,
            poster_url,
            recipient_name,
        } = request;

        let machine = match montage_url.filter(|url| !url.is_empty()) {
            Some(url) => Machine::Montage(MontagePlayer::new(url, settings)),
            None => match Sequencer::new(clips, settings) {
                Some(seq) => Machine::Sequential(seq),
                None => Machine::NoContent,
            },
        };

        // Fall back to the first clip's poster
        let poster_url = poster_url.or_else(|| match &machine {
            Machine::Sequential(seq) => seq.clip(0).and_then(|c| c.poster_url.clone()),
            _ => None,
        });

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let buffers = match machine {
            Machine::NoContent => {
                info!("No playable content, player not started");
                None
            }
            _ => {
                let mut buffers =
                    BufferManager::new(slot_factory(SlotId::A), slot_factory(SlotId::B));
                for slot in [SlotId::A, SlotId::B] {
                    register_callbacks(&mut buffers, slot, &events_tx);
                }
                Some(buffers)
            }
        };

        let mut player = Self {
            machine,
            buffers,
            events_tx,
            events_rx,
            pending_timer: None,
            poster_url,
            recipient_name,
        };

        let commands = player.machine.mount();
        player.apply(commands);
        info!(mode = ?player.mode(), "Player mounted");
        player
    }

    /// Feed a user action or timer expiry
    pub fn dispatch(&mut self, event: PlayerEvent) {
        if self.is_released() {
            debug!(?event, "event after unmount ignored");
            return;
        }
        let commands = self.machine.handle(event);
        self.apply(commands);
        self.pump();
    }

    pub fn user_action(&mut self, action: UserAction) {
        self.dispatch(PlayerEvent::User(action));
    }

    /// Feed a renderer signal through the buffer manager's slot callbacks
    pub fn report(&mut self, slot: SlotId, signal: SlotSignal) {
        let Some(buffers) = self.buffers.as_mut() else {
            debug!(slot = %slot, signal = signal.name(), "signal without media slots ignored");
            return;
        };
        buffers.dispatch(slot, signal);
        self.pump();
    }

    /// Take the loading wait armed since the last call
    pub fn take_load_timer(&mut self) -> Option<LoadTimer> {
        self.pending_timer.take()
    }

    /// Release both slots; safe to call more than once
    pub fn unmount(&mut self) {
        if let Some(buffers) = self.buffers.as_mut() {
            buffers.release();
        }
        self.pending_timer = None;
        while self.events_rx.try_recv().is_ok() {}
    }

    /// Process queued slot events in arrival order
    fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            let commands = self.machine.handle(event);
            self.apply(commands);
        }
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for command in commands {
            if let Command::ArmLoadTimeout { generation, after } = command {
                self.pending_timer = Some(LoadTimer { generation, after });
                continue;
            }

            let Some(buffers) = self.buffers.as_mut() else {
                continue;
            };
            match command {
                Command::Assign { slot, clip_index } => {
                    let Some(clip) = self.machine.clip(clip_index) else {
                        warn!(clip_index = clip_index, "assign for unknown clip skipped");
                        continue;
                    };
                    let poster = if clip_index == 0 {
                        self.poster_url.as_deref().or(clip.poster_url.as_deref())
                    } else {
                        clip.poster_url.as_deref()
                    };
                    buffers.assign(slot, clip_index, clip, poster);
                }
                Command::Play(slot) => buffers.play(slot),
                Command::Pause(slot) => buffers.pause(slot),
                Command::Show(slot) => buffers.set_visible(slot),
                Command::SetMuted(muted) => buffers.set_muted(muted),
                Command::ArmLoadTimeout { .. } => {}
            }
        }
    }

    pub fn mode(&self) -> PlayerMode {
        match self.machine {
            Machine::Sequential(_) => PlayerMode::Sequential,
            Machine::Montage(_) => PlayerMode::Montage,
            Machine::NoContent => PlayerMode::NoContent,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.machine.status()
    }

    pub fn sequencer(&self) -> Option<&Sequencer> {
        match &self.machine {
            Machine::Sequential(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn buffers(&self) -> Option<&BufferManager<S>> {
        self.buffers.as_ref()
    }

    /// Queue for slot events; exposed so hosts can inject events in order
    pub fn event_sender(&self) -> mpsc::UnboundedSender<PlayerEvent> {
        self.events_tx.clone()
    }

    pub fn is_released(&self) -> bool {
        self.buffers.as_ref().map_or(false, |b| b.is_released())
    }

    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient_name.as_deref()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let (current_index, active_slot, preloaded_index, clip_count) = match &self.machine {
            Machine::Sequential(seq) => (
                seq.current_index(),
                Some(seq.active_slot()),
                seq.preloaded_index(),
                seq.clips().len(),
            ),
            Machine::Montage(_) => (None, Some(SlotId::A), None, 1),
            Machine::NoContent => (None, None, None, 0),
        };

        PlayerSnapshot {
            mode: self.mode(),
            status: self.machine.status(),
            current_index,
            active_slot,
            preloaded_index,
            clip_count,
            muted: self.machine.muted(),
            loading_settled: self.machine.loading_phase().is_settled(),
            error: self.machine.error().map(str::to_string),
            released: self.is_released(),
            recipient_name: self.recipient_name.clone(),
        }
    }

    pub fn overlay(&self) -> Overlay {
        let (clips, current_index): (&[ClipDescriptor], Option<usize>) = match &self.machine {
            Machine::Sequential(seq) => (seq.clips(), seq.current_index()),
            Machine::Montage(_) => (&[], None),
            Machine::NoContent => return Overlay::no_content(),
        };

        overlay::present(&PlaybackView {
            status: self.machine.status(),
            awaiting_start: self.machine.awaits_user_start(),
            clips,
            current_index,
            muted: self.machine.muted(),
            poster_url: self.poster_url.as_deref(),
        })
    }
}

fn register_callbacks<S: MediaSlot>(
    buffers: &mut BufferManager<S>,
    slot: SlotId,
    events_tx: &mpsc::UnboundedSender<PlayerEvent>,
) {
    // Sends fail only once the player (and its receiver) is gone
    let tx = events_tx.clone();
    buffers.on_ready(
        slot,
        Box::new(move |n: SlotNotice| {
            let _ = tx.send(PlayerEvent::SlotReady {
                slot: n.slot,
                clip_index: n.clip_index,
            });
        }),
    );

    let tx = events_tx.clone();
    buffers.on_ended(
        slot,
        Box::new(move |n: SlotNotice| {
            let _ = tx.send(PlayerEvent::SlotEnded {
                slot: n.slot,
                clip_index: n.clip_index,
            });
        }),
    );

    let tx = events_tx.clone();
    buffers.on_error(
        slot,
        Box::new(move |n: SlotNotice| {
            let _ = tx.send(PlayerEvent::SlotError {
                slot: n.slot,
                clip_index: n.clip_index,
                message: n.message.unwrap_or_else(|| "media error".to_string()),
            });
        }),
    );

    let tx = events_tx.clone();
    buffers.on_play_rejected(
        slot,
        Box::new(move |n: SlotNotice| {
            let _ = tx.send(PlayerEvent::PlayRejected {
                slot: n.slot,
                clip_index: n.clip_index,
            });
        }),
    );
}
