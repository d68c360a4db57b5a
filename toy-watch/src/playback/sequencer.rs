//! Playback Sequencer
//!
//! Finite-state machine for sequential, double-buffered clip playback.
//!
//! ```text
//! Idle → Loading → Playing ⇄ Paused
//!                  Playing → Finished → Loading (replay)
//! any → Errored (terminal)
//! ```
//!
//! The sequencer owns the `PlaybackSession` and is its only writer. It never
//! touches slots directly: `handle` consumes one `PlayerEvent` and returns the
//! `Command`s the engine must apply, so every transition can be exercised
//! without any rendering surface.

use super::events::{Command, LoadingPhase, PlayerEvent};
use crate::config::PlayerSettings;
use toy_common::api::UserAction;
use toy_common::clip::sort_by_order_position;
use toy_common::{ClipDescriptor, PlaybackStatus, SlotId};
use tracing::{debug, info, warn};

/// Mutable state of one sequential playback session
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    /// Sorted once at construction, never mutated afterwards
    clips: Vec<ClipDescriptor>,

    /// `None` until playback first starts
    current_index: Option<usize>,

    /// Visible, authoritative slot
    active_slot: SlotId,

    status: PlaybackStatus,

    /// Clip loaded into the inactive slot
    preloaded_index: Option<usize>,

    loading_phase: LoadingPhase,

    /// Loading round counter, used to discard stale timeouts
    generation: u64,

    muted: bool,

    error: Option<String>,

    /// Status and index to fall back to if the last play request is refused
    reject_fallback: Option<(PlaybackStatus, Option<usize>)>,

    /// Start as soon as loading settles, regardless of autoplay
    start_when_settled: bool,

    /// The start issued when loading settled was refused by the renderer
    start_refused: bool,
}

/// Sequential clip player state machine
#[derive(Debug, Clone)]
pub struct Sequencer {
    session: PlaybackSession,
    settings: PlayerSettings,
}

impl Sequencer {
    /// Create a sequencer for `clips`, sorted by order position
    ///
    /// Returns `None` for an empty list: there is nothing to sequence.
    pub fn new(mut clips: Vec<ClipDescriptor>, settings: PlayerSettings) -> Option<Self> {
        if clips.is_empty() {
            return None;
        }
        sort_by_order_position(&mut clips);

        Some(Self {
            session: PlaybackSession {
                clips,
                current_index: None,
                active_slot: SlotId::INITIAL,
                status: PlaybackStatus::Idle,
                preloaded_index: None,
                loading_phase: LoadingPhase::Waiting,
                generation: 0,
                muted: settings.start_muted,
                error: None,
                reject_fallback: None,
                start_when_settled: false,
                start_refused: false,
            },
            settings,
        })
    }

    /// Idle → Loading: assign the first clips and arm the bounded wait
    pub fn mount(&mut self) -> Vec<Command> {
        if self.session.status != PlaybackStatus::Idle {
            warn!(status = %self.session.status, "mount on an already mounted sequencer ignored");
            return Vec::new();
        }
        self.begin_loading()
    }

    /// Apply one event and return the slot commands it requires
    pub fn handle(&mut self, event: PlayerEvent) -> Vec<Command> {
        if self.session.status == PlaybackStatus::Errored {
            debug!(?event, "event after error ignored");
            return Vec::new();
        }

        match event {
            PlayerEvent::User(action) => {
                self.session.reject_fallback = None;
                self.on_user(action)
            }
            PlayerEvent::SlotReady { slot, clip_index } => self.on_ready(slot, clip_index),
            PlayerEvent::SlotEnded { slot, clip_index } => {
                self.session.reject_fallback = None;
                self.on_ended(slot, clip_index)
            }
            PlayerEvent::SlotError {
                slot,
                clip_index,
                message,
            } => self.fail(slot, clip_index, message),
            PlayerEvent::PlayRejected { slot, .. } => self.on_play_rejected(slot),
            PlayerEvent::LoadTimeout { generation } => self.on_load_timeout(generation),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn begin_loading(&mut self) -> Vec<Command> {
        let session = &mut self.session;
        session.generation += 1;
        session.status = PlaybackStatus::Loading;
        session.loading_phase = LoadingPhase::Waiting;
        session.active_slot = SlotId::INITIAL;
        session.start_refused = false;

        let mut commands = vec![Command::Assign {
            slot: SlotId::INITIAL,
            clip_index: 0,
        }];
        if session.clips.len() > 1 {
            commands.push(Command::Assign {
                slot: SlotId::INITIAL.other(),
                clip_index: 1,
            });
            session.preloaded_index = Some(1);
        } else {
            session.preloaded_index = None;
        }
        commands.push(Command::Show(SlotId::INITIAL));
        commands.push(Command::SetMuted(session.muted));
        commands.push(Command::ArmLoadTimeout {
            generation: session.generation,
            after: self.settings.loading_timeout,
        });

        info!(
            clip_count = session.clips.len(),
            generation = session.generation,
            "Loading clip sequence"
        );
        commands
    }

    fn on_user(&mut self, action: UserAction) -> Vec<Command> {
        let status = self.session.status;
        match (action, status) {
            (UserAction::ToggleMute, _) => {
                self.session.muted = !self.session.muted;
                vec![Command::SetMuted(self.session.muted)]
            }
            (UserAction::Play | UserAction::Toggle, PlaybackStatus::Idle) => {
                self.session.start_when_settled = true;
                self.begin_loading()
            }
            (UserAction::Play | UserAction::Toggle, PlaybackStatus::Loading) => self.start(),
            (UserAction::Play | UserAction::Toggle, PlaybackStatus::Paused) => self.resume(),
            (UserAction::Pause | UserAction::Toggle, PlaybackStatus::Playing) => self.pause(),
            (UserAction::Play | UserAction::Toggle | UserAction::Replay, PlaybackStatus::Finished) => {
                self.replay()
            }
            _ => {
                debug!(?action, status = %status, "user action has no effect in this state");
                Vec::new()
            }
        }
    }

    /// Loading → Playing on the initial slot
    fn start(&mut self) -> Vec<Command> {
        let session = &mut self.session;
        session.reject_fallback = Some((session.status, session.current_index));
        session.status = PlaybackStatus::Playing;
        session.current_index = Some(0);
        session.start_when_settled = false;
        session.start_refused = false;

        info!(slot = %session.active_slot, "Starting clip sequence");
        vec![
            Command::Show(session.active_slot),
            Command::Play(session.active_slot),
        ]
    }

    fn pause(&mut self) -> Vec<Command> {
        self.session.status = PlaybackStatus::Paused;
        debug!(index = ?self.session.current_index, "Paused");
        vec![Command::Pause(self.session.active_slot)]
    }

    /// Paused → Playing from the current position
    fn resume(&mut self) -> Vec<Command> {
        let session = &mut self.session;
        session.reject_fallback = Some((session.status, session.current_index));
        session.status = PlaybackStatus::Playing;
        debug!(index = ?session.current_index, "Resumed");
        vec![Command::Play(session.active_slot)]
    }

    /// Finished → Loading with the session rewound to the first clip
    fn replay(&mut self) -> Vec<Command> {
        info!("Replaying clip sequence");
        self.session.current_index = Some(0);
        self.session.start_when_settled = true;
        self.begin_loading()
    }

    fn on_ready(&mut self, slot: SlotId, clip_index: usize) -> Vec<Command> {
        let session = &mut self.session;
        let is_loading_target = session.status == PlaybackStatus::Loading
            && slot == session.active_slot
            && clip_index == 0;

        if !is_loading_target {
            debug!(slot = %slot, clip_index = clip_index, "slot ready (preload)");
            return Vec::new();
        }
        if session.loading_phase.is_settled() {
            return Vec::new();
        }

        session.loading_phase = LoadingPhase::Ready;
        debug!(slot = %slot, "Initial clip ready");
        self.settle()
    }

    fn on_load_timeout(&mut self, generation: u64) -> Vec<Command> {
        let session = &mut self.session;
        if session.status != PlaybackStatus::Loading
            || generation != session.generation
            || session.loading_phase.is_settled()
        {
            debug!(generation = generation, "stale loading timeout ignored");
            return Vec::new();
        }

        session.loading_phase = LoadingPhase::TimedOut;
        warn!(
            timeout_ms = self.settings.loading_timeout.as_millis() as u64,
            "No readiness signal before timeout, proceeding"
        );
        self.settle()
    }

    /// Loading has settled (ready or timed out): start if someone asked to
    fn settle(&mut self) -> Vec<Command> {
        if self.session.start_when_settled || self.settings.autoplay {
            self.start()
        } else {
            Vec::new()
        }
    }

    fn on_ended(&mut self, slot: SlotId, clip_index: usize) -> Vec<Command> {
        let session = &mut self.session;
        let Some(current) = session.current_index else {
            debug!(slot = %slot, "ended before playback started ignored");
            return Vec::new();
        };
        if session.status != PlaybackStatus::Playing
            || slot != session.active_slot
            || clip_index != current
        {
            debug!(
                slot = %slot,
                clip_index = clip_index,
                status = %session.status,
                "ended from inactive slot ignored"
            );
            return Vec::new();
        }

        let next = current + 1;
        if next >= session.clips.len() {
            session.status = PlaybackStatus::Finished;
            session.preloaded_index = None;
            info!(clip_count = session.clips.len(), "Clip sequence finished");
            return vec![Command::Pause(session.active_slot)];
        }

        let finished_slot = session.active_slot;
        let incoming = finished_slot.other();
        let mut commands = Vec::new();

        if session.preloaded_index != Some(next) {
            warn!(slot = %incoming, clip_index = next, "next clip was not preloaded");
            commands.push(Command::Assign {
                slot: incoming,
                clip_index: next,
            });
        }

        session.current_index = Some(next);
        session.active_slot = incoming;
        commands.push(Command::Show(incoming));
        commands.push(Command::Play(incoming));

        // Repurpose the slot that just finished for the clip after next
        let after_next = next + 1;
        if after_next < session.clips.len() {
            commands.push(Command::Assign {
                slot: finished_slot,
                clip_index: after_next,
            });
            session.preloaded_index = Some(after_next);
        } else {
            session.preloaded_index = None;
        }

        info!(
            index = next,
            slot = %incoming,
            clip_id = %session.clips[next].id,
            "Advanced to next clip"
        );
        commands
    }

    fn on_play_rejected(&mut self, slot: SlotId) -> Vec<Command> {
        let session = &mut self.session;
        if session.status != PlaybackStatus::Playing || slot != session.active_slot {
            return Vec::new();
        }

        match session.reject_fallback.take() {
            Some((status, index)) => {
                // Refused start or resume: as if it was never requested
                session.status = status;
                session.current_index = index;
                session.start_refused = status == PlaybackStatus::Loading;
                debug!(status = %status, "play request rejected, state unchanged");
            }
            None => {
                // Refused mid-sequence play: surface the play affordance
                session.status = PlaybackStatus::Paused;
                info!(slot = %slot, "play refused during playback, pausing");
            }
        }
        Vec::new()
    }

    fn fail(&mut self, slot: SlotId, clip_index: usize, message: String) -> Vec<Command> {
        warn!(
            slot = %slot,
            clip_index = clip_index,
            error = %message,
            "Media slot failed, playback halted"
        );
        let session = &mut self.session;
        session.status = PlaybackStatus::Errored;
        session.error = Some(message);
        session.preloaded_index = None;
        session.reject_fallback = None;
        vec![Command::Pause(SlotId::A), Command::Pause(SlotId::B)]
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn status(&self) -> PlaybackStatus {
        self.session.status
    }

    pub fn current_index(&self) -> Option<usize> {
        self.session.current_index
    }

    pub fn active_slot(&self) -> SlotId {
        self.session.active_slot
    }

    pub fn preloaded_index(&self) -> Option<usize> {
        self.session.preloaded_index
    }

    pub fn clips(&self) -> &[ClipDescriptor] {
        &self.session.clips
    }

    pub fn clip(&self, index: usize) -> Option<&ClipDescriptor> {
        self.session.clips.get(index)
    }

    pub fn current_clip(&self) -> Option<&ClipDescriptor> {
        self.session.current_index.and_then(|i| self.clip(i))
    }

    pub fn loading_phase(&self) -> LoadingPhase {
        self.session.loading_phase
    }

    /// Loading is stuck until the viewer starts playback by hand
    ///
    /// True after the bounded wait elapsed without readiness, after a refused
    /// start, or once ready when nothing else will start playback.
    pub fn awaits_user_start(&self) -> bool {
        let session = &self.session;
        if session.status != PlaybackStatus::Loading {
            return false;
        }
        match session.loading_phase {
            LoadingPhase::Waiting => false,
            LoadingPhase::TimedOut => true,
            LoadingPhase::Ready => {
                session.start_refused
                    || !(self.settings.autoplay || session.start_when_settled)
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        self.session.muted
    }

    pub fn error(&self) -> Option<&str> {
        self.session.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.session.generation
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }
}
