//! Legacy montage player
//!
//! A card rendered before per-clip sequencing existed carries one
//! pre-combined video. It plays on slot A only, with the same loading and
//! error states as the sequencer but no index tracking and no preloading.

use super::events::{Command, LoadingPhase, PlayerEvent};
use crate::config::PlayerSettings;
use toy_common::api::UserAction;
use toy_common::{ClipDescriptor, PlaybackStatus, SlotId};
use tracing::{debug, info, warn};

/// Clip id given to the montage source
pub const MONTAGE_CLIP_ID: &str = "montage";

/// Single-buffer player state machine
#[derive(Debug, Clone)]
pub struct MontagePlayer {
    /// The montage as a one-element clip list, for uniform slot assignment
    clip: ClipDescriptor,
    status: PlaybackStatus,
    loading_phase: LoadingPhase,
    generation: u64,
    muted: bool,
    error: Option<String>,
    reject_fallback: Option<PlaybackStatus>,
    start_when_settled: bool,
    start_refused: bool,
    settings: PlayerSettings,
}

impl MontagePlayer {
    pub fn new(video_url: impl Into<String>, settings: PlayerSettings) -> Self {
        Self {
            clip: ClipDescriptor::new(MONTAGE_CLIP_ID, video_url),
            status: PlaybackStatus::Idle,
            loading_phase: LoadingPhase::Waiting,
            generation: 0,
            muted: settings.start_muted,
            error: None,
            reject_fallback: None,
            start_when_settled: false,
            start_refused: false,
            settings,
        }
    }

    pub fn mount(&mut self) -> Vec<Command> {
        if self.status != PlaybackStatus::Idle {
            return Vec::new();
        }
        self.begin_loading()
    }

    pub fn handle(&mut self, event: PlayerEvent) -> Vec<Command> {
        if self.status == PlaybackStatus::Errored {
            return Vec::new();
        }

        match event {
            PlayerEvent::User(action) => {
                self.reject_fallback = None;
                self.on_user(action)
            }
            PlayerEvent::SlotReady { slot: SlotId::A, .. } => {
                if self.status == PlaybackStatus::Loading && !self.loading_phase.is_settled() {
                    self.loading_phase = LoadingPhase::Ready;
                    self.settle()
                } else {
                    Vec::new()
                }
            }
            PlayerEvent::LoadTimeout { generation } => {
                if self.status == PlaybackStatus::Loading
                    && generation == self.generation
                    && !self.loading_phase.is_settled()
                {
                    self.loading_phase = LoadingPhase::TimedOut;
                    warn!("Montage readiness timed out, proceeding");
                    self.settle()
                } else {
                    Vec::new()
                }
            }
            PlayerEvent::SlotEnded { slot: SlotId::A, .. } => {
                if self.status != PlaybackStatus::Playing {
                    return Vec::new();
                }
                self.reject_fallback = None;
                self.status = PlaybackStatus::Finished;
                info!("Montage finished");
                vec![Command::Pause(SlotId::A)]
            }
            PlayerEvent::PlayRejected { slot: SlotId::A, .. } => {
                if self.status == PlaybackStatus::Playing {
                    self.status = self.reject_fallback.take().unwrap_or(PlaybackStatus::Paused);
                    self.start_refused = self.status == PlaybackStatus::Loading;
                    debug!(status = %self.status, "montage play request rejected");
                }
                Vec::new()
            }
            PlayerEvent::SlotError { message, .. } => {
                warn!(error = %message, "Montage failed to load");
                self.status = PlaybackStatus::Errored;
                self.error = Some(message);
                vec![Command::Pause(SlotId::A)]
            }
            // Slot B is never assigned in montage mode
            _ => Vec::new(),
        }
    }

    fn begin_loading(&mut self) -> Vec<Command> {
        self.generation += 1;
        self.status = PlaybackStatus::Loading;
        self.loading_phase = LoadingPhase::Waiting;
        self.start_refused = false;
        info!(generation = self.generation, "Loading montage");
        vec![
            Command::Assign {
                slot: SlotId::A,
                clip_index: 0,
            },
            Command::Show(SlotId::A),
            Command::SetMuted(self.muted),
            Command::ArmLoadTimeout {
                generation: self.generation,
                after: self.settings.loading_timeout,
            },
        ]
    }

    fn on_user(&mut self, action: UserAction) -> Vec<Command> {
        match (action, self.status) {
            (UserAction::ToggleMute, _) => {
                self.muted = !self.muted;
                vec![Command::SetMuted(self.muted)]
            }
            (UserAction::Play | UserAction::Toggle, PlaybackStatus::Idle) => {
                self.start_when_settled = true;
                self.begin_loading()
            }
            (UserAction::Play | UserAction::Toggle, PlaybackStatus::Loading | PlaybackStatus::Paused) => {
                self.start()
            }
            (UserAction::Pause | UserAction::Toggle, PlaybackStatus::Playing) => {
                self.status = PlaybackStatus::Paused;
                vec![Command::Pause(SlotId::A)]
            }
            (UserAction::Play | UserAction::Toggle | UserAction::Replay, PlaybackStatus::Finished) => {
                self.start_when_settled = true;
                self.begin_loading()
            }
            _ => Vec::new(),
        }
    }

    fn settle(&mut self) -> Vec<Command> {
        if self.start_when_settled || self.settings.autoplay {
            self.start()
        } else {
            Vec::new()
        }
    }

    fn start(&mut self) -> Vec<Command> {
        self.reject_fallback = Some(self.status);
        self.status = PlaybackStatus::Playing;
        self.start_when_settled = false;
        self.start_refused = false;
        vec![Command::Play(SlotId::A)]
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn clip(&self) -> &ClipDescriptor {
        &self.clip
    }

    pub fn loading_phase(&self) -> LoadingPhase {
        self.loading_phase
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Same rule as the sequencer: timed out, refused, or nothing will start it
    pub fn awaits_user_start(&self) -> bool {
        if self.status != PlaybackStatus::Loading {
            return false;
        }
        match self.loading_phase {
            LoadingPhase::Waiting => false,
            LoadingPhase::TimedOut => true,
            LoadingPhase::Ready => {
                self.start_refused || !(self.settings.autoplay || self.start_when_settled)
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
