//! Buffer Manager
//!
//! Owns the two rendering slots (A and B) of a player session and mediates
//! which one is visible and which one is preloading.
//!
//! **Responsibilities:**
//! - Bind a slot to a clip source and start loading it (never playing it)
//! - Forward play/pause/visibility/mute commands to the slot backends
//! - Turn raw backend signals into one-shot-per-clip notifications
//! - Release every engaged backend exactly once, on every exit path
//!
//! A slot that has never been assigned a clip is never sent any command, so a
//! single-clip or montage session leaves slot B untouched.
//!
//! Only the player engine drives this type; overlay code never touches slots.

use super::slot::{MediaSlot, SlotSignal, SlotSource};
use toy_common::{ClipDescriptor, SlotId};
use tracing::{debug, info, warn};

/// Payload delivered to slot callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotNotice {
    pub slot: SlotId,
    /// Clip index the slot was assigned when the signal arrived
    pub clip_index: usize,
    /// Error detail for error notifications
    pub message: Option<String>,
}

/// Callback registered through `on_ready` / `on_ended` / `on_error` / `on_play_rejected`
pub type SlotCallback = Box<dyn FnMut(SlotNotice) + Send>;

#[derive(Default)]
struct SlotHandlers {
    ready: Option<SlotCallback>,
    ended: Option<SlotCallback>,
    error: Option<SlotCallback>,
    play_rejected: Option<SlotCallback>,
}

/// Wrapper for a backend with its assignment bookkeeping
struct ManagedSlot<S> {
    backend: S,

    /// Clip index currently bound to this slot
    assigned: Option<usize>,

    /// Number of assignments since mount
    assignments: usize,

    /// Assigned at least once; only engaged backends receive commands
    engaged: bool,

    playing: bool,

    /// One-shot guards, reset on every assignment
    ready_notified: bool,
    ended_notified: bool,
    error_notified: bool,

    handlers: SlotHandlers,
}

impl<S: MediaSlot> ManagedSlot<S> {
    fn new(backend: S) -> Self {
        Self {
            backend,
            assigned: None,
            assignments: 0,
            engaged: false,
            playing: false,
            ready_notified: false,
            ended_notified: false,
            error_notified: false,
            handlers: SlotHandlers::default(),
        }
    }
}

/// Manages the A/B slot pair of one player session
pub struct BufferManager<S: MediaSlot> {
    a: ManagedSlot<S>,
    b: ManagedSlot<S>,
    visible: Option<SlotId>,
    /// Last mute flag applied, replayed onto a slot on its first assignment
    muted: Option<bool>,
    released: bool,
}

impl<S: MediaSlot> BufferManager<S> {
    /// Create a buffer manager owning the two backends
    pub fn new(a: S, b: S) -> Self {
        Self {
            a: ManagedSlot::new(a),
            b: ManagedSlot::new(b),
            visible: None,
            muted: None,
            released: false,
        }
    }

    fn slot(&self, slot: SlotId) -> &ManagedSlot<S> {
        match slot {
            SlotId::A => &self.a,
            SlotId::B => &self.b,
        }
    }

    fn slot_mut(&mut self, slot: SlotId) -> &mut ManagedSlot<S> {
        match slot {
            SlotId::A => &mut self.a,
            SlotId::B => &mut self.b,
        }
    }

    /// Bind `slot` to `clip` and begin loading it
    ///
    /// Does not start playback. Any pending notifications for the previous
    /// source are discarded: the one-shot guards are re-armed for the new clip.
    pub fn assign(
        &mut self,
        slot: SlotId,
        clip_index: usize,
        clip: &ClipDescriptor,
        poster_url: Option<&str>,
    ) {
        if self.released {
            warn!(slot = %slot, "assign after release ignored");
            return;
        }

        let hidden = self.visible == Some(slot.other());
        let muted = self.muted;
        let managed = self.slot_mut(slot);
        let first_use = !managed.engaged;
        managed.engaged = true;
        managed.assigned = Some(clip_index);
        managed.assignments += 1;
        managed.playing = false;
        managed.ready_notified = false;
        managed.ended_notified = false;
        managed.error_notified = false;
        managed.backend.load(SlotSource {
            url: &clip.media_url,
            poster_url,
        });

        // Catch a late first assignment up with the pair's presentation state
        if first_use {
            if hidden {
                managed.backend.set_visible(false);
            }
            if let Some(muted) = muted {
                managed.backend.set_muted(muted);
            }
        }

        debug!(
            slot = %slot,
            clip_index = clip_index,
            clip_id = %clip.id,
            "Assigned clip to slot"
        );
    }

    /// Start playback on `slot`; no-op without an assigned source
    pub fn play(&mut self, slot: SlotId) {
        if self.released {
            return;
        }
        let managed = self.slot_mut(slot);
        if managed.assigned.is_none() {
            debug!(slot = %slot, "play on empty slot ignored");
            return;
        }
        managed.playing = true;
        managed.backend.play();
    }

    /// Pause playback on `slot`; no-op without an assigned source
    pub fn pause(&mut self, slot: SlotId) {
        if self.released {
            return;
        }
        let managed = self.slot_mut(slot);
        if managed.assigned.is_none() {
            return;
        }
        managed.playing = false;
        managed.backend.pause();
    }

    /// Make `slot` visible and hide the other one if it was ever engaged
    pub fn set_visible(&mut self, slot: SlotId) {
        if self.released {
            return;
        }
        self.slot_mut(slot).backend.set_visible(true);
        let other = self.slot_mut(slot.other());
        if other.engaged {
            other.backend.set_visible(false);
        }
        self.visible = Some(slot);
    }

    /// Apply the mute flag to every engaged slot
    pub fn set_muted(&mut self, muted: bool) {
        if self.released {
            return;
        }
        self.muted = Some(muted);
        for managed in [&mut self.a, &mut self.b] {
            if managed.engaged {
                managed.backend.set_muted(muted);
            }
        }
    }

    /// Register the load-complete notification for `slot`
    pub fn on_ready(&mut self, slot: SlotId, callback: SlotCallback) {
        self.slot_mut(slot).handlers.ready = Some(callback);
    }

    /// Register the natural-completion notification for `slot`
    ///
    /// Fires at most once per assigned clip.
    pub fn on_ended(&mut self, slot: SlotId, callback: SlotCallback) {
        self.slot_mut(slot).handlers.ended = Some(callback);
    }

    /// Register the load/playback failure notification for `slot`
    pub fn on_error(&mut self, slot: SlotId, callback: SlotCallback) {
        self.slot_mut(slot).handlers.error = Some(callback);
    }

    /// Register the refused-play notification for `slot`
    pub fn on_play_rejected(&mut self, slot: SlotId, callback: SlotCallback) {
        self.slot_mut(slot).handlers.play_rejected = Some(callback);
    }

    /// Route a backend signal to the registered callback
    ///
    /// Signals from a slot with no source, signals after release and repeats
    /// of an already-delivered one-shot signal are dropped.
    pub fn dispatch(&mut self, slot: SlotId, signal: SlotSignal) {
        if self.released {
            debug!(slot = %slot, signal = signal.name(), "signal after release dropped");
            return;
        }

        let managed = self.slot_mut(slot);
        let Some(clip_index) = managed.assigned else {
            debug!(slot = %slot, signal = signal.name(), "signal from unassigned slot dropped");
            return;
        };

        let (callback, message) = match signal {
            SlotSignal::Ready => {
                if managed.ready_notified {
                    return;
                }
                managed.ready_notified = true;
                (managed.handlers.ready.as_mut(), None)
            }
            SlotSignal::Ended => {
                if managed.ended_notified {
                    debug!(slot = %slot, clip_index = clip_index, "duplicate ended dropped");
                    return;
                }
                managed.ended_notified = true;
                managed.playing = false;
                (managed.handlers.ended.as_mut(), None)
            }
            SlotSignal::Error(message) => {
                if managed.error_notified {
                    return;
                }
                managed.error_notified = true;
                managed.playing = false;
                (managed.handlers.error.as_mut(), Some(message))
            }
            SlotSignal::PlayRejected => {
                managed.playing = false;
                (managed.handlers.play_rejected.as_mut(), None)
            }
        };

        if let Some(callback) = callback {
            (*callback)(SlotNotice {
                slot,
                clip_index,
                message,
            });
        }
    }

    /// Clip index bound to `slot`
    pub fn assigned(&self, slot: SlotId) -> Option<usize> {
        self.slot(slot).assigned
    }

    /// How many times `slot` has been assigned since mount
    pub fn assignment_count(&self, slot: SlotId) -> usize {
        self.slot(slot).assignments
    }

    /// Whether `slot` has ever been assigned a clip
    pub fn is_engaged(&self, slot: SlotId) -> bool {
        self.slot(slot).engaged
    }

    pub fn is_playing(&self, slot: SlotId) -> bool {
        self.slot(slot).playing
    }

    /// Currently visible slot, if any was shown yet
    pub fn visible(&self) -> Option<SlotId> {
        self.visible
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Backend behind `slot`
    pub fn backend(&self, slot: SlotId) -> &S {
        &self.slot(slot).backend
    }

    /// Release every engaged backend and detach all callbacks
    ///
    /// Idempotent; also runs on drop.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for slot in [SlotId::A, SlotId::B] {
            let managed = self.slot_mut(slot);
            if managed.engaged {
                managed.backend.pause();
                managed.backend.release();
            }
            managed.handlers = SlotHandlers::default();
            managed.assigned = None;
            managed.playing = false;
        }
        self.visible = None;

        info!(
            slot_a = self.a.engaged,
            slot_b = self.b.engaged,
            "Released media slots"
        );
    }
}

impl<S: MediaSlot> Drop for BufferManager<S> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::remote::{RemoteOutbox, RemoteSlot};
    use std::sync::{Arc, Mutex};
    use toy_common::api::RendererCommand;

    fn manager() -> (BufferManager<RemoteSlot>, RemoteOutbox) {
        let outbox = RemoteOutbox::new();
        let manager = BufferManager::new(
            RemoteSlot::new(SlotId::A, outbox.clone()),
            RemoteSlot::new(SlotId::B, outbox.clone()),
        );
        (manager, outbox)
    }

    fn clip(id: &str) -> ClipDescriptor {
        ClipDescriptor::new(id, format!("{}.mp4", id))
    }

    fn recorder() -> (SlotCallback, Arc<Mutex<Vec<SlotNotice>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: SlotCallback = Box::new(move |notice: SlotNotice| sink.lock().unwrap().push(notice));
        (callback, seen)
    }

    #[test]
    fn test_assign_loads_without_playing() {
        let (mut manager, outbox) = manager();

        manager.assign(SlotId::A, 0, &clip("a"), Some("poster.jpg"));

        assert_eq!(manager.assigned(SlotId::A), Some(0));
        assert!(!manager.is_playing(SlotId::A));
        assert_eq!(
            outbox.drain(),
            vec![RendererCommand::Load {
                slot: SlotId::A,
                url: "a.mp4".to_string(),
                poster_url: Some("poster.jpg".to_string()),
            }]
        );
    }

    #[test]
    fn test_play_on_empty_slot_is_noop() {
        let (mut manager, outbox) = manager();

        manager.play(SlotId::B);
        manager.pause(SlotId::B);

        assert!(!manager.is_playing(SlotId::B));
        assert!(outbox.drain().is_empty());
    }

    #[test]
    fn test_set_visible_hides_other_slot() {
        let (mut manager, outbox) = manager();
        manager.assign(SlotId::A, 0, &clip("a"), None);
        manager.assign(SlotId::B, 1, &clip("b"), None);
        outbox.drain();

        manager.set_visible(SlotId::B);

        assert_eq!(manager.visible(), Some(SlotId::B));
        assert_eq!(
            outbox.drain(),
            vec![
                RendererCommand::Show { slot: SlotId::B },
                RendererCommand::Hide { slot: SlotId::A },
            ]
        );
    }

    #[test]
    fn test_ended_fires_once_per_clip() {
        let (mut manager, _outbox) = manager();
        let (callback, seen) = recorder();
        manager.on_ended(SlotId::A, callback);

        manager.assign(SlotId::A, 0, &clip("a"), None);
        manager.play(SlotId::A);
        manager.dispatch(SlotId::A, SlotSignal::Ended);
        manager.dispatch(SlotId::A, SlotSignal::Ended);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!manager.is_playing(SlotId::A));

        // Reassignment re-arms the notification for the new clip
        manager.assign(SlotId::A, 2, &clip("c"), None);
        manager.dispatch(SlotId::A, SlotSignal::Ended);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].clip_index, 2);
    }

    #[test]
    fn test_signal_from_unassigned_slot_dropped() {
        let (mut manager, _outbox) = manager();
        let (callback, seen) = recorder();
        manager.on_ready(SlotId::B, callback);

        manager.dispatch(SlotId::B, SlotSignal::Ready);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_error_carries_message() {
        let (mut manager, _outbox) = manager();
        let (callback, seen) = recorder();
        manager.on_error(SlotId::A, callback);

        manager.assign(SlotId::A, 0, &clip("a"), None);
        manager.dispatch(SlotId::A, SlotSignal::Error("decode failed".to_string()));

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].message.as_deref(), Some("decode failed"));
    }

    #[test]
    fn test_release_is_idempotent_and_detaches_callbacks() {
        let (mut manager, outbox) = manager();
        let (callback, seen) = recorder();
        manager.on_ended(SlotId::A, callback);
        manager.assign(SlotId::A, 0, &clip("a"), None);
        outbox.drain();

        manager.release();
        manager.release();
        manager.dispatch(SlotId::A, SlotSignal::Ended);
        manager.play(SlotId::A);

        assert!(manager.is_released());
        assert!(seen.lock().unwrap().is_empty());
        let releases = outbox
            .drain()
            .into_iter()
            .filter(|cmd| matches!(cmd, RendererCommand::Release { .. }))
            .count();
        assert_eq!(releases, 1);
    }

    #[test]
    fn test_drop_releases_backends() {
        let (mut manager, outbox) = manager();
        manager.assign(SlotId::A, 0, &clip("a"), None);
        manager.assign(SlotId::B, 1, &clip("b"), None);
        drop(manager);

        let commands = outbox.drain();
        assert!(commands.contains(&RendererCommand::Release { slot: SlotId::A }));
        assert!(commands.contains(&RendererCommand::Release { slot: SlotId::B }));
    }

    #[test]
    fn test_unassigned_slot_receives_no_commands() {
        let (mut manager, outbox) = manager();

        manager.assign(SlotId::A, 0, &clip("only"), None);
        manager.set_visible(SlotId::A);
        manager.set_muted(true);
        manager.pause(SlotId::B);
        manager.release();

        assert!(!manager.is_engaged(SlotId::B));
        let touched_b: Vec<_> = outbox
            .drain()
            .into_iter()
            .filter(|cmd| cmd.slot() == SlotId::B)
            .collect();
        assert!(touched_b.is_empty(), "slot B commands: {:?}", touched_b);
    }

    #[test]
    fn test_first_assignment_catches_up_with_presentation() {
        let (mut manager, outbox) = manager();
        manager.assign(SlotId::A, 0, &clip("a"), None);
        manager.set_visible(SlotId::A);
        manager.set_muted(true);
        outbox.drain();

        manager.assign(SlotId::B, 1, &clip("b"), None);

        assert_eq!(
            outbox.drain(),
            vec![
                RendererCommand::Load {
                    slot: SlotId::B,
                    url: "b.mp4".to_string(),
                    poster_url: None,
                },
                RendererCommand::Hide { slot: SlotId::B },
                RendererCommand::Mute {
                    slot: SlotId::B,
                    muted: true,
                },
            ]
        );
    }
}
