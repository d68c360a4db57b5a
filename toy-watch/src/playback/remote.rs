//! Remote renderer slots
//!
//! `RemoteSlot` implements `MediaSlot` for a renderer that lives elsewhere
//! (a browser page talking to the watch service). Every slot operation is
//! queued as a `RendererCommand` in an outbox shared by both slots, so the
//! renderer receives commands in exactly the order the player issued them.

use super::slot::{MediaSlot, SlotSource};
use std::sync::{Arc, Mutex};
use toy_common::api::RendererCommand;
use toy_common::SlotId;

/// Ordered command queue shared by the two remote slots of a session
#[derive(Debug, Clone, Default)]
pub struct RemoteOutbox {
    queue: Arc<Mutex<Vec<RendererCommand>>>,
}

impl RemoteOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: RendererCommand) {
        // A poisoned queue still holds valid commands
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.push(command);
    }

    /// Take every command queued since the last drain
    pub fn drain(&self) -> Vec<RendererCommand> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *queue)
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `MediaSlot` backend that forwards operations to a remote renderer
#[derive(Debug)]
pub struct RemoteSlot {
    slot: SlotId,
    outbox: RemoteOutbox,
}

impl RemoteSlot {
    pub fn new(slot: SlotId, outbox: RemoteOutbox) -> Self {
        Self { slot, outbox }
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

impl MediaSlot for RemoteSlot {
    fn load(&mut self, source: SlotSource<'_>) {
        self.outbox.push(RendererCommand::Load {
            slot: self.slot,
            url: source.url.to_string(),
            poster_url: source.poster_url.map(str::to_string),
        });
    }

    fn play(&mut self) {
        self.outbox.push(RendererCommand::Play { slot: self.slot });
    }

    fn pause(&mut self) {
        self.outbox.push(RendererCommand::Pause { slot: self.slot });
    }

    fn set_visible(&mut self, visible: bool) {
        let command = if visible {
            RendererCommand::Show { slot: self.slot }
        } else {
            RendererCommand::Hide { slot: self.slot }
        };
        self.outbox.push(command);
    }

    fn set_muted(&mut self, muted: bool) {
        self.outbox.push(RendererCommand::Mute {
            slot: self.slot,
            muted,
        });
    }

    fn release(&mut self) {
        self.outbox.push(RendererCommand::Release { slot: self.slot });
    }
}
