//! Media slot capability
//!
//! A slot is one video-rendering resource. Any environment's native media
//! element can sit behind `MediaSlot`: a browser `<video>` driven remotely,
//! a native player, or a recording fake in tests. Backends never decide
//! anything on their own; the buffer manager tells them what to do and they
//! report what happened as `SlotSignal`s.

/// Source handed to a slot on assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSource<'a> {
    pub url: &'a str,
    pub poster_url: Option<&'a str>,
}

/// Backend operations for one rendering resource
pub trait MediaSlot: Send {
    /// Point the resource at `source` and begin loading. Must not start playback.
    fn load(&mut self, source: SlotSource<'_>);

    /// Start or resume playback from the current position
    fn play(&mut self);

    fn pause(&mut self);

    /// Presentational only; independent of play/pause state
    fn set_visible(&mut self, visible: bool);

    fn set_muted(&mut self, muted: bool);

    /// Stop playback, detach listeners and free decode resources
    fn release(&mut self);
}

/// Signals a backend reports for its current source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotSignal {
    /// Loaded enough to start playing
    Ready,
    /// Reached the natural end of the media
    Ended,
    /// Load or decode failure
    Error(String),
    /// A play request was refused or interrupted
    PlayRejected,
}

impl SlotSignal {
    pub fn name(&self) -> &'static str {
        match self {
            SlotSignal::Ready => "ready",
            SlotSignal::Ended => "ended",
            SlotSignal::Error(_) => "error",
            SlotSignal::PlayRejected => "play_rejected",
        }
    }
}
