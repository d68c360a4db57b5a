//! Overlay Presenter
//!
//! Pure projection of player state onto what the viewer should see on top of
//! the video: contributor badge, progress dots, watermark, the play/replay
//! button, mute control, poster and error text. Never touches slots and
//! never mutates the sequencer.

use serde::Serialize;
use toy_common::{ClipDescriptor, PlaybackStatus};

/// Static error text shown once a session is `Errored`
pub const ERROR_MESSAGE: &str = "Unable to load video. Please try refreshing the page.";

/// Notice shown when a card has neither clips nor a montage
pub const NO_CONTENT_MESSAGE: &str = "no playable content";

/// Read-only view of player state the overlay is computed from
#[derive(Debug, Clone, Copy)]
pub struct PlaybackView<'a> {
    pub status: PlaybackStatus,
    /// Loading can only proceed by an explicit start: the bounded wait
    /// elapsed without readiness, or an automatic start was refused
    pub awaiting_start: bool,
    /// Empty in montage mode: no badge, no progress
    pub clips: &'a [ClipDescriptor],
    pub current_index: Option<usize>,
    pub muted: bool,
    pub poster_url: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Avatar {
    Image(String),
    /// First letter of the contributor name, uppercased
    Initial(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorBadge {
    /// Clip index; changes exactly when the badge should re-animate
    pub key: usize,
    pub name: Option<String>,
    pub avatar: Avatar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub current: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayButton {
    Play,
    Replay,
}

/// Renderable overlay data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Overlay {
    pub contributor: Option<ContributorBadge>,
    pub progress: Option<Progress>,
    pub watermark: bool,
    pub button: Option<PlayButton>,
    pub muted: bool,
    pub poster_url: Option<String>,
    pub error_message: Option<String>,
    pub notice: Option<String>,
}

impl Overlay {
    /// Overlay for a card with nothing to play
    pub fn no_content() -> Self {
        Self {
            notice: Some(NO_CONTENT_MESSAGE.to_string()),
            ..Self::default()
        }
    }
}

/// Compute the overlay for `view`
pub fn present(view: &PlaybackView<'_>) -> Overlay {
    let engaged = view.status.is_engaged();

    let contributor = if engaged {
        view.current_index
            .and_then(|index| view.clips.get(index).map(|clip| (index, clip)))
            .and_then(|(index, clip)| badge(index, clip))
    } else {
        None
    };

    let progress = match view.current_index {
        Some(current) if engaged && view.clips.len() > 1 => Some(Progress {
            total: view.clips.len(),
            current,
        }),
        _ => None,
    };

    let button = match view.status {
        PlaybackStatus::Idle | PlaybackStatus::Paused => Some(PlayButton::Play),
        PlaybackStatus::Loading if view.awaiting_start => Some(PlayButton::Play),
        PlaybackStatus::Finished => Some(PlayButton::Replay),
        _ => None,
    };

    let poster_url = match view.status {
        PlaybackStatus::Idle | PlaybackStatus::Loading => view.poster_url.map(str::to_string),
        _ => None,
    };

    let error_message =
        (view.status == PlaybackStatus::Errored).then(|| ERROR_MESSAGE.to_string());

    Overlay {
        contributor,
        progress,
        watermark: view.status == PlaybackStatus::Playing,
        button,
        muted: view.muted,
        poster_url,
        error_message,
        notice: None,
    }
}

fn badge(index: usize, clip: &ClipDescriptor) -> Option<ContributorBadge> {
    if clip.contributor_name.is_none() && clip.contributor_avatar_url.is_none() {
        return None;
    }

    let avatar = match &clip.contributor_avatar_url {
        Some(url) => Avatar::Image(url.clone()),
        None => Avatar::Initial(initial(clip.contributor_name.as_deref())),
    };

    Some(ContributorBadge {
        key: index,
        name: clip.contributor_name.clone(),
        avatar,
    })
}

fn initial(name: Option<&str>) -> char {
    name.and_then(|n| n.trim().chars().next())
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?')
}
