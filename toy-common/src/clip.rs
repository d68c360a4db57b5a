//! Clip descriptors
//!
//! A clip is one short video segment contributed by one participant. The
//! ordered list of clips for a watch session is fixed once it is handed to
//! the player.

use serde::{Deserialize, Serialize};

/// Immutable description of one playable clip.
///
/// `media_url` is already resolved and directly playable; it is typically
/// time-limited, so a session that outlives it surfaces as a playback error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// Unique identifier, stable across a session
    pub id: String,

    /// Playable (possibly signed) media URL
    pub media_url: String,

    /// Preview image, only meaningful for the first clip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_avatar_url: Option<String>,

    /// Advisory only; the true duration is discovered at load time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,

    /// Ordinal used to sort the sequence before playback
    #[serde(default)]
    pub order_position: i64,
}

impl ClipDescriptor {
    /// Create a descriptor with only the required fields set
    pub fn new(id: impl Into<String>, media_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_url: media_url.into(),
            poster_url: None,
            contributor_name: None,
            contributor_avatar_url: None,
            duration_seconds: None,
            order_position: 0,
        }
    }

    /// Builder-style setter for the ordinal
    pub fn with_order(mut self, order_position: i64) -> Self {
        self.order_position = order_position;
        self
    }

    /// Builder-style setter for the contributor display name
    pub fn with_contributor(mut self, name: impl Into<String>) -> Self {
        self.contributor_name = Some(name.into());
        self
    }

    /// Builder-style setter for the contributor avatar
    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.contributor_avatar_url = Some(avatar_url.into());
        self
    }

    /// Builder-style setter for the poster image
    pub fn with_poster(mut self, poster_url: impl Into<String>) -> Self {
        self.poster_url = Some(poster_url.into());
        self
    }
}

/// Sort clips ascending by `order_position`.
///
/// The sort is stable: clips sharing an ordinal keep the order they were
/// supplied in.
pub fn sort_by_order_position(clips: &mut [ClipDescriptor]) {
    clips.sort_by_key(|clip| clip.order_position);
}
