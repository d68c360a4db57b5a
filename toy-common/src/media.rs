//! Media resolution results
//!
//! A share token resolves to a card plus its playable media: either an
//! ordered clip list or a single legacy montage video. "Not found" is
//! represented by the absence of a `ResolvedCard`.

use crate::clip::{sort_by_order_position, ClipDescriptor};
use serde::{Deserialize, Serialize};

/// Presentational card data shown around the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub title: String,
    pub recipient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

/// Playable media for one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedMedia {
    /// Ordered clips for sequential playback
    Clips { clips: Vec<ClipDescriptor> },
    /// Legacy pre-combined video
    Montage { video_url: String },
}

impl ResolvedMedia {
    /// Build a clip list, sorted by order position
    pub fn clips(mut clips: Vec<ClipDescriptor>) -> Self {
        sort_by_order_position(&mut clips);
        ResolvedMedia::Clips { clips }
    }

    /// Number of playable items (a montage counts as one)
    pub fn item_count(&self) -> usize {
        match self {
            ResolvedMedia::Clips { clips } => clips.len(),
            ResolvedMedia::Montage { .. } => 1,
        }
    }
}

/// Output of the media source resolver for a published card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCard {
    pub card: CardSummary,
    pub media: ResolvedMedia,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}
