//! TOML-backed card catalog
//!
//! ```toml
//! [[cards]]
//! share_token = "abc123"
//! title = "Happy birthday!"
//! recipient_name = "Sam"
//! status = "published"
//! host_id = "p1"
//!
//! [[cards.clips]]
//! id = "c1"
//! media_url = "https://cdn.example/c1.mp4"
//! participant_id = "p1"
//! order_position = 0
//! ```
//!
//! URLs are taken as already resolved and directly playable.

use super::MediaResolver;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use toy_common::{CardSummary, ClipDescriptor, Error, ResolvedCard, ResolvedMedia, Result};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    Draft,
    Published,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogClip {
    #[serde(flatten)]
    pub clip: ClipDescriptor,
    #[serde(default)]
    pub participant_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCard {
    pub share_token: String,
    pub title: String,
    pub recipient_name: String,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub status: CardStatus,
    #[serde(default)]
    pub host_id: Option<String>,
    /// Legacy montage
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub clips: Vec<CatalogClip>,
}

#[derive(Debug, Deserialize, Default)]
struct CatalogFile {
    #[serde(default)]
    cards: Vec<CatalogCard>,
}

/// In-memory card catalog keyed by share token
#[derive(Debug, Default)]
pub struct CatalogResolver {
    cards: HashMap<String, CatalogCard>,
}

impl CatalogResolver {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog; share tokens must be unique
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut cards = HashMap::with_capacity(file.cards.len());
        for card in file.cards {
            let token = card.share_token.clone();
            if cards.insert(token.clone(), card).is_some() {
                return Err(Error::Config(format!(
                    "duplicate share_token '{}' in card catalog",
                    token
                )));
            }
        }
        Ok(Self { cards })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let resolver = Self::from_toml_str(&content)?;
        info!(path = %path.display(), cards = resolver.len(), "Loaded card catalog");
        Ok(resolver)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl MediaResolver for CatalogResolver {
    fn resolve(&self, share_token: &str) -> Option<ResolvedCard> {
        let Some(card) = self.cards.get(share_token) else {
            debug!(token = share_token, "unknown share token");
            return None;
        };
        if card.status != CardStatus::Published {
            debug!(token = share_token, "card not published");
            return None;
        }

        let mut clips: Vec<&CatalogClip> = card
            .clips
            .iter()
            .filter(|c| !c.clip.media_url.trim().is_empty())
            .collect();
        // Stable: equal positions keep catalog order
        clips.sort_by_key(|c| c.clip.order_position);

        let poster_url = poster_for(card.host_id.as_deref(), &clips);

        let media = match card.video_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => ResolvedMedia::Montage {
                video_url: url.to_string(),
            },
            _ if !clips.is_empty() => {
                ResolvedMedia::Clips {
                    clips: clips.iter().map(|c| c.clip.clone()).collect(),
                }
            }
            _ => {
                debug!(token = share_token, "card has no playable media");
                return None;
            }
        };

        Some(ResolvedCard {
            card: CardSummary {
                title: card.title.clone(),
                recipient_name: card.recipient_name.clone(),
                occasion: card.occasion.clone(),
            },
            media,
            poster_url,
        })
    }
}

/// Host participant's clip poster, else the first clip's by order
fn poster_for(host_id: Option<&str>, sorted: &[&CatalogClip]) -> Option<String> {
    let host_poster = host_id.and_then(|host| {
        sorted
            .iter()
            .find(|c| c.participant_id.as_deref() == Some(host))
            .and_then(|c| c.clip.poster_url.clone())
    });
    host_poster.or_else(|| sorted.first().and_then(|c| c.clip.poster_url.clone()))
}
