//! # TOY Common Library
//!
//! Shared code for the TOY watch service and its renderers:
//! - Clip and card data model (`ClipDescriptor`, `ResolvedCard`)
//! - Playback status and buffer slot identifiers
//! - Event types broadcast to observers (`WatchEvent`)
//! - Renderer wire types (`RendererCommand`)
//! - Bootstrap configuration loading

pub mod api;
pub mod clip;
pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod playback;

pub use clip::ClipDescriptor;
pub use error::{Error, Result};
pub use media::{CardSummary, ResolvedCard, ResolvedMedia};
pub use playback::{PlaybackStatus, SlotId};
