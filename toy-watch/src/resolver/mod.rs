//! Media Source Resolver
//!
//! Turns an opaque share token into playable media. Resolution happens
//! before any player exists: "not found" means no session is mounted.

pub mod catalog;

pub use catalog::CatalogResolver;

use toy_common::ResolvedCard;

/// Resolves share tokens to published cards with playable media
pub trait MediaResolver: Send + Sync {
    /// `None` when the card is missing, unpublished or has nothing playable
    fn resolve(&self, share_token: &str) -> Option<ResolvedCard>;
}
