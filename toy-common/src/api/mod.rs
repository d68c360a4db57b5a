//! Shared API types
//!
//! Wire types exchanged between the watch service and remote renderers.

pub mod types;

pub use types::{ActionRequest, ErrorResponse, MediaReport, RendererCommand, SignalKind, UserAction};
