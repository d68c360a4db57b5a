//! # TOY Watch Service Library (toy-watch)
//!
//! Double-buffered sequential playback of contributor clips for the TOY
//! watch page.
//!
//! **Purpose:** Resolve a share token to a card's clips (or its legacy
//! montage), run the playback state machine for each viewer session, and
//! drive the page's two video elements over HTTP/SSE.
//!
//! **Architecture:** Buffer Manager (two media slots) + Playback Sequencer
//! (pure FSM) + Overlay Presenter, wired by `playback::Player`.

pub mod api;
pub mod config;
pub mod error;
pub mod playback;
pub mod resolver;
pub mod session;
pub mod state;

pub use error::{Error, Result};
pub use state::SharedState;
