//! HTTP API for watch sessions
//!
//! Page metadata, session lifecycle, renderer signal intake and the SSE
//! event stream.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
