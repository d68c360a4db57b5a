//! Double-buffered sequential clip playback
//!
//! - `slot`: media slot capability
//! - `buffer_manager`: owns slots A and B
//! - `sequencer`: playback state machine for clip lists
//! - `montage`: single-buffer player for legacy combined videos
//! - `overlay`: overlay presenter
//! - `engine`: wires the above into one mounted player

pub mod buffer_manager;
pub mod engine;
pub mod events;
pub mod montage;
pub mod overlay;
pub mod remote;
pub mod sequencer;
pub mod slot;

pub use buffer_manager::BufferManager;
pub use engine::{LoadTimer, MountRequest, Player, PlayerMode, PlayerSnapshot};
pub use events::{Command, LoadingPhase, PlayerEvent};
pub use overlay::Overlay;
pub use remote::{RemoteOutbox, RemoteSlot};
pub use sequencer::Sequencer;
pub use slot::{MediaSlot, SlotSignal};
