//! Pushbox Engine -- the move protocol and game loop on top of the grid.
//!
//! This crate builds on [`pushbox_grid`] and [`pushbox_undo`] to provide the
//! playable core: pieces that react when something moves onto their cell, a
//! [`Level`](level::Level) that runs each move as a speculative cascade and
//! rolls it back atomically on rejection, and a per-frame
//! [`Session`](session::Session) driving input, undo/redo and win detection.
//!
//! Side effects the core triggers (sounds, animations) go through the same
//! [`CheckpointLog`](pushbox_undo::log::CheckpointLog) as grid changes, so a
//! rejected or undone move also silences and cancels them.
//!
//! # Quick Start
//!
//! ```
//! use pushbox_engine::prelude::*;
//!
//! let map = maps::by_name("tutorial").unwrap();
//! let mut session = Session::new(map, GameConfig::default()).unwrap();
//!
//! // One frame per step, each long enough for the previous walk to finish.
//! for _ in 0..6 {
//!     session.step(&InputFrame::press(Direction::Left), 300).unwrap();
//! }
//! assert!(session.is_won());
//! ```

#![deny(unsafe_code)]

pub mod animator;
pub mod audio;
pub mod behaviour;
pub mod board;
pub mod config;
pub mod input;
pub mod level;
pub mod maps;
pub mod replay;
pub mod session;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the grid crate for convenience.
pub use pushbox_grid;

/// Re-export the undo crate for convenience.
pub use pushbox_undo;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by the engine.
///
/// A rejected move is not an error: it is `Ok(false)` from
/// [`Level::move_piece`](level::Level::move_piece). Everything here is either
/// a bad level or config (surfaced at load time) or a caller bug.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Grid(#[from] pushbox_grid::GridError),

    #[error(transparent)]
    Undo(#[from] pushbox_undo::UndoError),

    #[error("invalid level: {0}")]
    Level(#[from] level::LevelError),

    #[error("invalid config: {0}")]
    Config(#[from] config::ConfigError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use pushbox_grid::prelude::*;
    pub use pushbox_undo::prelude::*;

    pub use crate::animator::{Animation, AnimationId, Animator, LinearAnimation};
    pub use crate::audio::{AudioSink, MusicPlayer, SilentSink, Sound, TracingSink};
    pub use crate::behaviour::{behaviour_of, PieceBehaviour};
    pub use crate::board::Board;
    pub use crate::config::{ConfigError, GameConfig};
    pub use crate::input::{InputFrame, KeyState};
    pub use crate::level::{Level, LevelError, LevelMap, LevelSnapshot};
    pub use crate::maps;
    pub use crate::replay::{
        replay, MoveRecorder, ReplayDivergence, ReplayEntry, ReplayLog, ReplayResult,
    };
    pub use crate::session::{Session, StepOutcome};
    pub use crate::EngineError;
}
