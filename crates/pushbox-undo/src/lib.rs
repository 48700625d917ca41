//! Pushbox Undo -- transactional undo/redo log with labelled checkpoints.
//!
//! The [`CheckpointLog`] is an append-only sequence of paired undo/redo
//! actions with a cursor separating the applied past from a redo-able future.
//! Named [`Label`]s remember interesting cursor positions so that many log
//! entries produced by one cascading operation can be undone or redone as a
//! single user-level step.
//!
//! Actions are values implementing [`Reversible`]. The log is generic over the
//! context type `C` the actions mutate; the context is passed in explicitly on
//! every replay, so the log never owns the state it protects.
//!
//! # Quick Start
//!
//! ```
//! use pushbox_undo::prelude::*;
//!
//! let mut witness: Vec<u32> = vec![1];
//! let mut log: CheckpointLog<Vec<u32>> = CheckpointLog::new();
//!
//! log.save_label("step");
//! witness.push(2);
//! log.register(Effect::new(|w: &mut Vec<u32>| { w.pop(); }, |w: &mut Vec<u32>| w.push(2)));
//! log.save_label("step");
//!
//! assert!(log.undo(&mut witness, "step"));
//! assert_eq!(witness, vec![1]);
//!
//! assert!(log.redo(&mut witness, "step"));
//! assert_eq!(witness, vec![1, 2]);
//! ```

#![deny(unsafe_code)]

pub mod action;
pub mod label;
pub mod log;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by explicit cursor moves on a [`CheckpointLog`].
///
/// These indicate a bug in the caller. Label-based undo/redo never produces
/// them: a missing label or an exhausted history is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UndoError {
    /// An undo target lies ahead of the cursor.
    #[error("cannot undo to index {target}: cursor is at {cursor}")]
    AheadOfCursor { target: usize, cursor: usize },

    /// A redo target lies behind the cursor.
    #[error("cannot redo to index {target}: cursor is at {cursor}")]
    BehindCursor { target: usize, cursor: usize },

    /// A redo target lies past the end of the recorded history.
    #[error("cannot redo to index {target}: history only holds {len} entries")]
    BeyondHistory { target: usize, len: usize },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::action::{Effect, Reversible};
    pub use crate::label::Label;
    pub use crate::log::CheckpointLog;
    pub use crate::UndoError;
}
