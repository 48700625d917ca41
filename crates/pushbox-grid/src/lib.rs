//! Pushbox Grid -- bounded 2D spatial index of game pieces.
//!
//! The [`Grid`](grid::Grid) maps every coordinate to an ordered stack of
//! [`PieceId`](piece::PieceId)s, keeps a reverse index from piece to its one
//! current coordinate, and a kind index answering "all crates" or "all
//! players". Pieces live in a grid-owned arena and never store their own
//! position.
//!
//! Every placement change is recorded in a
//! [`CheckpointLog`](pushbox_undo::log::CheckpointLog) as a
//! [`GridChange`](change::GridChange), so a sequence of moves can be rolled
//! back exactly.
//!
//! # Quick Start
//!
//! ```
//! use pushbox_grid::prelude::*;
//! use pushbox_undo::prelude::*;
//!
//! let mut grid = Grid::new(5, 3).unwrap();
//! let mut log: CheckpointLog<Grid> = CheckpointLog::new();
//!
//! let crate_piece = grid.spawn(PieceKind::Crate);
//! grid.add_piece(&mut log, crate_piece, Coordinate::new(1, 1)).unwrap();
//! grid.move_piece(&mut log, crate_piece, Coordinate::new(2, 1)).unwrap();
//! assert_eq!(grid.coordinate_of(crate_piece).unwrap(), Coordinate::new(2, 1));
//!
//! log.undo_to_index(&mut grid, 1).unwrap();
//! assert_eq!(grid.coordinate_of(crate_piece).unwrap(), Coordinate::new(1, 1));
//! ```

#![deny(unsafe_code)]

pub mod change;
pub mod coordinate;
pub mod grid;
pub mod piece;
pub mod snapshot;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by grid operations.
///
/// All of these indicate a caller bug: an address outside the board or a
/// stale piece handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A coordinate lies outside `[0, width) x [0, height)`.
    #[error("coordinate {coordinate} out of range for a {width}x{height} grid")]
    OutOfRange {
        coordinate: coordinate::Coordinate,
        width: u32,
        height: u32,
    },

    /// The piece exists but is not currently placed on the grid.
    #[error("piece {piece} is not on the grid")]
    Detached { piece: piece::PieceId },

    /// The piece handle was never allocated by this grid.
    #[error("piece {piece} was not spawned by this grid")]
    UnknownPiece { piece: piece::PieceId },

    /// A grid needs at least one row and one column.
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::change::GridChange;
    pub use crate::coordinate::{Coordinate, Direction};
    pub use crate::grid::Grid;
    pub use crate::piece::{PieceId, PieceKind};
    pub use crate::snapshot::GridSnapshot;
    pub use crate::GridError;
}
