//! Everything a level's undo history can touch.
//!
//! The [`Board`] is the context type of a level's
//! [`CheckpointLog`]: grid placement, player facing, running animations and
//! playing sounds. Each part is reachable through `AsMut`, so grid changes,
//! animation cancels and sound stops registered by their own modules can
//! all be replayed against the one board.

use std::collections::{BTreeMap, HashMap};

use pushbox_grid::coordinate::Direction;
use pushbox_grid::grid::Grid;
use pushbox_grid::piece::PieceId;
use pushbox_undo::action::Reversible;
use pushbox_undo::log::CheckpointLog;

use crate::animator::Animator;
use crate::audio::MusicPlayer;

/// Direction a player faces before it has ever moved.
pub const DEFAULT_FACING: Direction = Direction::Left;

/// The undoable state of one level.
#[derive(Debug)]
pub struct Board {
    pub grid: Grid,
    pub animator: Animator,
    pub music: MusicPlayer,
    facing: HashMap<PieceId, Direction>,
}

impl Board {
    pub fn new(grid: Grid, music: MusicPlayer) -> Self {
        Self {
            grid,
            animator: Animator::new(),
            music,
            facing: HashMap::new(),
        }
    }

    /// The direction `piece` faces.
    pub fn facing(&self, piece: PieceId) -> Direction {
        self.facing.get(&piece).copied().unwrap_or(DEFAULT_FACING)
    }

    /// Every recorded facing, in piece order.
    pub fn facings(&self) -> BTreeMap<PieceId, Direction> {
        self.facing.iter().map(|(&p, &d)| (p, d)).collect()
    }

    /// Turn `piece` towards `direction`, logging the change.
    ///
    /// Turning to the current facing registers nothing.
    pub fn turn(&mut self, log: &mut CheckpointLog<Board>, piece: PieceId, direction: Direction) {
        let before = self.facing(piece);
        if before == direction {
            return;
        }
        self.facing.insert(piece, direction);
        log.register(Turn {
            piece,
            before,
            after: direction,
        });
    }

    /// Set a facing without logging. Used while a level is being built.
    pub(crate) fn set_facing(&mut self, piece: PieceId, direction: Direction) {
        self.facing.insert(piece, direction);
    }
}

impl AsMut<Grid> for Board {
    fn as_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}

impl AsMut<Animator> for Board {
    fn as_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }
}

impl AsMut<MusicPlayer> for Board {
    fn as_mut(&mut self) -> &mut MusicPlayer {
        &mut self.music
    }
}

/// A logged change of facing.
#[derive(Debug, Clone, Copy)]
struct Turn {
    piece: PieceId,
    before: Direction,
    after: Direction,
}

impl Reversible<Board> for Turn {
    fn undo(&self, board: &mut Board) {
        board.set_facing(self.piece, self.before);
    }

    fn redo(&self, board: &mut Board) {
        board.set_facing(self.piece, self.after);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
