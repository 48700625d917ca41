//! How each kind of piece responds to the move protocol.
//!
//! When a piece tries to enter a cell, every occupant of that cell is asked
//! (bottom of the stack first) whether it lets the mover in. An occupant may
//! move itself out of the way first, through the same protocol, which is how
//! pushes cascade. See [`Level::move_piece`](crate::level::Level::move_piece).

use pushbox_grid::coordinate::{Coordinate, Direction};
use pushbox_grid::piece::{PieceId, PieceKind};

use crate::animator::LinearAnimation;
use crate::audio::Sound;
use crate::level::Level;
use crate::EngineError;

/// Per-kind reactions to the move protocol.
pub trait PieceBehaviour {
    /// Called on `me` when `mover` tries to enter `me`'s cell. Returns
    /// whether the mover may proceed.
    ///
    /// Anything this does through the level is rolled back if another
    /// occupant of the same cell later refuses.
    fn react_to_move(
        &self,
        level: &mut Level,
        me: PieceId,
        mover: PieceId,
    ) -> Result<bool, EngineError>;

    /// Called on `me` after it has been committed to `to`. Side effects
    /// registered here share the fate of the move.
    fn after_move(
        &self,
        _level: &mut Level,
        _me: PieceId,
        _from: Coordinate,
        _to: Coordinate,
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

/// The behaviour shared by every piece of `kind`.
pub fn behaviour_of(kind: PieceKind) -> &'static dyn PieceBehaviour {
    match kind {
        PieceKind::Floor => &Floor,
        PieceKind::Goal => &Goal,
        PieceKind::Wall => &Wall,
        PieceKind::Crate => &Crate,
        PieceKind::Player => &Player,
        PieceKind::Static => &Decoration,
    }
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Blocks everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wall;

impl PieceBehaviour for Wall {
    fn react_to_move(&self, _: &mut Level, _: PieceId, _: PieceId) -> Result<bool, EngineError> {
        Ok(false)
    }
}

/// Impassable scenery. Every `Static` piece is solid; there is no passable
/// variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoration;

impl PieceBehaviour for Decoration {
    fn react_to_move(&self, _: &mut Level, _: PieceId, _: PieceId) -> Result<bool, EngineError> {
        Ok(false)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Floor;

impl PieceBehaviour for Floor {
    fn react_to_move(&self, _: &mut Level, _: PieceId, _: PieceId) -> Result<bool, EngineError> {
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Goal;

impl PieceBehaviour for Goal {
    fn react_to_move(&self, _: &mut Level, _: PieceId, _: PieceId) -> Result<bool, EngineError> {
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Movers
// ---------------------------------------------------------------------------

/// Moves one cell further along the push, or refuses if it cannot.
///
/// Only a mover on a neighbouring cell can push; a jump or diagonal entry is
/// refused. The edge of the board counts as a wall.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crate;

impl PieceBehaviour for Crate {
    fn react_to_move(
        &self,
        level: &mut Level,
        me: PieceId,
        mover: PieceId,
    ) -> Result<bool, EngineError> {
        let grid = level.grid();
        let here = grid.coordinate_of(me)?;
        let pushed_from = grid.coordinate_of(mover)?;
        let Some(direction) = Direction::from_unit_offset(here - pushed_from) else {
            return Ok(false);
        };

        let next = direction.step(here);
        if !grid.contains(next) {
            return Ok(false);
        }
        level.move_piece(me, next)
    }

    fn after_move(
        &self,
        level: &mut Level,
        me: PieceId,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<(), EngineError> {
        let sound = if level.grid().has_kind_at(to, PieceKind::Goal)? {
            Sound::CrateOnGoal
        } else {
            Sound::CrateSlide
        };
        let config = level.config();
        let slide = LinearAnimation::new(from, to, config.walk_speed_ms, config.image_phase_ms, 1);

        let (board, log) = level.board_and_log();
        board.music.play(log, sound);
        board.animator.start(log, me, Box::new(slide));
        Ok(())
    }
}

/// Drives moves; can never be pushed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

impl PieceBehaviour for Player {
    fn react_to_move(&self, _: &mut Level, _: PieceId, _: PieceId) -> Result<bool, EngineError> {
        Ok(false)
    }

    fn after_move(
        &self,
        level: &mut Level,
        me: PieceId,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<(), EngineError> {
        let config = level.config();
        let walk = LinearAnimation::new(
            from,
            to,
            config.walk_speed_ms,
            config.image_phase_ms,
            config.player_frames,
        );

        let (board, log) = level.board_and_log();
        board.animator.start(log, me, Box::new(walk));
        Ok(())
    }
}

