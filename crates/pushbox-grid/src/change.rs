//! Placement changes recorded in the checkpoint log.
//!
//! Grid mutations are logged as small tagged commands rather than closures,
//! which keeps the history inspectable and lets one log drive any context
//! that can lend out its grid through [`AsMut<Grid>`].

use pushbox_undo::action::Reversible;
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::grid::Grid;
use crate::piece::PieceId;

/// One placement change on a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridChange {
    /// `piece` was pushed on top of the stack at `at`.
    Added { piece: PieceId, at: Coordinate },
    /// `piece` was taken out of the stack at `from`, where it sat at
    /// position `index` (0 = bottom).
    Removed {
        piece: PieceId,
        from: Coordinate,
        index: usize,
    },
}

impl GridChange {
    /// The piece this change concerns.
    pub fn piece(&self) -> PieceId {
        match *self {
            GridChange::Added { piece, .. } | GridChange::Removed { piece, .. } => piece,
        }
    }
}

impl<C> Reversible<C> for GridChange
where
    C: AsMut<Grid> + ?Sized,
{
    fn undo(&self, ctx: &mut C) {
        let grid = ctx.as_mut();
        match *self {
            GridChange::Added { piece, .. } => {
                grid.detach(piece);
            }
            GridChange::Removed { piece, from, index } => grid.attach(piece, from, Some(index)),
        }
    }

    fn redo(&self, ctx: &mut C) {
        let grid = ctx.as_mut();
        match *self {
            GridChange::Added { piece, at } => grid.attach(piece, at, None),
            GridChange::Removed { piece, .. } => {
                grid.detach(piece);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;

    #[test]
    fn added_undo_detaches_and_redo_reattaches() {
        let mut grid = Grid::new(3, 3).unwrap();
        let p = grid.spawn(PieceKind::Player);
        let at = Coordinate::new(2, 1);
        grid.attach(p, at, None);

        let change = GridChange::Added { piece: p, at };
        change.undo(&mut grid);
        assert!(!grid.is_placed(p));
        assert!(grid.pieces_of_kind(PieceKind::Player).is_empty());

        change.redo(&mut grid);
        assert_eq!(grid.coordinate_of(p).unwrap(), at);
        assert_eq!(change.piece(), p);
    }

    #[test]
    fn removed_undo_reinserts_at_index() {
        let mut grid = Grid::new(1, 1).unwrap();
        let at = Coordinate::new(0, 0);
        let a = grid.spawn(PieceKind::Floor);
        let b = grid.spawn(PieceKind::Goal);
        let c = grid.spawn(PieceKind::Crate);
        for p in [a, b, c] {
            grid.attach(p, at, None);
        }
        grid.detach(b);

        let change = GridChange::Removed { piece: b, from: at, index: 1 };
        change.undo(&mut grid);
        assert_eq!(grid.occupants(at).unwrap(), vec![a, b, c]);

        change.redo(&mut grid);
        assert_eq!(grid.occupants(at).unwrap(), vec![a, c]);
    }
}
