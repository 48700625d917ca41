//! Piece handles and piece kinds.
//!
//! A [`PieceId`] is an index into the grid's piece arena. Pieces are spawned
//! once per level and never freed while the level lives, so handles need no
//! generation counter: a handle from another grid is caught by the arena
//! bounds check instead.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PieceId
// ---------------------------------------------------------------------------

/// Stable handle to a piece owned by a [`Grid`](crate::grid::Grid).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u32);

impl PieceId {
    #[inline]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position in the arena.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PieceId({})", self.0)
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PieceKind
// ---------------------------------------------------------------------------

/// The closed set of piece variants.
///
/// The kind decides how a piece reacts when something tries to move onto its
/// cell, and keys the grid's per-kind index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    /// Walkable ground under every cell.
    Floor,
    /// A target cell for crates. Walkable.
    Goal,
    /// Blocks everything.
    Wall,
    /// Pushed one cell along by whatever moves into it.
    Crate,
    /// Driven by input; cannot be pushed.
    Player,
    /// Impassable scenery with no behaviour of its own.
    Static,
}

impl PieceKind {
    /// Back-to-front order for drawing.
    pub const DRAW_ORDER: [PieceKind; 6] = [
        PieceKind::Floor,
        PieceKind::Goal,
        PieceKind::Wall,
        PieceKind::Crate,
        PieceKind::Player,
        PieceKind::Static,
    ];

    /// Whether pieces of this kind ever change cell during play.
    pub fn is_movable(self) -> bool {
        matches!(self, PieceKind::Crate | PieceKind::Player)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Floor => "floor",
            PieceKind::Goal => "goal",
            PieceKind::Wall => "wall",
            PieceKind::Crate => "crate",
            PieceKind::Player => "player",
            PieceKind::Static => "static",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_id_formatting() {
        let id = PieceId::new(12);
        assert_eq!(id.index(), 12);
        assert_eq!(format!("{id:?}"), "PieceId(12)");
        assert_eq!(id.to_string(), "#12");
    }

    #[test]
    fn draw_order_covers_every_kind_once() {
        let mut kinds = PieceKind::DRAW_ORDER.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), PieceKind::DRAW_ORDER.len());
    }

    #[test]
    fn only_crates_and_players_move() {
        let movable: Vec<_> = PieceKind::DRAW_ORDER
            .into_iter()
            .filter(|k| k.is_movable())
            .collect();
        assert_eq!(movable, vec![PieceKind::Crate, PieceKind::Player]);
    }

    #[test]
    fn kind_serialization_roundtrip() {
        let json = serde_json::to_string(&PieceKind::Crate).unwrap();
        let back: PieceKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PieceKind::Crate);
    }
}
