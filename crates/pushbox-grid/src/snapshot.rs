//! Serializable grid snapshots with BLAKE3 hashing.
//!
//! A [`GridSnapshot`] captures the full placement state: every cell stack in
//! row-major order plus the kind of every spawned piece. Two grids with equal
//! snapshots are indistinguishable to any query, which makes the snapshot
//! (or its hash) the reference for "rolled back exactly" checks and replay
//! verification.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::grid::Grid;
use crate::piece::{PieceId, PieceKind};

/// The placement state of a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: u32,
    pub height: u32,
    /// Cell stacks, bottom first, row-major.
    pub cells: Vec<Vec<PieceId>>,
    /// Kind of each spawned piece, indexed by handle.
    pub kinds: Vec<PieceKind>,
}

impl GridSnapshot {
    /// BLAKE3 hex digest (64 lowercase hex chars) of the canonical JSON form.
    pub fn hash(&self) -> String {
        let json_bytes =
            serde_json::to_vec(self).expect("GridSnapshot should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }

    /// Coordinates whose stacks differ between `self` and `other`.
    ///
    /// Snapshots of different dimensions differ everywhere; the coordinates
    /// of `self` are reported.
    pub fn changed_cells(&self, other: &GridSnapshot) -> Vec<Coordinate> {
        let same_shape = self.width == other.width && self.height == other.height;
        self.cells
            .iter()
            .enumerate()
            .filter(|(i, stack)| !same_shape || other.cells.get(*i) != Some(*stack))
            .map(|(i, _)| {
                let w = self.width as usize;
                Coordinate::new((i % w) as i32, (i / w) as i32)
            })
            .collect()
    }
}

impl Grid {
    /// Capture the current placement state.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width(),
            height: self.height(),
            cells: self
                .coordinates()
                .map(|at| self.occupants(at).unwrap_or_default())
                .collect(),
            kinds: (0..self.piece_count() as u32)
                .filter_map(|i| self.kind_of(PieceId::new(i)).ok())
                .collect(),
        }
    }

    /// Hash of [`snapshot`](Self::snapshot).
    pub fn state_hash(&self) -> String {
        self.snapshot().hash()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pushbox_undo::log::CheckpointLog;

    fn small_grid() -> (Grid, CheckpointLog<Grid>, PieceId) {
        let mut grid = Grid::new(3, 2).unwrap();
        let mut log = CheckpointLog::new();
        let c = grid.spawn(PieceKind::Crate);
        grid.add_piece(&mut log, c, Coordinate::new(0, 0)).unwrap();
        (grid, log, c)
    }

    #[test]
    fn hash_is_stable_and_hex() {
        let (grid, _, _) = small_grid();
        let h1 = grid.state_hash();
        let h2 = grid.state_hash();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_changes_with_placement_and_returns_after_undo() {
        let (mut grid, mut log, c) = small_grid();
        let before = grid.snapshot();

        grid.move_piece(&mut log, c, Coordinate::new(2, 1)).unwrap();
        let after = grid.snapshot();
        assert_ne!(before.hash(), after.hash());
        assert_eq!(
            before.changed_cells(&after),
            vec![Coordinate::new(0, 0), Coordinate::new(2, 1)]
        );

        log.undo_to_index(&mut grid, 1).unwrap();
        assert_eq!(grid.snapshot(), before);
    }

    #[test]
    fn snapshot_serialization_roundtrip() {
        let (grid, _, _) = small_grid();
        let snap = grid.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: GridSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
        assert_eq!(snap.hash(), back.hash());
    }
}
