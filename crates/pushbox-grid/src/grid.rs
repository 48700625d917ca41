//! The spatial grid: coordinate -> piece stack, piece -> coordinate, kind ->
//! pieces.
//!
//! # Invariants
//!
//! - Every placed piece appears in exactly one cell stack and exactly once in
//!   the reverse index; detached pieces appear in neither.
//! - The kind index holds exactly the placed pieces of each kind.
//! - Only [`add_piece`](Grid::add_piece) and
//!   [`remove_piece`](Grid::remove_piece) (and their wrappers) change
//!   placement during play, and each change registers a
//!   [`GridChange`] in the caller's log.
//!
//! Stack order is insertion order: the last piece added to a cell is its top.
//! Legality of a move never depends on stack order, but drawing and "what is
//! on top" queries do.

use std::collections::{BTreeSet, HashMap};

use pushbox_undo::log::CheckpointLog;
use tracing::trace;

use crate::change::GridChange;
use crate::coordinate::Coordinate;
use crate::piece::{PieceId, PieceKind};
use crate::GridError;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A bounded `width x height` board of stacked pieces.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    /// Row-major cell stacks, bottom first.
    cells: Vec<Vec<PieceId>>,
    /// Current cell of every placed piece.
    locations: HashMap<PieceId, Coordinate>,
    /// Kind of every spawned piece, indexed by `PieceId::index`.
    kinds: Vec<PieceKind>,
    /// Placed pieces per kind.
    by_kind: HashMap<PieceKind, BTreeSet<PieceId>>,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Vec::new(); width as usize * height as usize],
            locations: HashMap::new(),
            kinds: Vec::new(),
            by_kind: HashMap::new(),
        })
    }

    // -- pieces -------------------------------------------------------------

    /// Allocate a new, detached piece of the given kind.
    ///
    /// Spawning is not recorded in any log: pieces exist for the lifetime of
    /// the level and only their placement is undoable.
    pub fn spawn(&mut self, kind: PieceKind) -> PieceId {
        let id = PieceId::new(self.kinds.len() as u32);
        self.kinds.push(kind);
        id
    }

    /// The kind a piece was spawned with.
    pub fn kind_of(&self, piece: PieceId) -> Result<PieceKind, GridError> {
        self.kinds
            .get(piece.index() as usize)
            .copied()
            .ok_or(GridError::UnknownPiece { piece })
    }

    /// Number of pieces ever spawned, placed or not.
    pub fn piece_count(&self) -> usize {
        self.kinds.len()
    }

    // -- placement ----------------------------------------------------------

    /// Put `piece` on top of the stack at `at`.
    ///
    /// A piece already placed elsewhere is removed from its old cell first,
    /// which registers its own [`GridChange::Removed`]; the placement then
    /// registers a [`GridChange::Added`].
    ///
    /// # Errors
    ///
    /// - [`GridError::OutOfRange`] if `at` is outside the grid.
    /// - [`GridError::UnknownPiece`] if `piece` was not spawned here.
    pub fn add_piece<C>(
        &mut self,
        log: &mut CheckpointLog<C>,
        piece: PieceId,
        at: Coordinate,
    ) -> Result<(), GridError>
    where
        C: AsMut<Grid> + ?Sized,
    {
        self.slot(at)?;
        self.kind_of(piece)?;

        self.remove_piece(log, piece)?;
        self.attach(piece, at, None);
        log.register(GridChange::Added { piece, at });
        trace!(%piece, %at, "piece added");
        Ok(())
    }

    /// Take `piece` off the grid.
    ///
    /// Returns the cell it was removed from, or `None` (and registers
    /// nothing) if it was not placed.
    ///
    /// # Errors
    ///
    /// [`GridError::UnknownPiece`] if `piece` was not spawned here.
    pub fn remove_piece<C>(
        &mut self,
        log: &mut CheckpointLog<C>,
        piece: PieceId,
    ) -> Result<Option<Coordinate>, GridError>
    where
        C: AsMut<Grid> + ?Sized,
    {
        self.kind_of(piece)?;
        let Some((from, index)) = self.detach(piece) else {
            return Ok(None);
        };
        log.register(GridChange::Removed { piece, from, index });
        trace!(%piece, %from, "piece removed");
        Ok(Some(from))
    }

    /// Move `piece` to `at`. Same as [`add_piece`](Self::add_piece).
    pub fn move_piece<C>(
        &mut self,
        log: &mut CheckpointLog<C>,
        piece: PieceId,
        at: Coordinate,
    ) -> Result<(), GridError>
    where
        C: AsMut<Grid> + ?Sized,
    {
        self.add_piece(log, piece, at)
    }

    /// Remove every piece at `at`, bottom first. Returns what was removed.
    pub fn remove_pieces<C>(
        &mut self,
        log: &mut CheckpointLog<C>,
        at: Coordinate,
    ) -> Result<Vec<PieceId>, GridError>
    where
        C: AsMut<Grid> + ?Sized,
    {
        let occupants = self.occupants(at)?;
        for &piece in &occupants {
            self.remove_piece(log, piece)?;
        }
        Ok(occupants)
    }

    /// Surround the board with walls, one per border cell.
    pub fn add_outer_wall<C>(
        &mut self,
        log: &mut CheckpointLog<C>,
    ) -> Result<Vec<PieceId>, GridError>
    where
        C: AsMut<Grid> + ?Sized,
    {
        let (w, h) = (self.width as i32, self.height as i32);
        let border: Vec<Coordinate> = self
            .coordinates()
            .filter(|c| c.x == 0 || c.y == 0 || c.x == w - 1 || c.y == h - 1)
            .collect();

        let mut walls = Vec::with_capacity(border.len());
        for at in border {
            let wall = self.spawn(PieceKind::Wall);
            self.add_piece(log, wall, at)?;
            walls.push(wall);
        }
        Ok(walls)
    }

    // -- queries ------------------------------------------------------------

    /// The pieces at `at`, bottom first. The returned vector is a copy.
    pub fn occupants(&self, at: Coordinate) -> Result<Vec<PieceId>, GridError> {
        let slot = self.slot(at)?;
        Ok(self.cells[slot].clone())
    }

    /// The top piece at `at`, if any.
    pub fn top(&self, at: Coordinate) -> Result<Option<PieceId>, GridError> {
        let slot = self.slot(at)?;
        Ok(self.cells[slot].last().copied())
    }

    /// Whether any piece of `kind` sits at `at`.
    pub fn has_kind_at(&self, at: Coordinate, kind: PieceKind) -> Result<bool, GridError> {
        let slot = self.slot(at)?;
        Ok(self.cells[slot]
            .iter()
            .any(|&p| self.kinds[p.index() as usize] == kind))
    }

    /// The cell `piece` currently occupies.
    ///
    /// # Errors
    ///
    /// - [`GridError::Detached`] if the piece is not placed.
    /// - [`GridError::UnknownPiece`] if it was not spawned here.
    pub fn coordinate_of(&self, piece: PieceId) -> Result<Coordinate, GridError> {
        self.kind_of(piece)?;
        self.locations
            .get(&piece)
            .copied()
            .ok_or(GridError::Detached { piece })
    }

    /// Whether `piece` is currently placed.
    pub fn is_placed(&self, piece: PieceId) -> bool {
        self.locations.contains_key(&piece)
    }

    /// All placed pieces of `kind`, in handle order. The set is a copy; a
    /// kind with no pieces yields an empty set.
    pub fn pieces_of_kind(&self, kind: PieceKind) -> BTreeSet<PieceId> {
        self.by_kind.get(&kind).cloned().unwrap_or_default()
    }

    /// Number of placed pieces.
    pub fn placed_count(&self) -> usize {
        self.locations.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `at` lies on the board.
    pub fn contains(&self, at: Coordinate) -> bool {
        at.x >= 0 && at.y >= 0 && (at.x as u32) < self.width && (at.y as u32) < self.height
    }

    /// Every coordinate, row by row.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| Coordinate::new(x, y)))
    }

    // -- raw placement (used by replayed GridChanges) -----------------------

    /// Place `piece` at `at` without logging. `index` reinstates a specific
    /// stack position; `None` puts the piece on top.
    pub(crate) fn attach(&mut self, piece: PieceId, at: Coordinate, index: Option<usize>) {
        self.detach(piece);
        let Ok(slot) = self.slot(at) else {
            return;
        };
        let stack = &mut self.cells[slot];
        match index {
            Some(i) => stack.insert(i.min(stack.len()), piece),
            None => stack.push(piece),
        }
        self.locations.insert(piece, at);
        let kind = self.kinds[piece.index() as usize];
        self.by_kind.entry(kind).or_default().insert(piece);
    }

    /// Take `piece` off the grid without logging. Returns where it was and
    /// its position in that cell's stack.
    pub(crate) fn detach(&mut self, piece: PieceId) -> Option<(Coordinate, usize)> {
        let at = self.locations.remove(&piece)?;
        let slot = self.slot(at).ok()?;
        let stack = &mut self.cells[slot];
        let index = stack.iter().position(|&p| p == piece)?;
        stack.remove(index);
        let kind = self.kinds[piece.index() as usize];
        if let Some(set) = self.by_kind.get_mut(&kind) {
            set.remove(&piece);
        }
        Some((at, index))
    }

    fn slot(&self, at: Coordinate) -> Result<usize, GridError> {
        if !self.contains(at) {
            return Err(GridError::OutOfRange {
                coordinate: at,
                width: self.width,
                height: self.height,
            });
        }
        Ok(at.y as usize * self.width as usize + at.x as usize)
    }
}

impl AsMut<Grid> for Grid {
    fn as_mut(&mut self) -> &mut Grid {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
