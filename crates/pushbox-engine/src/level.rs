//! Level maps and the move protocol.
//!
//! A [`LevelMap`] is a validated rectangle of tiles. [`Level::load`] turns
//! one into a populated [`Board`] with its own, fresh [`CheckpointLog`]:
//! loading a different map never carries history across.
//!
//! # The move protocol
//!
//! [`Level::move_piece`] runs one move attempt:
//!
//! 1. Moving onto the current cell fails immediately and touches nothing.
//! 2. A fresh checkpoint label is saved.
//! 3. Every occupant of the target cell reacts, in stack order, against a
//!    copy of the stack taken before any reaction ran. Reactions may move
//!    other pieces through this same protocol.
//! 4. If any occupant refuses, the log is undone back to the checkpoint,
//!    which reverts every nested move, sound and animation of the attempt.
//! 5. Otherwise the piece is moved and its own after-move effects run.
//!
//! The checkpoint label is deleted whatever the outcome.

use std::collections::BTreeSet;

use pushbox_grid::coordinate::{Coordinate, Direction};
use pushbox_grid::grid::Grid;
use pushbox_grid::piece::{PieceId, PieceKind};
use pushbox_grid::snapshot::GridSnapshot;
use pushbox_undo::label::Label;
use pushbox_undo::log::CheckpointLog;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::audio::{MusicPlayer, Sound};
use crate::behaviour::behaviour_of;
use crate::board::{Board, DEFAULT_FACING};
use crate::config::GameConfig;
use crate::EngineError;

/// Map tile characters. Any other character is plain floor.
pub mod tile {
    pub const WALL: char = 'W';
    pub const PLAYER: char = 'P';
    pub const CRATE: char = 'B';
    pub const GOAL: char = 'G';
    pub const FLOOR: char = '.';
}

// ---------------------------------------------------------------------------
// LevelMap
// ---------------------------------------------------------------------------

/// Reasons a map cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("map has no rows")]
    NoRows,

    #[error("map rows are empty")]
    EmptyRow,

    #[error("row {row} has {found} tiles, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A named, rectangular grid of tile characters, top row first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMap {
    name: String,
    rows: Vec<String>,
}

impl LevelMap {
    /// Build a map from its rows, checking that it is a non-empty rectangle.
    pub fn parse<S: AsRef<str>>(name: impl Into<String>, rows: &[S]) -> Result<Self, LevelError> {
        let map = Self {
            name: name.into(),
            rows: rows.iter().map(|r| r.as_ref().to_owned()).collect(),
        };
        map.validate()?;
        Ok(map)
    }

    /// Parse a map written one row per line. Blank lines and surrounding
    /// whitespace are ignored.
    pub fn from_text(name: impl Into<String>, text: &str) -> Result<Self, LevelError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self::parse(name, &rows)
    }

    /// Check the shape. Maps built by [`parse`](Self::parse) always pass;
    /// deserialized ones may not.
    pub fn validate(&self) -> Result<(), LevelError> {
        let Some(first) = self.rows.first() else {
            return Err(LevelError::NoRows);
        };
        let expected = first.chars().count();
        if expected == 0 {
            return Err(LevelError::EmptyRow);
        }
        for (row, line) in self.rows.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(LevelError::NotRectangular {
                    row,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.chars().count())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// The tile at `at`, if on the map.
    pub fn tile(&self, at: Coordinate) -> Option<char> {
        let y = usize::try_from(at.y).ok()?;
        let x = usize::try_from(at.x).ok()?;
        self.rows.get(y)?.chars().nth(x)
    }

    /// Every tile with its coordinate, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Coordinate, char)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.chars()
                .enumerate()
                .map(move |(x, c)| (Coordinate::new(x as i32, y as i32), c))
        })
    }
}

// ---------------------------------------------------------------------------
// LevelSnapshot
// ---------------------------------------------------------------------------

/// Everything about a level that play can change, in a comparable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub grid: GridSnapshot,
    /// Player facings, in piece order.
    pub facing: Vec<(PieceId, Direction)>,
    /// Checkpoint log cursor.
    pub cursor: usize,
}

impl LevelSnapshot {
    /// BLAKE3 hex digest of the canonical JSON form.
    pub fn hash(&self) -> String {
        let json_bytes =
            serde_json::to_vec(self).expect("LevelSnapshot should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// A loaded level: the board, its history, and the rules that move pieces.
#[derive(Debug)]
pub struct Level {
    name: String,
    board: Board,
    log: CheckpointLog<Board>,
    config: GameConfig,
    undo_label: Label,
}

impl Level {
    /// Load `map` with silent audio.
    pub fn load(map: &LevelMap, config: GameConfig) -> Result<Self, EngineError> {
        Self::load_with_music(map, config, MusicPlayer::default())
    }

    /// Load `map`, playing sounds through `music`.
    ///
    /// Building the board is not logged: the loaded state is cursor 0 and
    /// the first position of the undo label.
    pub fn load_with_music(
        map: &LevelMap,
        config: GameConfig,
        music: MusicPlayer,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        map.validate()?;

        let grid = Grid::new(map.width() as u32, map.height() as u32)?;
        let mut board = Board::new(grid, music);
        let mut log: CheckpointLog<Board> = CheckpointLog::new();

        log.set_enabled(false);
        for (at, c) in map.cells() {
            let floor = board.grid.spawn(PieceKind::Floor);
            board.grid.add_piece(&mut log, floor, at)?;

            let kind = match c {
                tile::WALL => PieceKind::Wall,
                tile::PLAYER => PieceKind::Player,
                tile::CRATE => PieceKind::Crate,
                tile::GOAL => PieceKind::Goal,
                _ => continue,
            };
            let piece = board.grid.spawn(kind);
            board.grid.add_piece(&mut log, piece, at)?;
            if kind == PieceKind::Player {
                board.set_facing(piece, DEFAULT_FACING);
            }
        }
        log.set_enabled(true);

        let undo_label = config.undo_label();
        log.save_label(&undo_label);

        info!(
            level = map.name(),
            width = map.width(),
            height = map.height(),
            pieces = board.grid.piece_count(),
            "level loaded"
        );

        Ok(Self {
            name: map.name().to_owned(),
            board,
            log,
            config,
            undo_label,
        })
    }

    // -- accessors ----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid(&self) -> &Grid {
        &self.board.grid
    }

    pub fn log(&self) -> &CheckpointLog<Board> {
        &self.log
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Split borrow for effects that mutate the board and register in the
    /// log at once.
    pub(crate) fn board_and_log(&mut self) -> (&mut Board, &mut CheckpointLog<Board>) {
        (&mut self.board, &mut self.log)
    }

    pub fn players(&self) -> BTreeSet<PieceId> {
        self.board.grid.pieces_of_kind(PieceKind::Player)
    }

    pub fn crates(&self) -> BTreeSet<PieceId> {
        self.board.grid.pieces_of_kind(PieceKind::Crate)
    }

    /// Create a piece and put it on top of the stack at `at`. The placement
    /// is logged; a player also gets the default facing.
    pub fn spawn_piece(&mut self, kind: PieceKind, at: Coordinate) -> Result<PieceId, EngineError> {
        self.board.grid.occupants(at)?;
        let piece = self.board.grid.spawn(kind);
        self.board.grid.add_piece(&mut self.log, piece, at)?;
        if kind == PieceKind::Player {
            self.board.set_facing(piece, DEFAULT_FACING);
        }
        Ok(piece)
    }

    // -- the move protocol --------------------------------------------------

    /// Try to move `piece` onto `target`.
    ///
    /// Returns `Ok(true)` if the move happened and `Ok(false)` if it was
    /// refused, in which case placement and the log cursor are exactly as
    /// they were before the call.
    ///
    /// # Errors
    ///
    /// Grid errors for an off-board `target` or a piece that is not placed.
    /// A failure midway through a cascade is rolled back before it is
    /// returned.
    pub fn move_piece(&mut self, piece: PieceId, target: Coordinate) -> Result<bool, EngineError> {
        let from = self.board.grid.coordinate_of(piece)?;
        if from == target {
            return Ok(false);
        }
        let occupants = self.board.grid.occupants(target)?;

        let committed =
            self.checkpointed(|level| level.attempt(piece, from, target, &occupants))?;
        if committed {
            debug!(%piece, %from, %target, "move committed");
        } else {
            debug!(%piece, %from, %target, "move refused");
        }
        Ok(committed)
    }

    /// Run `attempt` behind a fresh checkpoint. Anything but `Ok(true)`
    /// undoes the log back to the checkpoint before returning. The
    /// checkpoint label is deleted either way.
    fn checkpointed<F>(&mut self, attempt: F) -> Result<bool, EngineError>
    where
        F: FnOnce(&mut Self) -> Result<bool, EngineError>,
    {
        let checkpoint = self.log.fresh_label();
        self.log.save_label(&checkpoint);

        let outcome = attempt(self);
        if matches!(outcome, Ok(true)) {
            self.log.delete_label(&checkpoint);
        } else {
            self.roll_back(&checkpoint);
        }
        outcome
    }

    fn attempt(
        &mut self,
        piece: PieceId,
        from: Coordinate,
        target: Coordinate,
        occupants: &[PieceId],
    ) -> Result<bool, EngineError> {
        for &occupant in occupants {
            let kind = self.board.grid.kind_of(occupant)?;
            if !behaviour_of(kind).react_to_move(self, occupant, piece)? {
                trace!(%piece, %occupant, %kind, "occupant refused");
                return Ok(false);
            }
        }

        self.board.grid.move_piece(&mut self.log, piece, target)?;
        let kind = self.board.grid.kind_of(piece)?;
        behaviour_of(kind).after_move(self, piece, from, target)?;
        Ok(true)
    }

    fn roll_back(&mut self, checkpoint: &Label) {
        self.log.undo(&mut self.board, checkpoint);
        self.log.delete_label(checkpoint);
    }

    /// Move every player one step in `direction`, leaders first.
    ///
    /// Each player turns to face `direction` before its attempt; the turn
    /// is logged on its own and stays even if the step is refused. A step
    /// off the board counts as refused. If any player moved, the undo label
    /// is saved. Returns whether any player moved.
    pub fn move_players(&mut self, direction: Direction) -> Result<bool, EngineError> {
        let mut players = Vec::new();
        for player in self.players() {
            players.push((self.board.grid.coordinate_of(player)?, player));
        }
        players.sort_by_key(|&(at, player)| (direction.lead_key(at), player));

        let mut moved = false;
        for (at, player) in players {
            self.board.turn(&mut self.log, player, direction);
            let target = direction.step(at);
            if self.board.grid.contains(target) {
                moved |= self.move_piece(player, target)?;
            }
        }

        if moved {
            self.log.save_label(&self.undo_label);
        }
        Ok(moved)
    }

    // -- history ------------------------------------------------------------

    /// Undo the last player move. Returns `false` if there is none.
    pub fn undo_move(&mut self) -> bool {
        self.log.undo(&mut self.board, &self.undo_label)
    }

    /// Redo the next undone player move. Returns `false` if there is none.
    pub fn redo_move(&mut self) -> bool {
        self.log.redo(&mut self.board, &self.undo_label)
    }

    /// Player moves between the loaded state and the cursor.
    pub fn move_count(&self) -> usize {
        let cursor = self.log.cursor();
        self.log
            .label_positions(&self.undo_label)
            .map_or(0, |positions| {
                positions
                    .partition_point(|&p| p <= cursor)
                    .saturating_sub(1)
            })
    }

    /// Undo everything back to the loaded state. The moves stay redoable.
    pub fn rewind_to_start(&mut self) -> Result<(), EngineError> {
        self.log.undo_to_index(&mut self.board, 0)?;
        info!(level = %self.name, "level rewound");
        Ok(())
    }

    /// Play `sound`, registered like any other effect.
    pub fn play(&mut self, sound: Sound) {
        self.board.music.play(&mut self.log, sound);
    }

    // -- queries ------------------------------------------------------------

    /// Whether every crate shares its cell with a goal. A level without
    /// crates is won.
    pub fn is_won(&self) -> Result<bool, EngineError> {
        for piece in self.crates() {
            let at = self.board.grid.coordinate_of(piece)?;
            if !self.board.grid.has_kind_at(at, PieceKind::Goal)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            grid: self.board.grid.snapshot(),
            facing: self.board.facings().into_iter().collect(),
            cursor: self.log.cursor(),
        }
    }

    pub fn state_hash(&self) -> String {
        self.snapshot().hash()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
