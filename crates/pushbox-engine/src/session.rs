//! The per-frame game loop for one level.
//!
//! Each call to [`Session::step`]:
//!
//! 1. Advances running animations by the elapsed time.
//! 2. If the players may act (level not won, nothing animating), applies the
//!    frame's request: undo, else redo, else a move in the held direction.
//! 3. Checks the win condition and, the first time it holds, plays the win
//!    sound. A won level accepts no further moves, undos or redos until it
//!    is restarted.
//!
//! Given the same map, config and sequence of `(input, elapsed_ms)` frames,
//! a session always ends in the same state; [`crate::replay`] relies on it.
//!
//! # Example
//!
//! ```
//! use pushbox_engine::prelude::*;
//!
//! let map = LevelMap::parse("corridor", &["P.B.G"]).unwrap();
//! let mut session = Session::new(map, GameConfig::default()).unwrap();
//!
//! session.step(&InputFrame::press(Direction::Right), 0).unwrap();
//! assert_eq!(session.level().move_count(), 1);
//!
//! // Still walking: input is ignored until the animation finishes.
//! let outcome = session.step(&InputFrame::press(Direction::Right), 100).unwrap();
//! assert!(!outcome.moved);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audio::{MusicPlayer, Sound};
use crate::config::GameConfig;
use crate::input::InputFrame;
use crate::level::{Level, LevelMap, LevelSnapshot};
use crate::EngineError;

// ---------------------------------------------------------------------------
// StepOutcome
// ---------------------------------------------------------------------------

/// What happened during one [`Session::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// At least one player moved.
    pub moved: bool,
    /// A move was undone.
    pub undone: bool,
    /// A move was redone.
    pub redone: bool,
    /// The level became won on this frame.
    pub just_won: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State hashed for replay checkpoints.
#[derive(Serialize)]
struct SessionState<'a> {
    won: bool,
    level: &'a LevelSnapshot,
}

/// A level being played frame by frame.
#[derive(Debug)]
pub struct Session {
    map: LevelMap,
    config: GameConfig,
    level: Level,
    won: bool,
    frame: u64,
}

impl Session {
    /// Start `map` with silent audio.
    pub fn new(map: LevelMap, config: GameConfig) -> Result<Self, EngineError> {
        Self::with_music(map, config, MusicPlayer::default())
    }

    /// Start `map`, playing sounds through `music`.
    pub fn with_music(
        map: LevelMap,
        config: GameConfig,
        music: MusicPlayer,
    ) -> Result<Self, EngineError> {
        let level = Level::load_with_music(&map, config.clone(), music)?;
        Ok(Self {
            map,
            config,
            level,
            won: false,
            frame: 0,
        })
    }

    /// Run one frame. See the module docs for the order of events.
    pub fn step(
        &mut self,
        input: &InputFrame,
        elapsed_ms: u64,
    ) -> Result<StepOutcome, EngineError> {
        self.frame += 1;
        self.level.board_and_log().0.animator.tick(elapsed_ms);

        let mut outcome = StepOutcome::default();
        if self.players_can_move() {
            if input.undo {
                outcome.undone = self.level.undo_move();
            } else if input.redo {
                outcome.redone = self.level.redo_move();
            } else if let Some(direction) = input.keys.direction() {
                outcome.moved = self.level.move_players(direction)?;
            }
        }

        if !self.won && self.level.is_won()? {
            self.won = true;
            self.level.play(Sound::Win);
            outcome.just_won = true;
            info!(
                level = self.level.name(),
                moves = self.level.move_count(),
                frame = self.frame,
                "level won"
            );
        }

        if outcome != StepOutcome::default() {
            debug!(frame = self.frame, ?outcome, "frame stepped");
        }
        Ok(outcome)
    }

    /// Whether input is currently acted on.
    pub fn players_can_move(&self) -> bool {
        !self.won && !self.level.board().animator.is_animating()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Frames stepped since the session started.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn map(&self) -> &LevelMap {
        &self.map
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Undo the last move, outside the frame loop.
    pub fn undo_move(&mut self) -> bool {
        !self.won && self.level.undo_move()
    }

    /// Redo the next undone move, outside the frame loop.
    pub fn redo_move(&mut self) -> bool {
        !self.won && self.level.redo_move()
    }

    /// Go back to the loaded state, clearing a win. Undone moves can be
    /// redone afterwards.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.level.rewind_to_start()?;
        self.won = false;
        Ok(())
    }

    /// Switch to another map. History does not carry over.
    pub fn change_map(&mut self, map: LevelMap) -> Result<(), EngineError> {
        let mut music = std::mem::take(&mut self.level.board_and_log().0.music);
        music.reset();
        let level = Level::load_with_music(&map, self.config.clone(), music)?;
        self.level = level;
        self.map = map;
        self.won = false;
        Ok(())
    }

    /// BLAKE3 hex digest of the level state and the win flag.
    pub fn state_hash(&self) -> String {
        let snapshot = self.level.snapshot();
        let state = SessionState {
            won: self.won,
            level: &snapshot,
        };
        let json_bytes =
            serde_json::to_vec(&state).expect("SessionState should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
