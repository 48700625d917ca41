//! Input recording and deterministic replay.
//!
//! A [`MoveRecorder`] captures the input of every frame of a [`Session`] plus
//! periodic state-hash checkpoints, producing a [`ReplayLog`]. [`replay`]
//! loads the same map into a fresh session, feeds the recorded frames back
//! at the recorded frame length, and compares hashes at each checkpoint.
//!
//! # Recording
//!
//! ```
//! use pushbox_engine::prelude::*;
//!
//! let map = maps::by_name("tutorial").unwrap();
//! let config = GameConfig::default();
//! let mut session = Session::new(map.clone(), config.clone()).unwrap();
//! let mut recorder = MoveRecorder::new(map, 300, config.replay_checkpoint_interval);
//!
//! for _ in 0..6 {
//!     recorder.step(&mut session, InputFrame::press(Direction::Left)).unwrap();
//! }
//! let log = recorder.finish();
//!
//! let result = replay(&config, &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::input::InputFrame;
use crate::level::LevelMap;
use crate::session::{Session, StepOutcome};
use crate::EngineError;

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// A recorded session: the map, the frame length, and the ordered inputs
/// and checkpoints.
///
/// Fully serializable to JSON for storage or regression fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// The map the session was started on.
    pub map: LevelMap,
    /// Milliseconds that elapsed in every recorded frame.
    pub frame_ms: u64,
    /// Number of frames recorded. Replay runs exactly this many.
    pub total_frames: u64,
    /// Inputs and checkpoints, in frame order.
    pub entries: Vec<ReplayEntry>,
}

/// One entry of a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// Non-empty input stepped on `frame`.
    Input { frame: u64, input: InputFrame },
    /// Session state hash taken before `frame` was stepped.
    Checkpoint { frame: u64, state_hash: String },
}

/// The outcome of [`replay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every frame was replayed without divergence.
    pub completed: bool,
    pub frames_replayed: u64,
    /// The first checkpoint whose hash did not match, if any.
    pub first_divergence: Option<ReplayDivergence>,
}

/// A checkpoint mismatch found during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub frame: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// MoveRecorder
// ---------------------------------------------------------------------------

/// Records a session into a [`ReplayLog`].
///
/// Frames must be recorded in strictly increasing order.
#[derive(Debug)]
pub struct MoveRecorder {
    log: ReplayLog,
    checkpoint_interval: u64,
    last_frame: Option<u64>,
}

impl MoveRecorder {
    /// * `map` -- the map the recorded session was started on.
    /// * `frame_ms` -- elapsed milliseconds of every frame.
    /// * `checkpoint_interval` -- frames between checkpoints; 0 checkpoints
    ///   every frame that supplies a hash.
    pub fn new(map: LevelMap, frame_ms: u64, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                map,
                frame_ms,
                total_frames: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            last_frame: None,
        }
    }

    /// Record one frame, before it is stepped.
    ///
    /// Non-empty input is stored. `state_hash` is stored as a checkpoint if
    /// `frame` falls on the interval.
    ///
    /// # Panics
    ///
    /// Panics if `frame` is not strictly greater than the previous one.
    pub fn record_frame(&mut self, frame: u64, input: &InputFrame, state_hash: Option<String>) {
        if let Some(prev) = self.last_frame {
            assert!(
                frame > prev,
                "MoveRecorder::record_frame: frame {frame} is not after previous frame {prev}"
            );
        }
        self.last_frame = Some(frame);
        self.log.total_frames += 1;

        if !input.is_empty() {
            self.log.entries.push(ReplayEntry::Input {
                frame,
                input: *input,
            });
        }

        if let Some(hash) = state_hash {
            let on_interval =
                self.checkpoint_interval == 0 || frame % self.checkpoint_interval == 0;
            if on_interval {
                self.log.entries.push(ReplayEntry::Checkpoint {
                    frame,
                    state_hash: hash,
                });
            }
        }
    }

    /// Record the session's next frame and step it by the recorded frame
    /// length.
    pub fn step(
        &mut self,
        session: &mut Session,
        input: InputFrame,
    ) -> Result<StepOutcome, EngineError> {
        self.record_frame(session.frame(), &input, Some(session.state_hash()));
        session.step(&input, self.log.frame_ms)
    }

    pub fn finish(self) -> ReplayLog {
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on a fresh session, checking every checkpoint.
///
/// Stops at the first divergence.
///
/// # Errors
///
/// A malformed log (duplicate entries, an invalid map) or an engine error
/// raised while stepping.
pub fn replay(config: &GameConfig, log: &ReplayLog) -> Result<ReplayResult, anyhow::Error> {
    let mut inputs: BTreeMap<u64, InputFrame> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();

    for entry in &log.entries {
        match entry {
            ReplayEntry::Input { frame, input } => {
                if inputs.insert(*frame, *input).is_some() {
                    return Err(anyhow::anyhow!(
                        "replay log contains duplicate Input entry at frame {frame}"
                    ));
                }
            }
            ReplayEntry::Checkpoint { frame, state_hash } => {
                if checkpoints.insert(*frame, state_hash).is_some() {
                    return Err(anyhow::anyhow!(
                        "replay log contains duplicate Checkpoint entry at frame {frame}"
                    ));
                }
            }
        }
    }

    let mut session = Session::new(log.map.clone(), config.clone())
        .map_err(|e| anyhow::anyhow!("failed to load map {:?} for replay: {e}", log.map.name()))?;

    let mut frames_replayed = 0;
    for frame in 0..log.total_frames {
        if let Some(&expected) = checkpoints.get(&frame) {
            let actual = session.state_hash();
            if actual != expected {
                warn!(frame, "replay diverged");
                return Ok(ReplayResult {
                    completed: false,
                    frames_replayed,
                    first_divergence: Some(ReplayDivergence {
                        frame,
                        expected_hash: expected.to_owned(),
                        actual_hash: actual,
                    }),
                });
            }
        }

        let input = inputs.get(&frame).copied().unwrap_or_default();
        session.step(&input, log.frame_ms)?;
        frames_replayed += 1;
    }

    info!(frames_replayed, won = session.is_won(), "replay completed");
    Ok(ReplayResult {
        completed: true,
        frames_replayed,
        first_divergence: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
