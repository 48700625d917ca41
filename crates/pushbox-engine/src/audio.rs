//! Sound effects that take part in rollback.
//!
//! The [`MusicPlayer`] forwards play/stop requests to an [`AudioSink`] and
//! registers a stop for every sound it starts, so undoing past the moment a
//! sound was triggered stops it again.

use std::collections::BTreeSet;
use std::fmt;

use pushbox_undo::log::CheckpointLog;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// The game's sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sound {
    /// A crate slid onto an ordinary cell.
    CrateSlide,
    /// A crate slid onto a goal.
    CrateOnGoal,
    /// Every crate is on a goal.
    Win,
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sound::CrateSlide => "crate_slide",
            Sound::CrateOnGoal => "crate_on_goal",
            Sound::Win => "win",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// AudioSink
// ---------------------------------------------------------------------------

/// Where sounds actually go. Implementations must tolerate a `stop` for a
/// sound that is not playing.
pub trait AudioSink: fmt::Debug {
    fn start(&mut self, sound: Sound);
    fn stop(&mut self, sound: Sound);
}

/// Discards everything. Used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn start(&mut self, _sound: Sound) {}
    fn stop(&mut self, _sound: Sound) {}
}

/// Emits a `debug` event per start and stop.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AudioSink for TracingSink {
    fn start(&mut self, sound: Sound) {
        debug!(%sound, "sound started");
    }

    fn stop(&mut self, sound: Sound) {
        debug!(%sound, "sound stopped");
    }
}

// ---------------------------------------------------------------------------
// MusicPlayer
// ---------------------------------------------------------------------------

/// Tracks which sounds are playing and routes them to a sink.
///
/// A sound is "playing" from [`play`](Self::play) until something stops it.
/// Playing a sound that is already playing restarts it; there is one voice
/// per sound.
#[derive(Debug)]
pub struct MusicPlayer {
    sink: Box<dyn AudioSink>,
    playing: BTreeSet<Sound>,
}

impl MusicPlayer {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            playing: BTreeSet::new(),
        }
    }

    /// Start `sound` and register its stop as the undo action.
    pub fn play<C>(&mut self, log: &mut CheckpointLog<C>, sound: Sound)
    where
        C: AsMut<MusicPlayer> + ?Sized + 'static,
    {
        self.sink.start(sound);
        self.playing.insert(sound);
        log.register_cancel(move |ctx: &mut C| {
            ctx.as_mut().stop(sound);
        });
        trace!(%sound, "sound registered");
    }

    /// Stop `sound`. Returns `false` if it was not playing.
    pub fn stop(&mut self, sound: Sound) -> bool {
        if !self.playing.remove(&sound) {
            return false;
        }
        self.sink.stop(sound);
        true
    }

    /// Stop every sound.
    pub fn reset(&mut self) {
        for sound in std::mem::take(&mut self.playing) {
            self.sink.stop(sound);
        }
    }

    pub fn is_playing(&self, sound: Sound) -> bool {
        self.playing.contains(&sound)
    }

    /// Sounds currently playing, in a fixed order.
    pub fn playing(&self) -> impl Iterator<Item = Sound> + '_ {
        self.playing.iter().copied()
    }
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new(Box::new(SilentSink))
    }
}

impl AsMut<MusicPlayer> for MusicPlayer {
    fn as_mut(&mut self) -> &mut MusicPlayer {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
