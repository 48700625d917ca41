//! Cancellable animations driven by elapsed time.
//!
//! The [`Animator`] owns every running [`Animation`]. Starting one registers
//! a cancel in the caller's log: a move that is rolled back (or undone
//! later) cancels its slide, which snaps the piece to the end of the
//! animation where the grid now agrees with it.
//!
//! Interpolation happens in grid units. Turning those into pixels is the
//! renderer's business.

use std::collections::BTreeMap;
use std::fmt;

use pushbox_grid::coordinate::Coordinate;
use pushbox_grid::piece::PieceId;
use pushbox_undo::log::CheckpointLog;
use serde::{Deserialize, Serialize};
use tracing::trace;

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Something that plays out over time and can be stopped early.
///
/// `cancel` must be safe to call more than once and after the animation has
/// finished.
pub trait Animation: fmt::Debug {
    /// Rewind to the beginning.
    fn start(&mut self);

    /// Advance by `elapsed_ms`. Returns `true` once finished.
    fn tick(&mut self, elapsed_ms: u64) -> bool;

    /// Jump to the finished state.
    fn cancel(&mut self);

    fn is_finished(&self) -> bool;

    /// Current position, in (fractional) grid cells.
    fn position(&self) -> [f32; 2];

    /// Index of the image to show.
    fn frame(&self) -> usize;
}

/// A straight slide between two cells with a cycling image.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearAnimation {
    start: [f32; 2],
    finish: [f32; 2],
    travel_ms: u64,
    image_phase_ms: u64,
    frames: usize,
    elapsed_ms: u64,
}

impl LinearAnimation {
    /// Slide from `start` to `finish` over `travel_ms`, changing image every
    /// `image_phase_ms` through `frames` images.
    pub fn new(
        start: Coordinate,
        finish: Coordinate,
        travel_ms: u64,
        image_phase_ms: u64,
        frames: usize,
    ) -> Self {
        Self {
            start: [start.x as f32, start.y as f32],
            finish: [finish.x as f32, finish.y as f32],
            travel_ms,
            image_phase_ms,
            frames: frames.max(1),
            elapsed_ms: 0,
        }
    }

    /// Fraction of the slide completed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.travel_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f32 / self.travel_ms as f32).min(1.0)
    }
}

impl Animation for LinearAnimation {
    fn start(&mut self) {
        self.elapsed_ms = 0;
    }

    fn tick(&mut self, elapsed_ms: u64) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        self.is_finished()
    }

    fn cancel(&mut self) {
        self.elapsed_ms = self.elapsed_ms.max(self.travel_ms);
    }

    fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.travel_ms
    }

    fn position(&self) -> [f32; 2] {
        let t = self.progress();
        [
            self.start[0] + (self.finish[0] - self.start[0]) * t,
            self.start[1] + (self.finish[1] - self.start[1]) * t,
        ]
    }

    fn frame(&self) -> usize {
        if self.image_phase_ms == 0 {
            return 0;
        }
        (self.elapsed_ms / self.image_phase_ms) as usize % self.frames
    }
}

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

/// Handle to a running animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(u64);

#[derive(Debug)]
struct Running {
    piece: PieceId,
    animation: Box<dyn Animation>,
}

/// Owns every running animation, oldest first.
#[derive(Debug, Default)]
pub struct Animator {
    running: BTreeMap<AnimationId, Running>,
    next_id: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `animation` for `piece` and register its cancellation.
    pub fn start<C>(
        &mut self,
        log: &mut CheckpointLog<C>,
        piece: PieceId,
        mut animation: Box<dyn Animation>,
    ) -> AnimationId
    where
        C: AsMut<Animator> + ?Sized + 'static,
    {
        let id = AnimationId(self.next_id);
        self.next_id += 1;

        animation.start();
        self.running.insert(id, Running { piece, animation });
        log.register_cancel(move |ctx: &mut C| {
            ctx.as_mut().cancel(id);
        });
        trace!(?id, %piece, "animation started");
        id
    }

    /// Cancel and drop an animation. Returns `false` if it was not running.
    pub fn cancel(&mut self, id: AnimationId) -> bool {
        match self.running.remove(&id) {
            Some(mut running) => {
                running.animation.cancel();
                true
            }
            None => false,
        }
    }

    /// Advance every animation and drop the finished ones. Returns how many
    /// finished.
    pub fn tick(&mut self, elapsed_ms: u64) -> usize {
        let before = self.running.len();
        self.running
            .retain(|_, running| !running.animation.tick(elapsed_ms));
        before - self.running.len()
    }

    pub fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// The newest running animation of `piece`, for drawing.
    pub fn animation_for(&self, piece: PieceId) -> Option<&dyn Animation> {
        self.running
            .values()
            .rev()
            .find(|running| running.piece == piece)
            .map(|running| &*running.animation)
    }
}

impl AsMut<Animator> for Animator {
    fn as_mut(&mut self) -> &mut Animator {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn slide() -> LinearAnimation {
        LinearAnimation::new(Coordinate::new(0, 0), Coordinate::new(2, 0), 300, 100, 4)
    }

    #[test]
    fn linear_animation_interpolates_and_cycles_images() {
        let mut anim = slide();
        assert_eq!(anim.position(), [0.0, 0.0]);

        assert!(!anim.tick(150));
        assert_eq!(anim.position(), [1.0, 0.0]);
        assert_eq!(anim.frame(), 1);

        assert!(anim.tick(150));
        assert_eq!(anim.position(), [2.0, 0.0]);
        assert_eq!(anim.frame(), 3);
    }

    #[test]
    fn image_index_wraps() {
        let mut anim =
            LinearAnimation::new(Coordinate::new(0, 0), Coordinate::new(0, 1), 1_000, 100, 4);
        anim.tick(450);
        assert_eq!(anim.frame(), 0);
    }

    #[test]
    fn cancel_snaps_to_finish_and_is_idempotent() {
        let mut anim = slide();
        anim.tick(50);
        anim.cancel();
        assert!(anim.is_finished());
        assert_eq!(anim.position(), [2.0, 0.0]);
        anim.cancel();
        assert!(anim.is_finished());
    }

    #[test]
    fn zero_travel_is_immediately_finished() {
        let anim =
            LinearAnimation::new(Coordinate::new(1, 1), Coordinate::new(1, 2), 0, 100, 1);
        assert!(anim.is_finished());
        assert_eq!(anim.position(), [1.0, 2.0]);
    }

    #[test]
    fn animator_drops_finished_animations() {
        let mut animator = Animator::new();
        let mut log: CheckpointLog<Animator> = CheckpointLog::new();
        let piece = PieceId::new(0);
        animator.start(&mut log, piece, Box::new(slide()));

        assert!(animator.is_animating());
        assert!(animator.animation_for(piece).is_some());
        assert_eq!(animator.tick(299), 0);
        assert_eq!(animator.tick(1), 1);
        assert!(!animator.is_animating());
    }

    #[test]
    fn undo_cancels_a_started_animation() {
        let mut animator = Animator::new();
        let mut log: CheckpointLog<Animator> = CheckpointLog::new();
        let id = animator.start(&mut log, PieceId::new(3), Box::new(slide()));
        assert_eq!(log.len(), 1);

        log.undo_to_index(&mut animator, 0).unwrap();
        assert!(animator.is_empty());
        assert!(!animator.cancel(id));
    }

    #[test]
    fn animation_for_prefers_the_newest() {
        let mut animator = Animator::new();
        let mut log: CheckpointLog<Animator> = CheckpointLog::new();
        let piece = PieceId::new(1);
        animator.start(&mut log, piece, Box::new(slide()));
        let newer =
            LinearAnimation::new(Coordinate::new(5, 5), Coordinate::new(6, 5), 300, 100, 1);
        animator.start(&mut log, piece, Box::new(newer));

        let shown = animator.animation_for(piece).unwrap();
        assert_eq!(shown.position(), [5.0, 5.0]);
    }
}
