//! Reversible actions stored in the checkpoint log.
//!
//! A log entry is anything implementing [`Reversible`]: a pair of effects that
//! undo and redo one change to a context `C`. Closures are wrapped with
//! [`Effect`]; structured commands (such as grid moves) implement the trait
//! directly so they stay inspectable.

use std::fmt;

// ---------------------------------------------------------------------------
// Reversible
// ---------------------------------------------------------------------------

/// A change that can be reverted and re-applied against a context.
///
/// Implementations must be pure inverses of each other: `undo` is only ever
/// called after the forward change (or a `redo`) took effect, and `redo` only
/// after a matching `undo`. Neither may fail.
pub trait Reversible<C: ?Sized> {
    /// Revert the change.
    fn undo(&self, ctx: &mut C);

    /// Re-apply the change.
    fn redo(&self, ctx: &mut C);
}

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

type EffectFn<C> = Box<dyn Fn(&mut C)>;

/// A closure-backed [`Reversible`] action.
pub struct Effect<C: ?Sized> {
    undo: EffectFn<C>,
    redo: EffectFn<C>,
}

impl<C: ?Sized> Effect<C> {
    /// Pair an undo closure with a redo closure.
    pub fn new(undo: impl Fn(&mut C) + 'static, redo: impl Fn(&mut C) + 'static) -> Self {
        Self {
            undo: Box::new(undo),
            redo: Box::new(redo),
        }
    }

    /// An effect whose redo does nothing.
    ///
    /// Used for fire-and-forget side effects such as sounds, where undoing
    /// means silencing and redoing should not replay the effect.
    pub fn cancel(undo: impl Fn(&mut C) + 'static) -> Self {
        Self::new(undo, |_| {})
    }
}

impl<C: ?Sized> Reversible<C> for Effect<C> {
    fn undo(&self, ctx: &mut C) {
        (self.undo)(ctx)
    }

    fn redo(&self, ctx: &mut C) {
        (self.redo)(ctx)
    }
}

impl<C: ?Sized> fmt::Debug for Effect<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Effect(..)")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
