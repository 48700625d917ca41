//! The checkpoint log: paired undo/redo entries, a cursor, and labels.
//!
//! Entries `[0, cursor)` have been applied forward. Entries `[cursor, len)`
//! exist only after an undo and form the redo-able future; registering a new
//! entry discards them and prunes every label position that pointed into
//! them.
//!
//! # Labels
//!
//! A label maps to a sorted set of distinct cursor positions. Saving a label
//! at a position it already holds is a no-op. [`CheckpointLog::undo`] walks
//! back to the latest recorded position strictly before the cursor;
//! [`CheckpointLog::redo`] walks forward to the earliest position after it.
//!
//! # Replay
//!
//! While replaying, logging is switched off so the effects of undo/redo
//! actions are never recorded as new history. The previous `enabled` state is
//! restored afterwards.
//!
//! # Example
//!
//! ```
//! use pushbox_undo::prelude::*;
//!
//! let mut counter = 0i32;
//! let mut log: CheckpointLog<i32> = CheckpointLog::new();
//!
//! for _ in 0..5 {
//!     counter += 1;
//!     log.register(Effect::new(|c: &mut i32| *c -= 1, |c: &mut i32| *c += 1));
//! }
//! assert_eq!(log.len(), 5);
//!
//! log.undo_to_index(&mut counter, 2).unwrap();
//! assert_eq!(counter, 2);
//! assert!(log.undo_to_index(&mut counter, 3).is_err());
//!
//! log.redo_to_index(&mut counter, 5).unwrap();
//! assert_eq!(counter, 5);
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::action::{Effect, Reversible};
use crate::label::Label;
use crate::UndoError;

// ---------------------------------------------------------------------------
// CheckpointLog
// ---------------------------------------------------------------------------

/// Append-only undo/redo history over a context `C`.
///
/// The log owns every registered action. It is single-owner and
/// single-threaded: all registration and replay must happen on the thread
/// that owns the context.
pub struct CheckpointLog<C: ?Sized> {
    /// Registered actions in application order.
    entries: Vec<Box<dyn Reversible<C>>>,
    /// Number of entries currently applied forward.
    cursor: usize,
    /// Sorted, distinct cursor positions recorded under each label.
    labels: HashMap<Label, Vec<usize>>,
    /// When `false`, `register` and `save_label` do nothing.
    enabled: bool,
    /// Next value handed out by [`fresh_label`](Self::fresh_label).
    next_token: u64,
}

impl<C: ?Sized> CheckpointLog<C> {
    /// Create an empty, enabled log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            labels: HashMap::new(),
            enabled: true,
            next_token: 0,
        }
    }

    // -- recording ----------------------------------------------------------

    /// Append an action to the history.
    ///
    /// If the cursor is behind the end (an undo happened), the redo-able
    /// future is discarded first and every label loses the positions that
    /// pointed past the cursor. Does nothing while the log is disabled.
    pub fn register<R>(&mut self, action: R)
    where
        R: Reversible<C> + 'static,
    {
        if !self.enabled {
            return;
        }

        if self.cursor < self.entries.len() {
            let discarded = self.entries.len() - self.cursor;
            self.entries.truncate(self.cursor);
            let cursor = self.cursor;
            for positions in self.labels.values_mut() {
                let keep = positions.partition_point(|&p| p <= cursor);
                positions.truncate(keep);
            }
            trace!(cursor, discarded, "discarded redo history");
        }

        self.entries.push(Box::new(action));
        self.cursor += 1;
    }

    /// Register a side effect that can only be cancelled.
    ///
    /// Undo runs `cancel`; redo does nothing.
    pub fn register_cancel(&mut self, cancel: impl Fn(&mut C) + 'static)
    where
        C: 'static,
    {
        self.register(Effect::cancel(cancel));
    }

    /// Record the current cursor under `label`.
    ///
    /// Creates the label if needed. A position already recorded is not
    /// recorded twice. Does nothing while the log is disabled.
    pub fn save_label(&mut self, label: impl Into<Label>) {
        if !self.enabled {
            return;
        }
        let cursor = self.cursor;
        let positions = self.labels.entry(label.into()).or_default();
        if let Err(slot) = positions.binary_search(&cursor) {
            positions.insert(slot, cursor);
        }
    }

    /// Forget a label. Returns `true` if it existed.
    pub fn delete_label(&mut self, label: impl Into<Label>) -> bool {
        self.labels.remove(&label.into()).is_some()
    }

    /// Hand out a label that no other caller of this log will ever receive.
    pub fn fresh_label(&mut self) -> Label {
        let token = self.next_token;
        self.next_token += 1;
        Label::Token(token)
    }

    // -- label navigation ---------------------------------------------------

    /// Undo back to the latest position recorded under `label` that lies
    /// strictly before the cursor.
    ///
    /// A position equal to the cursor is skipped ("already here"). Returns
    /// `false` and does nothing if the label is unknown or has no such
    /// position.
    pub fn undo(&mut self, ctx: &mut C, label: impl Into<Label>) -> bool {
        match self.undo_target(&label.into()) {
            Some(target) => {
                self.rewind(ctx, target);
                true
            }
            None => false,
        }
    }

    /// Redo forward to the earliest position recorded under `label` that
    /// lies after the cursor.
    ///
    /// Returns `false` and does nothing if there is no such position.
    pub fn redo(&mut self, ctx: &mut C, label: impl Into<Label>) -> bool {
        match self.redo_target(&label.into()) {
            Some(target) => {
                self.fast_forward(ctx, target);
                true
            }
            None => false,
        }
    }

    /// Whether [`undo`](Self::undo) with this label would move the cursor.
    pub fn can_undo(&self, label: impl Into<Label>) -> bool {
        self.undo_target(&label.into()).is_some()
    }

    /// Whether [`redo`](Self::redo) with this label would move the cursor.
    pub fn can_redo(&self, label: impl Into<Label>) -> bool {
        self.redo_target(&label.into()).is_some()
    }

    fn undo_target(&self, label: &Label) -> Option<usize> {
        let positions = self.labels.get(label)?;
        let reachable = &positions[..positions.partition_point(|&p| p <= self.cursor)];
        match reachable {
            [.., previous, last] if *last == self.cursor => Some(*previous),
            [.., last] if *last != self.cursor => Some(*last),
            _ => None,
        }
    }

    fn redo_target(&self, label: &Label) -> Option<usize> {
        let positions = self.labels.get(label)?;
        let ahead = positions.partition_point(|&p| p <= self.cursor);
        positions.get(ahead).copied()
    }

    // -- index navigation ---------------------------------------------------

    /// Undo every entry from the cursor back to `target`, latest first.
    ///
    /// `undo_to_index(ctx, 0)` undoes the whole history.
    ///
    /// # Errors
    ///
    /// [`UndoError::AheadOfCursor`] if `target` is greater than the cursor.
    pub fn undo_to_index(&mut self, ctx: &mut C, target: usize) -> Result<(), UndoError> {
        if target > self.cursor {
            return Err(UndoError::AheadOfCursor {
                target,
                cursor: self.cursor,
            });
        }
        self.rewind(ctx, target);
        Ok(())
    }

    /// Redo every entry from the cursor up to `target`, earliest first.
    ///
    /// # Errors
    ///
    /// - [`UndoError::BeyondHistory`] if `target` exceeds the history length.
    /// - [`UndoError::BehindCursor`] if `target` is less than the cursor.
    pub fn redo_to_index(&mut self, ctx: &mut C, target: usize) -> Result<(), UndoError> {
        if target > self.entries.len() {
            return Err(UndoError::BeyondHistory {
                target,
                len: self.entries.len(),
            });
        }
        if target < self.cursor {
            return Err(UndoError::BehindCursor {
                target,
                cursor: self.cursor,
            });
        }
        self.fast_forward(ctx, target);
        Ok(())
    }

    fn rewind(&mut self, ctx: &mut C, target: usize) {
        let was_enabled = std::mem::replace(&mut self.enabled, false);
        for entry in self.entries[target..self.cursor].iter().rev() {
            entry.undo(ctx);
        }
        self.enabled = was_enabled;
        trace!(from = self.cursor, to = target, "undo");
        self.cursor = target;
    }

    fn fast_forward(&mut self, ctx: &mut C, target: usize) {
        let was_enabled = std::mem::replace(&mut self.enabled, false);
        for entry in &self.entries[self.cursor..target] {
            entry.redo(ctx);
        }
        self.enabled = was_enabled;
        trace!(from = self.cursor, to = target, "redo");
        self.cursor = target;
    }

    // -- accessors ----------------------------------------------------------

    /// Number of entries applied forward.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total number of entries, including the redo-able future.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether registration and label saves currently take effect.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch recording on or off, e.g. while building a level.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Positions recorded under `label`, in increasing order.
    pub fn label_positions(&self, label: impl Into<Label>) -> Option<&[usize]> {
        self.labels.get(&label.into()).map(Vec::as_slice)
    }

    /// Number of labels currently tracked.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Drop all entries and labels and reset the cursor.
    ///
    /// Tokens from [`fresh_label`](Self::fresh_label) keep increasing.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.labels.clear();
        self.cursor = 0;
    }
}

impl<C: ?Sized> Default for CheckpointLog<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> fmt::Debug for CheckpointLog<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointLog")
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("labels", &self.labels)
            .field("enabled", &self.enabled)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- helpers ------------------------------------------------------------

    /// The action for "`value` was pushed onto the witness".
    fn pushed(value: i32) -> Effect<Vec<i32>> {
        Effect::new(
            |w: &mut Vec<i32>| {
                w.pop();
            },
            move |w: &mut Vec<i32>| w.push(value),
        )
    }

    fn push(log: &mut CheckpointLog<Vec<i32>>, witness: &mut Vec<i32>, value: i32) {
        witness.push(value);
        log.register(pushed(value));
    }

    // -- label navigation ---------------------------------------------------

    #[test]
    fn undo_redo_walks_saved_positions() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];

        log.save_label("saved");
        for v in 1..=3 {
            push(&mut log, &mut ls, v);
            log.save_label("saved");
        }

        assert!(log.undo(&mut ls, "saved"));
        assert_eq!(ls, vec![1, 2]);
        assert!(log.undo(&mut ls, "saved"));
        assert_eq!(ls, vec![1]);
        assert!(log.undo(&mut ls, "saved"));
        assert_eq!(ls, Vec::<i32>::new());
        assert!(!log.undo(&mut ls, "saved"));
        assert_eq!(ls, Vec::<i32>::new());

        assert!(log.redo(&mut ls, "saved"));
        assert_eq!(ls, vec![1]);
        assert!(log.redo(&mut ls, "saved"));
        assert_eq!(ls, vec![1, 2]);
        assert!(log.redo(&mut ls, "saved"));
        assert_eq!(ls, vec![1, 2, 3]);
        assert!(!log.redo(&mut ls, "saved"));
        assert_eq!(ls, vec![1, 2, 3]);
    }

    #[test]
    fn new_action_after_undo_replaces_future() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];

        log.save_label("saved");
        for v in 1..=3 {
            push(&mut log, &mut ls, v);
            log.save_label("saved");
        }
        log.undo(&mut ls, "saved");
        log.undo(&mut ls, "saved");
        assert_eq!(ls, vec![1]);

        push(&mut log, &mut ls, 4);
        log.save_label("saved");
        assert_eq!(log.label_positions("saved"), Some(&[0, 1, 2][..]));

        assert!(!log.redo(&mut ls, "saved"));
        assert_eq!(ls, vec![1, 4]);

        log.undo(&mut ls, "saved");
        assert_eq!(ls, vec![1]);
        log.undo(&mut ls, "saved");
        assert_eq!(ls, Vec::<i32>::new());

        log.redo(&mut ls, "saved");
        assert_eq!(ls, vec![1]);
        log.redo(&mut ls, "saved");
        assert_eq!(ls, vec![1, 4]);
        assert!(!log.redo(&mut ls, "saved"));
    }

    #[test]
    fn unknown_label_is_a_noop() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        push(&mut log, &mut ls, 1);

        assert!(!log.undo(&mut ls, "missing"));
        assert!(!log.redo(&mut ls, "missing"));
        assert_eq!(ls, vec![1]);
        assert_eq!(log.cursor(), 1);
    }

    #[test]
    fn undo_skips_marker_at_cursor() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];

        // Only marker is "here": nothing to do.
        log.save_label("x");
        assert!(!log.can_undo("x"));
        assert!(!log.undo(&mut ls, "x"));

        push(&mut log, &mut ls, 1);
        push(&mut log, &mut ls, 2);
        // Marker behind the cursor, none at it.
        assert!(log.undo(&mut ls, "x"));
        assert_eq!(log.cursor(), 0);
        assert!(ls.is_empty());
    }

    #[test]
    fn redo_picks_earliest_position_ahead() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        for v in 1..=4 {
            push(&mut log, &mut ls, v);
            log.save_label("x");
        }
        log.undo_to_index(&mut ls, 0).unwrap();
        assert!(log.can_redo("x"));
        log.redo(&mut ls, "x");
        assert_eq!(log.cursor(), 1);
        assert_eq!(ls, vec![1]);
    }

    #[test]
    fn labels_are_independent() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];

        log.save_label("coarse");
        log.save_label("fine");
        push(&mut log, &mut ls, 1);
        log.save_label("fine");
        push(&mut log, &mut ls, 2);
        log.save_label("fine");
        log.save_label("coarse");

        log.undo(&mut ls, "fine");
        assert_eq!(ls, vec![1]);
        log.redo(&mut ls, "fine");
        log.undo(&mut ls, "coarse");
        assert!(ls.is_empty());
    }

    // -- label bookkeeping --------------------------------------------------

    #[test]
    fn save_label_is_idempotent_at_a_cursor() {
        let mut log: CheckpointLog<Vec<i32>> = CheckpointLog::new();
        for _ in 0..10 {
            log.save_label("x");
        }
        assert_eq!(log.label_positions("x"), Some(&[0][..]));
    }

    #[test]
    fn save_label_after_undo_keeps_positions_sorted() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        push(&mut log, &mut ls, 1);
        push(&mut log, &mut ls, 2);
        push(&mut log, &mut ls, 3);
        log.save_label("x");
        log.undo_to_index(&mut ls, 1).unwrap();
        log.save_label("x");
        assert_eq!(log.label_positions("x"), Some(&[1, 3][..]));

        // Redo to 3 is still reachable through the label.
        assert!(log.redo(&mut ls, "x"));
        assert_eq!(ls, vec![1, 2, 3]);
    }

    #[test]
    fn register_prunes_labels_past_cursor() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        for v in 1..=4 {
            push(&mut log, &mut ls, v);
            log.save_label("x");
        }
        log.undo_to_index(&mut ls, 2).unwrap();
        push(&mut log, &mut ls, 9);

        assert_eq!(log.label_positions("x"), Some(&[1, 2][..]));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn delete_label_forgets_positions() {
        let mut log: CheckpointLog<Vec<i32>> = CheckpointLog::new();
        log.save_label("x");
        assert!(log.delete_label("x"));
        assert!(!log.delete_label("x"));
        assert_eq!(log.label_positions("x"), None);
        assert_eq!(log.label_count(), 0);
    }

    #[test]
    fn fresh_labels_are_unique() {
        let mut log: CheckpointLog<()> = CheckpointLog::new();
        let a = log.fresh_label();
        let b = log.fresh_label();
        log.clear();
        let c = log.fresh_label();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    // -- index navigation ---------------------------------------------------

    #[test]
    fn undo_to_index_runs_latest_first() {
        let mut log: CheckpointLog<Vec<&'static str>> = CheckpointLog::new();
        let mut trace = Vec::new();
        log.register(Effect::new(|t: &mut Vec<&'static str>| t.push("undo a"), |_| {}));
        log.register(Effect::new(|t: &mut Vec<&'static str>| t.push("undo b"), |_| {}));
        log.register(Effect::new(|t: &mut Vec<&'static str>| t.push("undo c"), |_| {}));

        log.undo_to_index(&mut trace, 0).unwrap();
        assert_eq!(trace, vec!["undo c", "undo b", "undo a"]);
    }

    #[test]
    fn undo_to_index_ahead_of_cursor_errors() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        push(&mut log, &mut ls, 1);

        let err = log.undo_to_index(&mut ls, 2).unwrap_err();
        assert_eq!(err, UndoError::AheadOfCursor { target: 2, cursor: 1 });
        assert_eq!(ls, vec![1]);
    }

    #[test]
    fn redo_to_index_bounds() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        push(&mut log, &mut ls, 1);
        push(&mut log, &mut ls, 2);
        log.undo_to_index(&mut ls, 1).unwrap();

        assert_eq!(
            log.redo_to_index(&mut ls, 3).unwrap_err(),
            UndoError::BeyondHistory { target: 3, len: 2 }
        );
        assert_eq!(
            log.redo_to_index(&mut ls, 0).unwrap_err(),
            UndoError::BehindCursor { target: 0, cursor: 1 }
        );
        log.redo_to_index(&mut ls, 1).unwrap();
        assert_eq!(ls, vec![1]);
        log.redo_to_index(&mut ls, 2).unwrap();
        assert_eq!(ls, vec![1, 2]);
    }

    #[test]
    fn truncated_future_cannot_be_redone() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        for v in 0..5 {
            push(&mut log, &mut ls, v);
        }
        log.undo_to_index(&mut ls, 2).unwrap();
        push(&mut log, &mut ls, 20);

        assert_eq!(log.len(), 3);
        assert!(matches!(
            log.redo_to_index(&mut ls, 5),
            Err(UndoError::BeyondHistory { .. })
        ));
        log.undo_to_index(&mut ls, 0).unwrap();
        log.redo_to_index(&mut ls, 3).unwrap();
        assert_eq!(ls, vec![0, 1, 20]);
    }

    // -- enabled flag -------------------------------------------------------

    #[test]
    fn disabled_log_ignores_register_and_save() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        log.set_enabled(false);
        push(&mut log, &mut ls, 1);
        log.save_label("x");

        assert!(log.is_empty());
        assert_eq!(log.label_positions("x"), None);

        log.set_enabled(true);
        push(&mut log, &mut ls, 2);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn replay_restores_previous_enabled_state() {
        let mut log = CheckpointLog::new();
        let mut ls = vec![];
        push(&mut log, &mut ls, 1);

        log.undo_to_index(&mut ls, 0).unwrap();
        assert!(log.is_enabled());

        log.set_enabled(false);
        log.redo_to_index(&mut ls, 1).unwrap();
        assert!(!log.is_enabled());
    }

    #[test]
    fn register_cancel_has_noop_redo() {
        let mut log: CheckpointLog<bool> = CheckpointLog::new();
        let mut playing = true;
        log.register_cancel(|p: &mut bool| *p = false);

        log.undo_to_index(&mut playing, 0).unwrap();
        assert!(!playing);
        log.redo_to_index(&mut playing, 1).unwrap();
        assert!(!playing);
    }
}
