//! Per-frame player input.
//!
//! Input is reduced to plain data before it reaches the game, so frames can
//! be recorded and replayed.

use pushbox_grid::coordinate::Direction;
use serde::{Deserialize, Serialize};

/// Which arrow keys are held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    /// Only `direction` held.
    pub fn pressing(direction: Direction) -> Self {
        let mut keys = Self::default();
        match direction {
            Direction::Up => keys.up = true,
            Direction::Down => keys.down = true,
            Direction::Left => keys.left = true,
            Direction::Right => keys.right = true,
        }
        keys
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// The single direction these keys ask for. With several keys held the
    /// first of up, down, right, left wins.
    pub fn direction(&self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|&d| self.is_held(d))
    }
}

/// Everything the player asked for in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    pub keys: KeyState,
    /// Undo the last move.
    pub undo: bool,
    /// Redo the next undone move.
    pub redo: bool,
}

impl InputFrame {
    /// A frame holding only `direction`.
    pub fn press(direction: Direction) -> Self {
        Self {
            keys: KeyState::pressing(direction),
            ..Self::default()
        }
    }

    pub fn undo_request() -> Self {
        Self {
            undo: true,
            ..Self::default()
        }
    }

    pub fn redo_request() -> Self {
        Self {
            redo: true,
            ..Self::default()
        }
    }

    /// Whether nothing at all was asked for.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_priority_is_up_down_right_left() {
        let all = KeyState {
            up: true,
            down: true,
            left: true,
            right: true,
        };
        assert_eq!(all.direction(), Some(Direction::Up));

        let no_up = KeyState { up: false, ..all };
        assert_eq!(no_up.direction(), Some(Direction::Down));

        let sideways = KeyState {
            left: true,
            right: true,
            ..KeyState::default()
        };
        assert_eq!(sideways.direction(), Some(Direction::Right));

        assert_eq!(KeyState::default().direction(), None);
    }

    #[test]
    fn pressing_round_trips_through_direction() {
        for d in Direction::ALL {
            assert_eq!(KeyState::pressing(d).direction(), Some(d));
        }
    }

    #[test]
    fn empty_frames() {
        assert!(InputFrame::default().is_empty());
        assert!(!InputFrame::undo_request().is_empty());
        assert!(!InputFrame::press(Direction::Left).is_empty());
    }
}
