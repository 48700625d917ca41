//! Checkpoint label keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which a [`CheckpointLog`](crate::log::CheckpointLog) records
/// cursor positions.
///
/// Workflow labels such as `"player_move"` are [`Label::Named`]. Unique
/// per-attempt checkpoints come from
/// [`CheckpointLog::fresh_label`](crate::log::CheckpointLog::fresh_label) and
/// are [`Label::Token`]s, so nested attempts never collide with each other or
/// with a named label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// A caller-chosen name, re-saved many times over a session.
    Named(String),
    /// A unique token handed out by the log itself.
    Token(u64),
}

impl Label {
    /// Build a [`Label::Named`].
    pub fn named(name: impl Into<String>) -> Self {
        Label::Named(name.into())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Named(name) => f.write_str(name),
            Label::Token(token) => write!(f, "#{token}"),
        }
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::Named(name.to_owned())
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label::Named(name)
    }
}

impl From<&String> for Label {
    fn from(name: &String) -> Self {
        Label::Named(name.clone())
    }
}

impl From<&Label> for Label {
    fn from(label: &Label) -> Self {
        label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_token_never_collide() {
        assert_ne!(Label::named("0"), Label::Token(0));
        assert_eq!(Label::from("player_move"), Label::named("player_move"));
    }

    #[test]
    fn display() {
        assert_eq!(Label::named("player_move").to_string(), "player_move");
        assert_eq!(Label::Token(7).to_string(), "#7");
    }

    #[test]
    fn serialization_roundtrip() {
        let label = Label::Token(42);
        let json = serde_json::to_string(&label).unwrap();
        let back: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(label, back);
    }
}
