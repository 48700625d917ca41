//! Game tuning loaded from JSON.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change:
//!
//! ```
//! use pushbox_engine::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "walk_speed_ms": 150 }"#).unwrap();
//! assert_eq!(config.walk_speed_ms, 150);
//! assert_eq!(config.image_phase_ms, 100);
//! ```

use pushbox_undo::label::Label;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default milliseconds a walk (or push) across one cell takes.
pub const DEFAULT_WALK_SPEED_MS: u64 = 300;

/// Default milliseconds each animation image stays on screen.
pub const DEFAULT_IMAGE_PHASE_MS: u64 = 100;

/// Label under which every completed player move is saved.
pub const DEFAULT_UNDO_LABEL: &str = "player_move";

/// Rejected configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("image_phase_ms must be positive")]
    ZeroImagePhase,

    #[error("player_frames must be at least 1")]
    NoPlayerFrames,

    #[error("undo_label must not be empty")]
    EmptyUndoLabel,
}

/// Tuning knobs for a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Milliseconds a piece takes to slide one cell. Zero makes moves
    /// instantaneous.
    pub walk_speed_ms: u64,
    /// Milliseconds per animation image.
    pub image_phase_ms: u64,
    /// Number of images in a player's walk cycle.
    pub player_frames: usize,
    /// Label saved after every frame in which a player moved.
    pub undo_label: String,
    /// Frames between state-hash checkpoints when recording a replay.
    /// Zero records a checkpoint on every frame.
    pub replay_checkpoint_interval: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            walk_speed_ms: DEFAULT_WALK_SPEED_MS,
            image_phase_ms: DEFAULT_IMAGE_PHASE_MS,
            player_frames: 4,
            undo_label: DEFAULT_UNDO_LABEL.to_owned(),
            replay_checkpoint_interval: 10,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        if let Err(err) = config.validate() {
            warn!(%err, "rejected game config");
            return Err(err);
        }
        Ok(config)
    }

    /// Check the values the engine divides by or keys on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_phase_ms == 0 {
            return Err(ConfigError::ZeroImagePhase);
        }
        if self.player_frames == 0 {
            return Err(ConfigError::NoPlayerFrames);
        }
        if self.undo_label.is_empty() {
            return Err(ConfigError::EmptyUndoLabel);
        }
        Ok(())
    }

    /// The undo label as a log key.
    pub fn undo_label(&self) -> Label {
        Label::named(self.undo_label.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.walk_speed_ms, 300);
        assert_eq!(config.undo_label(), Label::named("player_move"));
    }

    #[test]
    fn empty_object_gives_defaults() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "image_phase_ms": 0 }"#),
            Err(ConfigError::ZeroImagePhase)
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "player_frames": 0 }"#),
            Err(ConfigError::NoPlayerFrames)
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "undo_label": "" }"#),
            Err(ConfigError::EmptyUndoLabel)
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            GameConfig::from_json_str("{ walk_speed_ms: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn config_serialization_roundtrip() {
        let config = GameConfig {
            walk_speed_ms: 0,
            ..GameConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GameConfig::from_json_str(&json).unwrap(), config);
    }
}
