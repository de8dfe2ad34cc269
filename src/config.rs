//! Game options.
//!
//! Options are plain serde data so a front end or the binaries can load them from JSON.
//! Every field has a default, so `{}` is a valid config.

use crate::engine::{PlayerColor, TOTAL_TILES};
use crate::error::{ConfigError, GameError};
use crate::scoring::ScoringMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = PlayerColor::ALL.len();
pub const DEFAULT_TILES_PER_PLAYER: usize = 5;

/// What a commit does with a placement whose tile is not in the mover's hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTilePolicy {
    /// Drop the placement and keep going (logged as a warning).
    Skip,
    /// Fail the whole commit with `GameError::TileNotInHand`.
    #[default]
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// Seat order; colours are handed out in `PlayerColor::ALL` order.
    pub player_names: Vec<String>,
    /// Hand size dealt at the start and refilled to after each turn.
    pub tiles_per_player: usize,
    pub scoring_mode: ScoringMode,
    pub missing_tile_policy: MissingTilePolicy,
    /// Require each turn's tiles to form one gap-free row or column.
    pub enforce_line_rule: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        GameOptions {
            player_names: vec!["Player 1".to_string(), "Player 2".to_string()],
            tiles_per_player: DEFAULT_TILES_PER_PLAYER,
            scoring_mode: ScoringMode::default(),
            missing_tile_policy: MissingTilePolicy::default(),
            enforce_line_rule: false,
        }
    }
}

impl GameOptions {
    pub fn with_players<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GameOptions {
            player_names: names.into_iter().map(Into::into).collect(),
            ..GameOptions::default()
        }
    }

    /// Parses options from a JSON document.
    ///
    /// ```
    /// use fives_engine::config::{GameOptions, MissingTilePolicy};
    /// let json = r#"{ "tiles_per_player": 6, "missing_tile_policy": "skip" }"#;
    /// let options = GameOptions::from_json_str(json).unwrap();
    /// assert_eq!(options.tiles_per_player, 6);
    /// assert_eq!(options.missing_tile_policy, MissingTilePolicy::Skip);
    /// assert_eq!(options.player_names.len(), 2);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Checks that a game can actually be dealt with these options.
    pub fn validate(&self) -> Result<(), GameError> {
        let players = self.player_names.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
            return Err(GameError::InvalidOptions(format!(
                "expected {} to {} players, got {}",
                MIN_PLAYERS, MAX_PLAYERS, players
            )));
        }
        if self.tiles_per_player == 0 {
            return Err(GameError::InvalidOptions(
                "tiles_per_player must be at least 1".to_string(),
            ));
        }
        // Every hand has to be dealt in full from one set.
        if self.tiles_per_player * players > TOTAL_TILES {
            return Err(GameError::InvalidOptions(format!(
                "cannot deal {} tiles to {} players from a set of {}",
                self.tiles_per_player, players, TOTAL_TILES
            )));
        }
        Ok(())
    }
}
