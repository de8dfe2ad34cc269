//! Error types for the Fives engine.
//!
//! Two families are kept apart:
//! - `PlacementError`: a game-rule violation for a staged placement. These are returned as
//!   values so a front end can show them; they never abort a call.
//! - `GameError`: a precondition or data error (calling before setup, bad external records,
//!   committing a tile the player does not hold). These propagate to the caller via `?`.

use crate::engine::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a staged placement was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementError {
    #[error("position {position} is outside the board")]
    OutOfBounds { position: Position },
    #[error("position {position} is already occupied")]
    PositionOccupied { position: Position },
    #[error("another tile is already staged at {position}")]
    StagedConflict { position: Position },
    #[error("the first tile must be placed on or next to the center")]
    MustStartAtCenter,
    #[error("position {position} does not touch any tile")]
    NotConnected { position: Position },
    #[error("tiles placed in one turn must share a row or a column")]
    NotInLine,
    #[error("the line of placed tiles has a gap at {position}")]
    GapInLine { position: Position },
    #[error("tile {tile_id} is staged more than once")]
    DuplicateTile { tile_id: String },
    #[error("tile {tile_id} is not in the current player's hand")]
    TileNotInHand { tile_id: String },
    #[error("no tiles were staged")]
    EmptyTurn,
}

/// Hard failures of engine operations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("game has not been initialized")]
    NotInitialized,
    #[error("game is already finished")]
    GameFinished,
    #[error("invalid game options: {0}")]
    InvalidOptions(String),
    #[error("tile {tile_id} is not in the current player's hand")]
    TileNotInHand { tile_id: String },
    #[error("tile {tile_id} does not exist in this game")]
    TileNotFound { tile_id: String },
    #[error("tile value {0} is outside 0..=9")]
    InvalidTileValue(u8),
    #[error("invalid external record: {0}")]
    InvalidRecord(String),
    #[error("illegal placement: {0}")]
    IllegalPlacement(#[from] PlacementError),
}

/// Failures while loading `GameOptions`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}
