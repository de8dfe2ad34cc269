//! Mirroring an externally owned game.
//!
//! When the authoritative game lives elsewhere (for instance on a ledger), the engine is
//! rebuilt from an `ExternalGameRecord`. Records carry raw face values, not tile identities,
//! so ids are synthesized and the draw pile cannot be recovered; it comes back empty.
//! Outgoing moves go the other way as lossy `LedgerMove` triples.

use crate::config::{MAX_PLAYERS, MIN_PLAYERS};
use crate::engine::{
    GamePhase, GameState, Player, PlayerColor, Position, Tile, TileLocation, TilePlacement,
    TileValue,
};
use crate::error::GameError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPlayer {
    pub name: String,
    #[serde(default)]
    pub score: u32,
    /// Face values only.
    pub hand: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalBoardTile {
    pub x: i32,
    pub y: i32,
    pub value: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalGameRecord {
    pub players: Vec<ExternalPlayer>,
    #[serde(default)]
    pub board: Vec<ExternalBoardTile>,
    #[serde(default)]
    pub current_player_index: usize,
    #[serde(default = "default_turn_number")]
    pub turn_number: u32,
    #[serde(default)]
    pub game_over: bool,
}

fn default_turn_number() -> u32 {
    1
}

impl ExternalGameRecord {
    /// Builds an engine snapshot from the record.
    ///
    /// Seats get colours in `PlayerColor::ALL` order. Hand tiles are named
    /// `ext-hand-<seat>-<i>` and board tiles `ext-board-<x>-<y>`.
    pub fn to_game_state(&self) -> Result<GameState, GameError> {
        // Seats first: the player index is checked against them.
        let count = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::InvalidRecord(format!(
                "expected {} to {} players, got {}",
                MIN_PLAYERS, MAX_PLAYERS, count
            )));
        }
        if self.current_player_index >= count {
            return Err(GameError::InvalidRecord(format!(
                "current player index {} out of range for {} players",
                self.current_player_index, count
            )));
        }

        // Hands carry face values only, so every tile gets a synthesized id.
        let mut players = Vec::with_capacity(count);
        for (seat, (external, color)) in self.players.iter().zip(PlayerColor::ALL).enumerate() {
            let mut player = Player::new(color, external.name.clone());
            player.score = external.score;
            for (i, &raw) in external.hand.iter().enumerate() {
                let value = TileValue::try_from(raw)?;
                player.receive(Tile::new(
                    value,
                    format!("ext-hand-{}-{}", seat, i),
                    TileLocation::DrawPile,
                ));
            }
            players.push(player);
        }

        let mut state = GameState::new(players);
        state.current_player_index = self.current_player_index;
        state.turn_number = self.turn_number;

        // Board cells must be on the board and distinct.
        for cell in &self.board {
            let pos = Position::new(cell.x, cell.y);
            if !pos.in_bounds() {
                return Err(GameError::InvalidRecord(format!(
                    "board tile at {} is off the board",
                    pos
                )));
            }
            let value = TileValue::try_from(cell.value)?;
            let tile = Tile::new(
                value,
                format!("ext-board-{}-{}", cell.x, cell.y),
                TileLocation::Board { position: pos },
            );
            if state.board.place(pos, tile).is_some() {
                return Err(GameError::InvalidRecord(format!(
                    "two board tiles at {}",
                    pos
                )));
            }
        }

        // The record decides whether the game is over; the draw pile is unknown.
        if self.game_over {
            state.phase = GamePhase::Finished;
            state.winner = state.leading_player().map(|p| p.color);
        }

        Ok(state)
    }
}

/// A placement stripped down to what a ledger stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMove {
    pub value: u8,
    pub x: i32,
    pub y: i32,
}

/// Converts placements to `{value, x, y}` triples. Tile identity is lost.
pub fn to_ledger_moves(
    state: &GameState,
    placements: &[TilePlacement],
) -> Result<Vec<LedgerMove>, GameError> {
    placements
        .iter()
        .map(|placement| {
            let tile = state
                .find_tile(&placement.tile_id)
                .ok_or_else(|| GameError::TileNotFound {
                    tile_id: placement.tile_id.clone(),
                })?;
            Ok(LedgerMove {
                value: tile.value.get(),
                x: placement.position.x,
                y: placement.position.y,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json() -> &'static str {
        r#"{
            "players": [
                { "name": "Ann", "score": 12, "hand": [1, 2, 3] },
                { "name": "Bob", "score": 40, "hand": [9] }
            ],
            "board": [
                { "x": 7, "y": 7, "value": 5 },
                { "x": 7, "y": 8, "value": 0 }
            ],
            "currentPlayerIndex": 1,
            "turnNumber": 6
        }"#
    }

    #[test]
    fn test_record_to_state() {
        let record: ExternalGameRecord = serde_json::from_str(record_json()).unwrap();
        let state = record.to_game_state().unwrap();

        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[0].color, PlayerColor::Red);
        assert_eq!(state.players[1].color, PlayerColor::Blue);
        assert_eq!(state.players[0].hand_values(), vec![1, 2, 3]);
        assert_eq!(state.players[1].score, 40);
        assert_eq!(state.current_player_index, 1);
        assert_eq!(state.turn_number, 6);
        assert_eq!(state.board.len(), 2);
        assert!(state.draw_pile.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(
            state.players[0].hand[2].location,
            TileLocation::Hand {
                owner: PlayerColor::Red
            }
        );
        assert_eq!(state.players[0].hand[2].unique_id, "ext-hand-0-2");
    }

    #[test]
    fn test_finished_record_picks_winner() {
        let mut record: ExternalGameRecord = serde_json::from_str(record_json()).unwrap();
        record.game_over = true;
        let state = record.to_game_state().unwrap();
        assert_eq!(state.phase, GamePhase::Finished);
        assert_eq!(state.winner, Some(PlayerColor::Blue));
    }

    #[test]
    fn test_record_rejections() {
        let base: ExternalGameRecord = serde_json::from_str(record_json()).unwrap();

        let mut bad_value = base.clone();
        bad_value.players[0].hand.push(10);
        assert!(matches!(
            bad_value.to_game_state(),
            Err(GameError::InvalidTileValue(10))
        ));

        let mut off_board = base.clone();
        off_board.board.push(ExternalBoardTile { x: 15, y: 0, value: 1 });
        assert!(matches!(
            off_board.to_game_state(),
            Err(GameError::InvalidRecord(_))
        ));

        let mut duplicate = base.clone();
        duplicate.board.push(ExternalBoardTile { x: 7, y: 7, value: 1 });
        assert!(matches!(
            duplicate.to_game_state(),
            Err(GameError::InvalidRecord(_))
        ));

        let mut bad_index = base.clone();
        bad_index.current_player_index = 2;
        assert!(bad_index.to_game_state().is_err());

        let mut lonely = base;
        lonely.players.truncate(1);
        lonely.current_player_index = 0;
        assert!(lonely.to_game_state().is_err());
    }

    #[test]
    fn test_to_ledger_moves() {
        let record: ExternalGameRecord = serde_json::from_str(record_json()).unwrap();
        let state = record.to_game_state().unwrap();
        let placements = [
            TilePlacement::new("ext-hand-0-1", Position::new(8, 7)),
            TilePlacement::new("ext-hand-0-2", Position::new(9, 7)),
        ];
        let moves = to_ledger_moves(&state, &placements).unwrap();
        assert_eq!(
            moves,
            vec![
                LedgerMove { value: 2, x: 8, y: 7 },
                LedgerMove { value: 3, x: 9, y: 7 },
            ]
        );

        let json = serde_json::to_string(&moves[0]).unwrap();
        assert_eq!(json, r#"{"value":2,"x":8,"y":7}"#);

        let missing = [TilePlacement::new("nope", Position::new(0, 0))];
        assert!(matches!(
            to_ledger_moves(&state, &missing),
            Err(GameError::TileNotFound { .. })
        ));
    }
}
