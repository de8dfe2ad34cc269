//! Sequence scoring.
//!
//! A sequence is the maximal run of contiguous tiles along one axis through a cell. A run
//! of length `n >= 2` with face values summing to `s` is worth `s * n`; a single tile is
//! worth nothing on that axis. Each newly placed tile is scored on both axes.

use crate::engine::{Board, GameState, Position, TilePlacement};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    fn step(self) -> (i32, i32) {
        match self {
            Axis::Horizontal => (1, 0),
            Axis::Vertical => (0, 1),
        }
    }
}

/// How the per-tile scores of a multi-tile turn are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Every placed tile scores its own row and column. A run shared by several tiles of the
    /// same turn is therefore counted once per tile.
    #[default]
    PerPlacement,
    /// Every distinct run touched by the turn is counted exactly once.
    UniqueSequences,
}

/// A contiguous run of tiles read in board order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub axis: Axis,
    /// First cell of the run (leftmost or topmost).
    pub start: Position,
    pub values: Vec<u8>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn sum(&self) -> u32 {
        self.values.iter().map(|&v| v as u32).sum()
    }

    /// `sum * length`, or 0 for runs shorter than two tiles.
    pub fn score(&self) -> u32 {
        if self.len() < 2 {
            0
        } else {
            self.sum() * self.len() as u32
        }
    }
}

/// Extracts the maximal run through `pos` along `axis`.
///
/// Walks backward while cells are occupied, then forward, and stitches the two halves
/// around the center tile. Returns an empty sequence when `pos` itself is empty or off
/// the board. The walk never leaves the board.
pub fn sequence_at(board: &Board, pos: Position, axis: Axis) -> Sequence {
    let center = match board.get(pos) {
        Some(tile) if pos.in_bounds() => tile,
        _ => {
            return Sequence {
                axis,
                start: pos,
                values: Vec::new(),
            }
        }
    };
    let (dx, dy) = axis.step();
    let tile_at = |cell: Position| board.get(cell).filter(|_| cell.in_bounds());

    // Walk back to the first tile of the run.
    let mut backward = Vec::new();
    let mut start = pos;
    let mut cursor = pos.offset(-dx, -dy);
    while let Some(tile) = tile_at(cursor) {
        backward.push(tile.value.get());
        start = cursor;
        cursor = cursor.offset(-dx, -dy);
    }

    // Values were collected back to front.
    let mut values: Vec<u8> = backward.into_iter().rev().collect();
    values.push(center.value.get());

    // Then forward to the last one.
    let mut cursor = pos.offset(dx, dy);
    while let Some(tile) = tile_at(cursor) {
        values.push(tile.value.get());
        cursor = cursor.offset(dx, dy);
    }

    Sequence {
        axis,
        start,
        values,
    }
}

/// Scores hypothetical placements against a game state. Pure: nothing outside the call
/// is touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceScorer {
    mode: ScoringMode,
}

impl SequenceScorer {
    pub fn new(mode: ScoringMode) -> Self {
        SequenceScorer { mode }
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Total points the placements would earn.
    ///
    /// # Examples
    /// ```
    /// use fives_engine::engine::{
    ///     GameState, Player, PlayerColor, Position, Tile, TileLocation, TilePlacement, TileValue,
    /// };
    /// use fives_engine::scoring::SequenceScorer;
    ///
    /// let mut player = Player::new(PlayerColor::Red, "A");
    /// player.receive(Tile::new(TileValue::new(3).unwrap(), "three", TileLocation::DrawPile));
    /// let mut state = GameState::new(vec![player]);
    /// state.board.place(
    ///     Position::new(7, 7),
    ///     Tile::new(TileValue::new(2).unwrap(), "two", TileLocation::DrawPile),
    /// );
    ///
    /// let placement = TilePlacement::new("three", Position::new(7, 8));
    /// // [2, 3]: sum 5, length 2.
    /// assert_eq!(SequenceScorer::default().score(&state, &[placement]), 10);
    /// ```
    pub fn score(&self, state: &GameState, placements: &[TilePlacement]) -> u32 {
        self.scored_sequences(state, placements)
            .iter()
            .map(Sequence::score)
            .sum()
    }

    /// The runs that contribute points, in the order they are counted.
    ///
    /// Under `PerPlacement` a run shows up once for every placed tile it passes through.
    pub fn scored_sequences(
        &self,
        state: &GameState,
        placements: &[TilePlacement],
    ) -> Vec<Sequence> {
        let (board, placed) = board_with_placements(state, placements);

        let mut seen = HashSet::new();
        let mut sequences = Vec::new();
        for pos in placed {
            for axis in Axis::BOTH {
                let sequence = sequence_at(&board, pos, axis);
                if sequence.len() < 2 {
                    continue;
                }
                // A run is identified by its axis and first cell.
                if self.mode == ScoringMode::UniqueSequences
                    && !seen.insert((sequence.axis, sequence.start))
                {
                    continue;
                }
                sequences.push(sequence);
            }
        }
        sequences
    }
}

/// Copies the committed board and lays the placements on top.
///
/// Tiles are looked up by id anywhere in the game. Placements naming an unknown tile or an
/// off-board cell are dropped; the returned positions are the ones actually laid.
fn board_with_placements(
    state: &GameState,
    placements: &[TilePlacement],
) -> (Board, Vec<Position>) {
    let mut board = state.board.clone();
    let mut placed = Vec::with_capacity(placements.len());
    for placement in placements.iter().filter(|p| p.position.in_bounds()) {
        if let Some(tile) = state.find_tile(&placement.tile_id) {
            board.place(placement.position, tile.clone());
            placed.push(placement.position);
        }
    }
    (board, placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Player, PlayerColor, Tile, TileLocation, TileValue};
    use crate::utils::board_from_str_array;

    fn state_with(board_rows: &[&str], hand: &[(&str, u8)]) -> GameState {
        let mut player = Player::new(PlayerColor::Red, "A");
        for (id, value) in hand {
            player.receive(Tile::new(
                TileValue::new(*value).unwrap(),
                *id,
                TileLocation::DrawPile,
            ));
        }
        let mut state = GameState::new(vec![player]);
        state.board = board_from_str_array(board_rows).unwrap();
        state
    }

    fn rows_with(row7: &'static str) -> Vec<&'static str> {
        let mut rows = vec![""; 7];
        rows.push(row7);
        rows
    }

    #[test]
    fn test_sequence_score_rule() {
        let single = Sequence {
            axis: Axis::Horizontal,
            start: Position::new(0, 0),
            values: vec![9],
        };
        assert_eq!(single.score(), 0);

        let pair = Sequence {
            axis: Axis::Horizontal,
            start: Position::new(0, 0),
            values: vec![2, 3],
        };
        assert_eq!(pair.score(), 10);

        let triple = Sequence {
            axis: Axis::Vertical,
            start: Position::new(0, 0),
            values: vec![1, 2, 4],
        };
        assert_eq!(triple.score(), 21);
    }

    #[test]
    fn test_sequence_at_walks_both_ways() {
        let board = board_from_str_array(&rows_with("....123.45")).unwrap();
        let seq = sequence_at(&board, Position::new(5, 7), Axis::Horizontal);
        assert_eq!(seq.values, vec![1, 2, 3]);
        assert_eq!(seq.start, Position::new(4, 7));

        let vertical = sequence_at(&board, Position::new(5, 7), Axis::Vertical);
        assert_eq!(vertical.values, vec![2]);

        let empty = sequence_at(&board, Position::new(0, 0), Axis::Horizontal);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_basic_pair_scores_ten() {
        let state = state_with(&rows_with(".......2"), &[("three", 3)]);
        let placement = TilePlacement::new("three", Position::new(7, 8));
        assert_eq!(SequenceScorer::default().score(&state, &[placement]), 10);
    }

    #[test]
    fn test_lone_tile_scores_zero() {
        let state = state_with(&rows_with(".......2"), &[("three", 3)]);
        let placement = TilePlacement::new("three", Position::new(1, 1));
        assert_eq!(SequenceScorer::default().score(&state, &[placement]), 0);
    }

    #[test]
    fn test_cross_scoring_counts_both_axes() {
        // 1 to the left of the target cell, 4 above it.
        let mut rows = vec![""; 6];
        rows.push(".......4");
        rows.push("......1");
        let state = state_with(&rows, &[("five", 5)]);
        let placement = TilePlacement::new("five", Position::new(7, 7));
        // Row: [1,5] -> 12. Column: [4,5] -> 18.
        assert_eq!(SequenceScorer::default().score(&state, &[placement]), 30);
    }

    #[test]
    fn test_shared_sequence_is_double_counted_per_placement() {
        let state = state_with(&rows_with(".......2"), &[("a", 3), ("b", 4)]);
        let placements = [
            TilePlacement::new("a", Position::new(8, 7)),
            TilePlacement::new("b", Position::new(9, 7)),
        ];
        // Row [2,3,4]: sum 9, length 3 -> 27, counted for each of the two new tiles.
        assert_eq!(
            SequenceScorer::new(ScoringMode::PerPlacement).score(&state, &placements),
            54
        );
        assert_eq!(
            SequenceScorer::new(ScoringMode::UniqueSequences).score(&state, &placements),
            27
        );
    }

    #[test]
    fn test_scored_sequences_lists_contributors() {
        let state = state_with(&rows_with(".......2"), &[("a", 3)]);
        let placements = [TilePlacement::new("a", Position::new(8, 7))];
        let sequences = SequenceScorer::default().scored_sequences(&state, &placements);
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].axis, Axis::Horizontal);
        assert_eq!(sequences[0].values, vec![2, 3]);
    }

    #[test]
    fn test_unknown_tile_is_ignored() {
        let state = state_with(&rows_with(".......2"), &[]);
        let placement = TilePlacement::new("ghost", Position::new(8, 7));
        assert_eq!(SequenceScorer::default().score(&state, &[placement]), 0);
    }

    #[test]
    fn test_off_board_placements_are_ignored() {
        let state = state_with(&rows_with(".......2"), &[("a", 3)]);
        let scorer = SequenceScorer::default();
        for position in [
            Position::new(i32::MAX, 0),
            Position::new(i32::MIN, i32::MIN),
            Position::new(15, 7),
        ] {
            let placement = TilePlacement::new("a", position);
            assert_eq!(scorer.score(&state, &[placement]), 0, "{}", position);
        }
    }

    #[test]
    fn test_sequence_walk_stays_on_board() {
        let mut board = board_from_str_array(&rows_with("12")).unwrap();
        let stray = |value| {
            Tile::new(TileValue::new(value).unwrap(), "stray", TileLocation::DrawPile)
        };
        board.place(Position::new(-1, 7), stray(9));
        board.place(Position::new(i32::MAX, 0), stray(9));

        let run = sequence_at(&board, Position::new(0, 7), Axis::Horizontal);
        assert_eq!(run.start, Position::new(0, 7));
        assert_eq!(run.values, vec![1, 2]);

        assert!(sequence_at(&board, Position::new(i32::MAX, 0), Axis::Horizontal).is_empty());
    }

    #[test]
    fn test_score_does_not_touch_state() {
        let state = state_with(&rows_with(".......2"), &[("a", 3)]);
        let before = state.clone();
        let placements = [TilePlacement::new("a", Position::new(8, 7))];
        let scorer = SequenceScorer::default();
        let first = scorer.score(&state, &placements);
        assert_eq!(scorer.score(&state, &placements), first);
        assert_eq!(state, before);
    }
}
