//! Move search for hints and automated players.
//!
//! Candidates are generated from the current player's hand and the empty cells that can
//! legally receive a tile (the center cross on an empty board, otherwise cells touching the
//! board). Everything here is a pure function of the state.

use crate::engine::{GameState, Position, TilePlacement, CENTER};
use crate::scoring::SequenceScorer;
use crate::validator::PlacementValidator;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How an automated player picks its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Best single tile, then keep adding tiles while the score improves.
    Greedy,
    /// The first legal single tile found, in hand order then board order.
    FirstLegal,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Greedy => f.write_str("greedy"),
            Strategy::FirstLegal => f.write_str("first-legal"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Strategy::Greedy),
            "first-legal" | "first" => Ok(Strategy::FirstLegal),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Empty, on-board cells next to anything committed or staged. On an empty board with
/// nothing staged this is the center and its four neighbours.
fn frontier(state: &GameState, staged: &[TilePlacement]) -> BTreeSet<Position> {
    let staged_cells: BTreeSet<Position> = staged.iter().map(|p| p.position).collect();
    let is_free = |pos: &Position| {
        pos.in_bounds() && !state.board.is_occupied(*pos) && !staged_cells.contains(pos)
    };

    if state.board.is_empty() && staged.is_empty() {
        return std::iter::once(CENTER)
            .chain(CENTER.neighbors())
            .filter(is_free)
            .collect();
    }

    state
        .board
        .iter()
        .map(|(pos, _)| pos)
        .chain(staged_cells.iter().copied())
        .flat_map(Position::neighbors)
        .filter(is_free)
        .collect()
}

/// Every single-tile placement the current player could make on its own.
pub fn legal_single_placements(
    state: &GameState,
    validator: &PlacementValidator,
) -> Vec<TilePlacement> {
    let Some(player) = state.current_player() else {
        return Vec::new();
    };
    let cells = frontier(state, &[]);

    let mut placements = Vec::new();
    for tile in &player.hand {
        for &pos in &cells {
            let candidate = TilePlacement::new(tile.unique_id.clone(), pos);
            if validator
                .validate(state, &candidate, std::slice::from_ref(&candidate))
                .is_ok()
            {
                placements.push(candidate);
            }
        }
    }
    placements
}

/// The single placement with the highest immediate score. On a tie the first generated wins.
///
/// # Returns
/// `None` when the current player has no legal single-tile move.
pub fn best_single_placement(
    state: &GameState,
    validator: &PlacementValidator,
    scorer: &SequenceScorer,
) -> Option<(TilePlacement, u32)> {
    let mut best: Option<(TilePlacement, u32)> = None;
    for candidate in legal_single_placements(state, validator) {
        let score = scorer.score(state, std::slice::from_ref(&candidate));
        if best.as_ref().map_or(true, |(_, b)| score > *b) {
            best = Some((candidate, score));
        }
    }
    best
}

/// Builds a multi-tile turn greedily.
///
/// Starts from `best_single_placement` and repeatedly adds the tile that raises the turn's
/// score the most while the whole batch still passes `validate_turn`. Stops as soon as no
/// addition improves the score. Returns an empty turn when nothing is playable.
pub fn greedy_turn(
    state: &GameState,
    validator: &PlacementValidator,
    scorer: &SequenceScorer,
) -> Vec<TilePlacement> {
    let Some((first, mut best_score)) = best_single_placement(state, validator, scorer) else {
        return Vec::new();
    };
    let Some(player) = state.current_player() else {
        return Vec::new();
    };

    let mut turn = vec![first];
    loop {
        // Only cells next to the board or the tiles already chosen can extend the turn.
        let cells = frontier(state, &turn);
        let mut best_extension: Option<(TilePlacement, u32)> = None;

        for tile in player
            .hand
            .iter()
            .filter(|t| turn.iter().all(|p| p.tile_id != t.unique_id))
        {
            for &pos in &cells {
                // The whole batch must still be a legal turn, not just the new tile.
                let mut trial = turn.clone();
                trial.push(TilePlacement::new(tile.unique_id.clone(), pos));
                if validator.validate_turn(state, &trial).is_err() {
                    continue;
                }
                let score = scorer.score(state, &trial);
                let improves = score > best_score
                    && best_extension.as_ref().map_or(true, |(_, b)| score > *b);
                if improves {
                    best_extension = trial.pop().map(|p| (p, score));
                }
            }
        }

        // Stop at the first round where nothing improves the score.
        match best_extension {
            Some((placement, score)) => {
                turn.push(placement);
                best_score = score;
            }
            None => break,
        }
    }
    turn
}

/// Picks a turn for the current player. An empty result means "pass".
pub fn choose_turn(
    strategy: Strategy,
    state: &GameState,
    validator: &PlacementValidator,
    scorer: &SequenceScorer,
) -> Vec<TilePlacement> {
    match strategy {
        Strategy::Greedy => greedy_turn(state, validator, scorer),
        Strategy::FirstLegal => legal_single_placements(state, validator)
            .into_iter()
            .take(1)
            .collect(),
    }
}
