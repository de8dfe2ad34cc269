//! Placement legality.
//!
//! `PlacementValidator::validate` judges one staged placement against the committed board
//! and the other placements staged in the same turn. It is local and does not
//! look at the batch as a whole. `validate_turn` layers the turn-level checks on top
//! (hand membership, duplicates, and optionally the straight-line law).

use crate::engine::{GameState, Position, TilePlacement, CENTER};
use crate::error::PlacementError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome shape handed to front ends: `{ "valid": bool, "error": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PlacementError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        ValidationResult {
            valid: true,
            error: None,
        }
    }
}

impl From<Result<(), PlacementError>> for ValidationResult {
    fn from(result: Result<(), PlacementError>) -> Self {
        match result {
            Ok(()) => ValidationResult::ok(),
            Err(error) => ValidationResult {
                valid: false,
                error: Some(error),
            },
        }
    }
}

/// Stateless rule checker. The only knob is whether `validate_turn` enforces the
/// straight-line law.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementValidator {
    enforce_line_rule: bool,
}

impl PlacementValidator {
    pub fn new() -> Self {
        PlacementValidator::default()
    }

    pub fn with_line_rule(enforce_line_rule: bool) -> Self {
        PlacementValidator { enforce_line_rule }
    }

    pub fn enforces_line_rule(&self) -> bool {
        self.enforce_line_rule
    }

    /// Checks one staged placement.
    ///
    /// `all_placements` is everything staged this turn; it may or may not contain
    /// `placement` itself. Entries carrying the same tile id as `placement` are ignored.
    ///
    /// The checks run in order and the first failure is returned:
    /// 1. the cell is on the board,
    /// 2. the cell is empty on the committed board,
    /// 3. no other staged tile targets the cell,
    /// 4. on an empty board with nothing else staged, the cell is on or next to the center,
    /// 5. otherwise the cell touches a committed tile or another staged tile.
    ///
    /// # Examples
    /// ```
    /// use fives_engine::engine::{GameState, Position, TilePlacement};
    /// use fives_engine::error::PlacementError;
    /// use fives_engine::validator::PlacementValidator;
    ///
    /// let state = GameState::new(Vec::new());
    /// let validator = PlacementValidator::new();
    ///
    /// let opening = TilePlacement::new("t", Position::new(7, 8));
    /// assert!(validator.validate(&state, &opening, &[opening.clone()]).is_ok());
    ///
    /// let far = TilePlacement::new("t", Position::new(5, 5));
    /// assert_eq!(
    ///     validator.validate(&state, &far, &[far.clone()]),
    ///     Err(PlacementError::MustStartAtCenter)
    /// );
    /// ```
    pub fn validate(
        &self,
        state: &GameState,
        placement: &TilePlacement,
        all_placements: &[TilePlacement],
    ) -> Result<(), PlacementError> {
        let position = placement.position;

        if !position.in_bounds() {
            return Err(PlacementError::OutOfBounds { position });
        }

        if state.board.is_occupied(position) {
            return Err(PlacementError::PositionOccupied { position });
        }

        let others: Vec<&TilePlacement> = all_placements
            .iter()
            .filter(|p| p.tile_id != placement.tile_id)
            .collect();

        if others.iter().any(|p| p.position == position) {
            return Err(PlacementError::StagedConflict { position });
        }

        if state.board.is_empty() && others.is_empty() {
            if position.manhattan_distance(CENTER) > 1 {
                return Err(PlacementError::MustStartAtCenter);
            }
            return Ok(());
        }

        let connected = position.neighbors().iter().any(|n| {
            state.board.is_occupied(*n) || others.iter().any(|p| p.position == *n)
        });
        if !connected {
            return Err(PlacementError::NotConnected { position });
        }

        Ok(())
    }

    /// Checks a whole turn before it is committed.
    ///
    /// On top of `validate` for every placement this rejects empty turns, tiles staged twice
    /// and tiles the current player does not hold. When the line rule is enabled the tiles
    /// must also share a row or column, leave no empty cell between the outermost tiles, and
    /// touch the committed board whenever the board is not empty.
    pub fn validate_turn(
        &self,
        state: &GameState,
        placements: &[TilePlacement],
    ) -> Result<(), PlacementError> {
        if placements.is_empty() {
            return Err(PlacementError::EmptyTurn);
        }

        let mut seen = HashSet::new();
        for placement in placements {
            if !seen.insert(placement.tile_id.as_str()) {
                return Err(PlacementError::DuplicateTile {
                    tile_id: placement.tile_id.clone(),
                });
            }
        }

        for placement in placements {
            let in_hand = state
                .current_player()
                .map_or(false, |p| p.has_tile(&placement.tile_id));
            if !in_hand {
                return Err(PlacementError::TileNotInHand {
                    tile_id: placement.tile_id.clone(),
                });
            }
            self.validate(state, placement, placements)?;
        }

        if self.enforce_line_rule {
            check_straight_line(state, placements)?;
        }

        Ok(())
    }
}

/// The straight-line law: one row or one column, no holes, anchored to the board.
fn check_straight_line(
    state: &GameState,
    placements: &[TilePlacement],
) -> Result<(), PlacementError> {
    let first = placements[0].position;

    // All tiles on one row, or all on one column. A single tile is both.
    let same_row = placements.iter().all(|p| p.position.y == first.y);
    let same_col = placements.iter().all(|p| p.position.x == first.x);

    if !same_row && !same_col {
        return Err(PlacementError::NotInLine);
    }

    // Every cell between the outermost tiles, along the shared line.
    let staged: HashSet<Position> = placements.iter().map(|p| p.position).collect();
    let span: Vec<Position> = if same_row {
        let min = placements.iter().map(|p| p.position.x).min().unwrap_or(first.x);
        let max = placements.iter().map(|p| p.position.x).max().unwrap_or(first.x);
        (min..=max).map(|x| Position::new(x, first.y)).collect()
    } else {
        let min = placements.iter().map(|p| p.position.y).min().unwrap_or(first.y);
        let max = placements.iter().map(|p| p.position.y).max().unwrap_or(first.y);
        (min..=max).map(|y| Position::new(first.x, y)).collect()
    };

    // Committed tiles may fill the span; empty cells may not.
    if let Some(hole) = span
        .iter()
        .find(|pos| !staged.contains(*pos) && !state.board.is_occupied(**pos))
    {
        return Err(PlacementError::GapInLine { position: *hole });
    }

    // Once the board has tiles, the line has to build on them.
    if !state.board.is_empty() {
        let anchored = span.iter().any(|pos| {
            state.board.is_occupied(*pos)
                || pos.neighbors().iter().any(|n| state.board.is_occupied(*n))
        });
        if !anchored {
            return Err(PlacementError::NotConnected { position: first });
        }
    }

    Ok(())
}
