//! Turn orchestration.
//!
//! `GameStateManager` owns one game session: the current `GameState`, a history of earlier
//! snapshots for undo, and the rule components configured from `GameOptions`. Each
//! concurrent game gets its own manager; there is no shared or global state.
//!
//! The state-changing steps are also exposed as pure functions (`apply_move`,
//! `refill_hand`) that take a snapshot and return a new one.

use crate::config::{GameOptions, MissingTilePolicy};
use crate::engine::{
    build_tile_set, GamePhase, GameState, Player, PlayerColor, Tile, TilePlacement,
};
use crate::error::{GameError, PlacementError};
use crate::scoring::SequenceScorer;
use crate::sync::{to_ledger_moves, ExternalGameRecord, LedgerMove};
use crate::validator::{PlacementValidator, ValidationResult};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Commits the current player's placements and returns the next snapshot.
///
/// 1. The state is cloned; `state` itself is never modified.
/// 2. Each placed tile moves from the mover's hand onto the board. A tile that is not in the
///    hand is skipped or rejected according to `policy`.
/// 3. The applied placements are scored against the pre-move state and added to the mover.
/// 4. The turn passes to the next seat and `turn_number` goes up by one.
/// 5. If the end condition holds, the game is marked finished with its winner.
///
/// Adjacency and the line rule are not checked here, but a tile is never put off the board
/// or on a cell that is already taken: such a placement fails the whole commit with
/// `GameError::IllegalPlacement` and nothing changes. Hands are not refilled here.
pub fn apply_move(
    state: &GameState,
    placements: &[TilePlacement],
    scorer: &SequenceScorer,
    policy: MissingTilePolicy,
) -> Result<GameState, GameError> {
    // Work on a copy; returning early with an error discards it.
    let mut next = state.clone();
    let mover = next.current_player_index;
    let player = next
        .players
        .get_mut(mover)
        .ok_or_else(|| GameError::InvalidRecord(format!("no player at seat {}", mover)))?;

    let mut applied: Vec<TilePlacement> = Vec::with_capacity(placements.len());
    for placement in placements {
        match player.take_tile(&placement.tile_id) {
            Some(tile) => {
                // Never overwrite a cell: the tile already there would leave the game.
                let position = placement.position;
                if !position.in_bounds() {
                    return Err(PlacementError::OutOfBounds { position }.into());
                }
                if applied.iter().any(|p| p.position == position) {
                    return Err(PlacementError::StagedConflict { position }.into());
                }
                if next.board.is_occupied(position) {
                    return Err(PlacementError::PositionOccupied { position }.into());
                }
                next.board.place(position, tile);
                applied.push(placement.clone());
            }
            None => match policy {
                MissingTilePolicy::Skip => {
                    warn!(tile_id = %placement.tile_id, "skipping placement of tile not in hand");
                }
                MissingTilePolicy::Reject => {
                    return Err(GameError::TileNotInHand {
                        tile_id: placement.tile_id.clone(),
                    });
                }
            },
        }
    }

    // Score against the pre-move state so the scorer lays the tiles itself.
    let gained = scorer.score(state, &applied);
    next.players[mover].score += gained;

    // Hand over to the next seat.
    next.current_player_index = (mover + 1) % next.players.len();
    next.turn_number += 1;

    debug!(
        seat = mover,
        placed = applied.len(),
        gained,
        turn = next.turn_number,
        "turn committed"
    );

    // End of game is checked after every commit, before any refill.
    if next.finish_if_over() {
        info!(winner = ?next.winner, "game finished");
    }

    Ok(next)
}

/// Draws from the top of the pile into a player's hand until it holds `capacity` tiles or the
/// pile runs out. Returns the new snapshot and the number of tiles drawn.
pub fn refill_hand(
    state: &GameState,
    player_index: usize,
    capacity: usize,
) -> Result<(GameState, usize), GameError> {
    let mut next = state.clone();
    let player = next
        .players
        .get_mut(player_index)
        .ok_or_else(|| GameError::InvalidRecord(format!("no player at seat {}", player_index)))?;

    // Drawing stops at capacity or when the pile runs dry.
    let wanted = capacity.saturating_sub(player.hand.len());
    let drawn = wanted.min(next.draw_pile.len());
    for tile in next.draw_pile.drain(..drawn) {
        player.receive(tile);
    }

    if drawn > 0 {
        debug!(seat = player_index, drawn, left = next.draw_pile.len(), "hand refilled");
    }
    if next.phase == GamePhase::Playing && next.finish_if_over() {
        info!(winner = ?next.winner, "game finished");
    }

    Ok((next, drawn))
}

/// What happened in a full turn played through `GameStateManager::play_turn`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub player: PlayerColor,
    pub tiles_placed: usize,
    pub points: u32,
    pub tiles_drawn: usize,
    pub game_over: bool,
}

/// Owns one game session.
///
/// # Examples
/// ```
/// use fives_engine::config::GameOptions;
/// use fives_engine::manager::GameStateManager;
///
/// let mut manager = GameStateManager::new(GameOptions::with_players(["Ann", "Bob"]));
/// assert!(manager.state().is_err()); // nothing dealt yet
///
/// let state = manager.initialize_game().unwrap();
/// assert_eq!(state.players[0].hand.len(), 5);
/// assert_eq!(state.draw_pile.len(), 30);
///
/// manager.pass_turn().unwrap();
/// assert_eq!(manager.current_player().unwrap().name, "Bob");
/// assert!(manager.undo_last_move());
/// assert_eq!(manager.current_player().unwrap().name, "Ann");
/// ```
#[derive(Clone, Debug)]
pub struct GameStateManager {
    options: GameOptions,
    validator: PlacementValidator,
    scorer: SequenceScorer,
    state: Option<GameState>,
    history: Vec<GameState>,
}

impl GameStateManager {
    pub fn new(options: GameOptions) -> Self {
        GameStateManager {
            validator: PlacementValidator::with_line_rule(options.enforce_line_rule),
            scorer: SequenceScorer::new(options.scoring_mode),
            options,
            state: None,
            history: Vec::new(),
        }
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn validator(&self) -> &PlacementValidator {
        &self.validator
    }

    pub fn scorer(&self) -> &SequenceScorer {
        &self.scorer
    }

    /// Deals a fresh game using the thread-local RNG.
    pub fn initialize_game(&mut self) -> Result<&GameState, GameError> {
        self.initialize_game_with_rng(&mut rand::thread_rng())
    }

    /// Deals a fresh game with the given RNG, so tests can seed it.
    ///
    /// The 40 tiles are shuffled, each player in seat order receives `tiles_per_player`
    /// tiles from the top, and the rest become the draw pile. Any previous game and its
    /// history are discarded.
    #[instrument(skip(self, rng), fields(players = self.options.player_names.len()))]
    pub fn initialize_game_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&GameState, GameError> {
        self.options.validate()?;

        let mut tiles = build_tile_set();
        tiles.shuffle(rng);

        let per_player = self.options.tiles_per_player;
        let mut deck = tiles.into_iter();
        let mut players = Vec::with_capacity(self.options.player_names.len());
        for (name, color) in self.options.player_names.iter().zip(PlayerColor::ALL) {
            let mut player = Player::new(color, name.clone());
            for tile in deck.by_ref().take(per_player) {
                player.receive(tile);
            }
            players.push(player);
        }

        let mut state = GameState::new(players);
        state.draw_pile = deck.collect();

        info!(
            players = state.players.len(),
            draw_pile = state.draw_pile.len(),
            "game initialized"
        );

        self.history.clear();
        Ok(self.state.insert(state))
    }

    pub fn state(&self) -> Result<&GameState, GameError> {
        self.state.as_ref().ok_or(GameError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Checks one staged placement against the current state.
    pub fn validate_placement(
        &self,
        placement: &TilePlacement,
        all_placements: &[TilePlacement],
    ) -> Result<ValidationResult, GameError> {
        let state = self.state()?;
        Ok(self
            .validator
            .validate(state, placement, all_placements)
            .into())
    }

    /// Checks a whole staged turn (hand membership, duplicates, line rule when enabled).
    pub fn validate_turn(
        &self,
        placements: &[TilePlacement],
    ) -> Result<ValidationResult, GameError> {
        let state = self.state()?;
        Ok(self.validator.validate_turn(state, placements).into())
    }

    /// Points the placements would earn right now.
    pub fn calculate_score(&self, placements: &[TilePlacement]) -> Result<u32, GameError> {
        let state = self.state()?;
        Ok(self.scorer.score(state, placements))
    }

    /// Commits placements for the current player without checking placement rules.
    ///
    /// See `apply_move` for the exact steps.
    pub fn apply_placements(
        &mut self,
        placements: &[TilePlacement],
    ) -> Result<&GameState, GameError> {
        let state = self.playing_state()?;
        let next = apply_move(
            state,
            placements,
            &self.scorer,
            self.options.missing_tile_policy,
        )?;
        Ok(self.advance(next))
    }

    /// Ends the current player's turn without placing anything.
    pub fn pass_turn(&mut self) -> Result<&GameState, GameError> {
        self.apply_placements(&[])
    }

    /// Draws tiles for a player up to `tiles_per_player`. Returns how many were drawn.
    ///
    /// Fails with `GameError::GameFinished` once the game is over.
    pub fn refill_hand(&mut self, player_index: usize) -> Result<usize, GameError> {
        let state = self.playing_state()?;
        let (next, drawn) = refill_hand(state, player_index, self.options.tiles_per_player)?;
        self.advance(next);
        Ok(drawn)
    }

    /// Plays a complete turn for the current player.
    ///
    /// The batch is checked with `validate_turn`; an illegal batch is returned as
    /// `GameError::IllegalPlacement` and nothing changes. Otherwise the placements are
    /// committed and the mover's hand is refilled. The whole turn is one undo step.
    #[instrument(skip(self, placements), fields(tiles = placements.len()))]
    pub fn play_turn(&mut self, placements: &[TilePlacement]) -> Result<TurnSummary, GameError> {
        let state = self.playing_state()?;
        self.validator.validate_turn(state, placements)?;

        let mover = state.current_player_index;
        let before = state.players[mover].score;
        let committed = apply_move(
            state,
            placements,
            &self.scorer,
            self.options.missing_tile_policy,
        )?;
        let (next, tiles_drawn) = refill_hand(&committed, mover, self.options.tiles_per_player)?;

        let summary = TurnSummary {
            player: next.players[mover].color,
            tiles_placed: placements.len(),
            points: next.players[mover].score - before,
            tiles_drawn,
            game_over: next.phase == GamePhase::Finished,
        };
        self.advance(next);
        Ok(summary)
    }

    /// Reverts the most recent commit, refill or sync.
    ///
    /// # Returns
    /// * `true` if a snapshot was restored.
    /// * `false` if there is nothing to undo.
    pub fn undo_last_move(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.state = Some(previous);
                true
            }
            None => false,
        }
    }

    /// Replaces the current state with one rebuilt from an external record.
    pub fn sync_from_external(
        &mut self,
        record: &ExternalGameRecord,
    ) -> Result<&GameState, GameError> {
        let state = record.to_game_state()?;
        info!(
            players = state.players.len(),
            board = state.board.len(),
            turn = state.turn_number,
            "synced from external record"
        );
        Ok(self.advance(state))
    }

    /// Lossy `{value, x, y}` form of placements for an external ledger.
    pub fn to_ledger_moves(
        &self,
        placements: &[TilePlacement],
    ) -> Result<Vec<LedgerMove>, GameError> {
        to_ledger_moves(self.state()?, placements)
    }

    pub fn current_player(&self) -> Result<&Player, GameError> {
        let state = self.state()?;
        state.current_player().ok_or_else(|| {
            GameError::InvalidRecord(format!(
                "no player at seat {}",
                state.current_player_index
            ))
        })
    }

    pub fn player_hand(&self, color: PlayerColor) -> Result<&[Tile], GameError> {
        let state = self.state()?;
        state
            .player(color)
            .map(|p| p.hand.as_slice())
            .ok_or_else(|| GameError::InvalidRecord(format!("no {} player in this game", color)))
    }

    pub fn board_tiles(&self) -> Result<Vec<&Tile>, GameError> {
        Ok(self.state()?.board.tiles().collect())
    }

    pub fn scores(&self) -> Result<Vec<(PlayerColor, u32)>, GameError> {
        Ok(self
            .state()?
            .players
            .iter()
            .map(|p| (p.color, p.score))
            .collect())
    }

    pub fn is_game_over(&self) -> Result<bool, GameError> {
        Ok(self.state()?.is_game_over())
    }

    pub fn winner(&self) -> Result<Option<&Player>, GameError> {
        let state = self.state()?;
        Ok(state.winner.and_then(|color| state.player(color)))
    }

    /// Number of snapshots available to `undo_last_move`.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn playing_state(&self) -> Result<&GameState, GameError> {
        let state = self.state()?;
        if state.phase == GamePhase::Finished {
            return Err(GameError::GameFinished);
        }
        Ok(state)
    }

    fn advance(&mut self, next: GameState) -> &GameState {
        if let Some(previous) = self.state.take() {
            self.history.push(previous);
        }
        self.state.insert(next)
    }
}
