//! # Fives Engine
//!
//! Rules engine for Fives, a numbered-tile placement game played on a 15x15 grid.
//! Players take turns placing tiles from their hands; every placement scores the
//! horizontal and vertical runs of tiles it joins.
//!
//! It is used by two binaries:
//! - `fives_player`: hot-seat play in the terminal, with score previews and undo.
//! - `fives_autoplay`: plays whole games with automated strategies and reports the result.
//!
//! ## Modules
//! - `engine`: positions, tile values, tiles, the board, players and the game state snapshot.
//! - `validator`: `PlacementValidator`, which decides whether staged tiles may be placed.
//! - `scoring`: `SequenceScorer` and run extraction along an axis.
//! - `manager`: `GameStateManager`, which owns the live game (setup, turns, refills, undo).
//! - `sync`: rebuilding a game from an external record and emitting ledger moves.
//! - `config`: `GameOptions`, loadable from JSON.
//! - `error`: error types shared by the modules above.
//! - `solver`: candidate move generation and simple strategies.
//! - `utils`: helpers such as parsing boards from strings.

pub mod config;
pub mod engine;
pub mod error;
pub mod manager;
pub mod scoring;
pub mod solver;
pub mod sync;
pub mod utils;
pub mod validator;

// Items are reached through their module path, e.g. `fives_engine::manager::GameStateManager`.
