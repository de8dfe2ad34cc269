use anyhow::{Context, Result};
use clap::Parser;
use fives_engine::config::GameOptions;
use fives_engine::engine::PlayerColor;
use fives_engine::manager::GameStateManager;
use fives_engine::solver::{choose_turn, Strategy};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Plays Fives games between automated strategies.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// One strategy per seat, comma separated (greedy, first-legal)
    #[clap(short, long, value_delimiter = ',', default_value = "greedy,first-legal")]
    strategies: Vec<Strategy>,

    /// Number of games; game i is dealt with seed `seed + i`
    #[clap(short, long, default_value_t = 1)]
    games: u64,

    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Stop a game after this many turns
    #[clap(long, default_value_t = 500)]
    max_turns: u32,

    /// JSON file with game options; player names are replaced by the strategy names
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Print one JSON report per game instead of text
    #[clap(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Ending {
    Finished,
    /// Every player passed in a row.
    Stalled,
    TurnLimit,
}

#[derive(Debug, Serialize)]
struct SeatReport {
    color: PlayerColor,
    strategy: String,
    score: u32,
    tiles_left: usize,
}

#[derive(Debug, Serialize)]
struct GameReport {
    seed: u64,
    turns: u32,
    ending: Ending,
    winner: Option<PlayerColor>,
    seats: Vec<SeatReport>,
}

fn play_game(
    options: &GameOptions,
    strategies: &[Strategy],
    seed: u64,
    max_turns: u32,
) -> Result<GameReport> {
    let mut manager = GameStateManager::new(options.clone());
    manager.initialize_game_with_rng(&mut SmallRng::seed_from_u64(seed))?;

    let seats = strategies.len();
    let mut consecutive_passes = 0;
    let mut turns = 0;

    let ending = loop {
        if manager.is_game_over()? {
            break Ending::Finished;
        }
        if consecutive_passes >= seats {
            break Ending::Stalled;
        }
        if turns >= max_turns {
            break Ending::TurnLimit;
        }

        let state = manager.state()?;
        let seat = state.current_player_index;
        let strategy = strategies[seat % seats];
        let turn = choose_turn(strategy, state, manager.validator(), manager.scorer());

        if turn.is_empty() {
            debug!(seat, %strategy, "no move, passing");
            manager.pass_turn()?;
            consecutive_passes += 1;
        } else {
            match manager.play_turn(&turn) {
                Ok(summary) => {
                    debug!(
                        seat,
                        %strategy,
                        tiles = summary.tiles_placed,
                        points = summary.points,
                        "turn played"
                    );
                    consecutive_passes = 0;
                }
                Err(e) => {
                    warn!(
                        seat,
                        %strategy,
                        error = %e,
                        "strategy produced an illegal turn, passing"
                    );
                    manager.pass_turn()?;
                    consecutive_passes += 1;
                }
            }
        }
        turns += 1;
    };

    let state = manager.state()?;
    let winner = match ending {
        Ending::Finished => state.winner,
        _ => state.leading_player().map(|p| p.color),
    };
    info!(seed, turns, ?ending, ?winner, "game complete");

    Ok(GameReport {
        seed,
        turns,
        ending,
        winner,
        seats: state
            .players
            .iter()
            .zip(strategies)
            .map(|(player, strategy)| SeatReport {
                color: player.color,
                strategy: strategy.to_string(),
                score: player.score,
                tiles_left: player.hand.len(),
            })
            .collect(),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut options = match &args.config {
        Some(path) => GameOptions::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GameOptions::default(),
    };
    options.player_names = args.strategies.iter().map(ToString::to_string).collect();
    options.validate()?;

    let mut totals: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    let mut wins: BTreeMap<String, u32> = BTreeMap::new();

    for i in 0..args.games {
        let seed = args.seed + i;
        let report = play_game(&options, &args.strategies, seed, args.max_turns)?;

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "Game {} (seed {}): {:?} after {} turns",
                i, seed, report.ending, report.turns
            );
            for seat in &report.seats {
                println!(
                    "  {:<8} {:<12} {:>5}  ({} tiles left)",
                    seat.color, seat.strategy, seat.score, seat.tiles_left
                );
            }
        }

        for seat in &report.seats {
            totals.entry(seat.strategy.clone()).or_default().push(seat.score);
            if report.winner == Some(seat.color) {
                *wins.entry(seat.strategy.clone()).or_default() += 1;
            }
        }
    }

    if !args.json && args.games > 1 {
        println!("\n--- Summary over {} games ---", args.games);
        for (strategy, scores) in &totals {
            let average = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
            println!(
                "{:<12} avg {:>8.2}  wins {}",
                strategy,
                average,
                wins.get(strategy).copied().unwrap_or(0)
            );
        }
    }

    Ok(())
}
