use anyhow::{Context, Result};
use clap::Parser;
use fives_engine::config::GameOptions;
use fives_engine::engine::{GameState, Position, TilePlacement, TileValue};
use fives_engine::manager::GameStateManager;
use fives_engine::solver::best_single_placement;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Hot-seat Fives in the terminal.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON file with game options
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Player names, comma separated (overrides the config file)
    #[clap(short, long, value_delimiter = ',')]
    players: Vec<String>,

    /// Hand size (overrides the config file)
    #[clap(short, long)]
    tiles_per_player: Option<usize>,

    /// Require each turn to form a single gap-free row or column
    #[clap(long)]
    line_rule: bool,

    /// Seed for the shuffle, for reproducible games
    #[clap(long)]
    seed: Option<u64>,
}

fn load_options(args: &Args) -> Result<GameOptions> {
    let mut options = match &args.config {
        Some(path) => GameOptions::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GameOptions::default(),
    };
    if !args.players.is_empty() {
        options.player_names = args.players.clone();
    }
    if let Some(n) = args.tiles_per_player {
        options.tiles_per_player = n;
    }
    options.enforce_line_rule |= args.line_rule;
    Ok(options)
}

fn print_turn(state: &GameState, staged: &[TilePlacement]) {
    let highlight: Vec<(Position, TileValue)> = staged
        .iter()
        .filter_map(|p| state.find_tile(&p.tile_id).map(|t| (p.position, t.value)))
        .collect();
    println!("{}", state.board.to_string_with_highlight(&highlight));

    for player in &state.players {
        println!("  {:<8} {:<12} {:>5}", player.color, player.name, player.score);
    }
    println!("Draw pile: {}", state.draw_pile.len());

    if let Some(player) = state.current_player() {
        println!("Turn {}: {} ({})", state.turn_number, player.name, player.color);
        let hand: Vec<String> = player
            .hand
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let staged_mark = if staged.iter().any(|p| p.tile_id == t.unique_id) {
                    "*"
                } else {
                    ""
                };
                format!("[{}] {}{}", i, t.value, staged_mark)
            })
            .collect();
        println!("Hand: {}", hand.join("  "));
    }
}

fn print_help() {
    println!("Commands:");
    println!("  p <hand#> <x> <y>   stage a tile from your hand");
    println!("  c                   commit the staged tiles");
    println!("  x                   clear the staged tiles");
    println!("  h                   suggest the best single tile");
    println!("  s                   pass");
    println!("  u                   undo the last turn");
    println!("  q                   quit");
}

fn stage(
    manager: &GameStateManager,
    staged: &mut Vec<TilePlacement>,
    parts: &[&str],
) -> Result<(), String> {
    let [idx, x, y] = parts else {
        return Err("Usage: p <hand#> <x> <y>".to_string());
    };
    let (Ok(idx), Ok(x), Ok(y)) = (idx.parse::<usize>(), x.parse::<i32>(), y.parse::<i32>()) else {
        return Err("Hand index and coordinates must be numbers.".to_string());
    };
    let player = manager.current_player().map_err(|e| e.to_string())?;
    let tile = player
        .hand
        .get(idx)
        .ok_or_else(|| format!("No tile at hand index {}.", idx))?;
    if staged.iter().any(|p| p.tile_id == tile.unique_id) {
        return Err(format!("Tile [{}] is already staged.", idx));
    }

    let placement = TilePlacement::new(tile.unique_id.clone(), Position::new(x, y));
    let result = manager
        .validate_placement(&placement, staged)
        .map_err(|e| e.to_string())?;
    match result.error {
        Some(err) => Err(format!("Cannot place there: {}", err)),
        None => {
            staged.push(placement);
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let options = load_options(&args)?;
    let mut manager = GameStateManager::new(options);
    match args.seed {
        Some(seed) => manager.initialize_game_with_rng(&mut SmallRng::seed_from_u64(seed))?,
        None => manager.initialize_game()?,
    };

    println!("Welcome to Fives! Type 'help' for commands.");
    let mut staged: Vec<TilePlacement> = Vec::new();

    loop {
        let state = manager.state()?;
        println!("---------------------");
        print_turn(state, &staged);

        if state.is_game_over() {
            println!();
            println!("---------------------");
            println!("GAME OVER after {} turns", state.turn_number - 1);
            match manager.winner()? {
                Some(winner) => println!("Winner: {} with {} points", winner.name, winner.score),
                None => println!("No winner."),
            }
            println!("---------------------");
            break;
        }

        if !staged.is_empty() {
            println!("Staged score: {}", manager.calculate_score(&staged)?);
        }

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts.as_slice() {
            ["q"] => {
                println!("Thanks for playing!");
                break;
            }
            ["help"] => print_help(),
            ["p", rest @ ..] => {
                if let Err(msg) = stage(&manager, &mut staged, rest) {
                    println!("{}", msg);
                }
            }
            ["x"] => staged.clear(),
            ["h"] => match best_single_placement(state, manager.validator(), manager.scorer()) {
                Some((placement, score)) => {
                    let value = state.find_tile(&placement.tile_id).map(|t| t.value);
                    if let Some(value) = value {
                        println!("Try {} at {} for {} points.", value, placement.position, score);
                    }
                }
                None => println!("No legal single-tile move. Consider passing."),
            },
            ["c"] => match manager.play_turn(&staged) {
                Ok(summary) => {
                    println!(
                        "{} scored {} points and drew {} tiles.",
                        summary.player, summary.points, summary.tiles_drawn
                    );
                    staged.clear();
                }
                Err(e) => println!("Turn rejected: {}", e),
            },
            ["s"] => {
                staged.clear();
                manager.pass_turn()?;
            }
            ["u"] => {
                staged.clear();
                if manager.undo_last_move() {
                    println!("Move undone.");
                } else {
                    println!("Nothing to undo.");
                }
            }
            _ => println!("Unrecognized input. Type 'help' for commands."),
        }
    }

    Ok(())
}
