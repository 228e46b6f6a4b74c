// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for running games and match series
// ═══════════════════════════════════════════════════════════════════════

use ambush_ai::agent::Agent;
use ambush_ai::harness::{play_game, GameResult};
use ambush_ai::random::RandomAgent;
use ambush_ai::ExpectimaxAgent;
use ambush_engine::types::{GameMode, Side};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ambush-runner", about = "Ambush hidden-piece strategy lab")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game between two agents
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Game mode: "classic", "extended", or "skirmish"
        #[arg(short, long, default_value = "classic")]
        mode: String,
        /// Red agent type: "ai" or "random"
        #[arg(long, default_value = "ai")]
        red: String,
        /// Blue agent type: "ai" or "random"
        #[arg(long, default_value = "random")]
        blue: String,
        /// Print the result as a JSON line instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a series of N games and print the win table
    Series {
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value = "classic")]
        mode: String,
        #[arg(long, default_value = "ai")]
        red: String,
        #[arg(long, default_value = "random")]
        blue: String,
    },
}

const MAX_TURNS: usize = 1_000;

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Play { seed, mode, red, blue, json } => cmd_play(seed, &mode, &red, &blue, json),
        Commands::Series { games, seed, mode, red, blue } => {
            cmd_series(games, seed, &mode, &red, &blue)
        }
    }
}

fn cmd_play(seed: u64, mode: &str, red_type: &str, blue_type: &str, json: bool) {
    let mode = match parse_mode(mode) {
        Some(m) => m,
        None => {
            eprintln!("Unknown mode: {}", mode);
            return;
        }
    };
    if !json {
        println!("=== Ambush Strategy Lab ===\n");
        println!(
            "Running single game: seed={}, mode={:?}, red={}, blue={}\n",
            seed, mode, red_type, blue_type
        );
    }

    let mut red = make_agent(red_type, Side::Red, mode, seed);
    let mut blue = make_agent(blue_type, Side::Blue, mode, seed + 1);
    match play_game(mode, seed, red.as_mut(), blue.as_mut(), MAX_TURNS) {
        Ok(result) => {
            if json {
                println!("{}", result_json(seed, mode, &result));
            } else {
                println!("Game finished!");
                match result.winner {
                    Some(side) => println!("  Winner: {}", side),
                    None => println!("  Winner: none (turn cap reached)"),
                }
                println!("  Turns played: {}", result.turns);
            }
        }
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn cmd_series(games: u32, base_seed: u64, mode: &str, red_type: &str, blue_type: &str) {
    let mode = match parse_mode(mode) {
        Some(m) => m,
        None => {
            eprintln!("Unknown mode: {}", mode);
            return;
        }
    };
    println!(
        "=== Series: {} games, mode={:?}, red={}, blue={} ===\n",
        games, mode, red_type, blue_type
    );

    let mut red_wins = 0u32;
    let mut blue_wins = 0u32;
    let mut draws = 0u32;
    let mut errors = 0u32;
    let mut total_turns = 0usize;

    for g in 0..games {
        let seed = base_seed + g as u64 * 1000;
        let mut red = make_agent(red_type, Side::Red, mode, seed);
        let mut blue = make_agent(blue_type, Side::Blue, mode, seed + 1);
        match play_game(mode, seed, red.as_mut(), blue.as_mut(), MAX_TURNS) {
            Ok(result) => {
                match result.winner {
                    Some(Side::Red) => red_wins += 1,
                    Some(Side::Blue) => blue_wins += 1,
                    None => draws += 1,
                }
                total_turns += result.turns;
                if (g + 1) % 10 == 0 || g + 1 == games {
                    print!("\rGame {}/{}...", g + 1, games);
                }
            }
            Err(e) => {
                errors += 1;
                eprintln!("Game {}: ERROR -- {}", g + 1, e);
            }
        }
    }

    let played = games - errors;
    println!("\n\n--- Summary ({} games, {} errors) ---", games, errors);
    println!("  Red  ({:>6}): {:>4} wins ({:.1}%)", red_type, red_wins, pct(red_wins, played));
    println!("  Blue ({:>6}): {:>4} wins ({:.1}%)", blue_type, blue_wins, pct(blue_wins, played));
    println!("  Draws        : {:>4}      ({:.1}%)", draws, pct(draws, played));
    if played > 0 {
        println!("  Avg turns    : {:.1}", total_turns as f64 / played as f64);
    }
}

fn pct(n: u32, total: u32) -> f64 {
    if total > 0 {
        n as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

fn parse_mode(s: &str) -> Option<GameMode> {
    match s.to_ascii_lowercase().as_str() {
        "classic" => Some(GameMode::Classic),
        "extended" => Some(GameMode::Extended),
        "skirmish" => Some(GameMode::Skirmish),
        _ => None,
    }
}

fn make_agent(agent_type: &str, side: Side, mode: GameMode, seed: u64) -> Box<dyn Agent> {
    match agent_type {
        "random" => Box::new(RandomAgent::new(side, seed)),
        _ => Box::new(ExpectimaxAgent::new(side, mode, seed)),
    }
}

fn result_json(seed: u64, mode: GameMode, result: &GameResult) -> String {
    serde_json::json!({
        "seed": seed,
        "mode": format!("{:?}", mode),
        "winner": result.winner.map(|s| s.to_string()),
        "turns": result.turns,
    })
    .to_string()
}
