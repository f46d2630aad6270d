//! # Board Game Arena
//!
//! Terminal front end for the game engines.
//!
//! ## Usage
//! - `board-game-arena play --game chess --bot -1` plays White against the bot
//! - `board-game-arena play --game uno --players 3 --bot 2 --bot 3`
//! - `board-game-arena arena --game dama --games 500` runs bot-vs-bot games in parallel
//!
//! Set `RUST_LOG` or `--log-level` to see engine logging on stderr.

use anyhow::Context;
use arena::config::GameConfig;
use arena::game_controller::{GameController, GameStatus, MoveResult, PlayerKind};
use arena::game_wrapper::{GameKind, MoveWrapper};
use arena::games::backgammon::BgMove;
use arena::games::snakes::SnakesMove;
use arena::session::GameSession;
use arena::seeded_rng;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use flexi_logger::Logger;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Arena games stop after this many plies and count as unfinished.
const MAX_ARENA_PLIES: usize = 2000;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a game in the terminal
    Play(PlayArgs),
    /// Run bot-vs-bot games and print a tally
    Arena(ArenaArgs),
}

#[derive(Args)]
struct PlayArgs {
    #[arg(short, long, value_enum)]
    game: GameKind,

    /// Player id controlled by the bot (repeatable; 1/-1 for two-sided games, 1..=n otherwise)
    #[arg(short, long, allow_negative_numbers = true)]
    bot: Vec<i32>,

    /// Seats for Uno and Snakes & Ladders
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    #[arg(short, long)]
    seed: Option<u64>,

    /// Bot thinking delay in milliseconds (defaults depend on the game)
    #[arg(long)]
    bot_delay_ms: Option<u64>,
}

#[derive(Args)]
struct ArenaArgs {
    #[arg(short, long, value_enum)]
    game: GameKind,

    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 100)]
    games: usize,

    /// Worker threads (0 uses every CPU)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Seats for Uno and Snakes & Ladders
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _logger = Logger::try_with_env_or_str(&cli.log_level)?
        .format(flexi_logger::colored_default_format)
        .start()?;

    match cli.command {
        Command::Play(args) => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start the tokio runtime")?;
            runtime.block_on(play(args))
        }
        Command::Arena(args) => arena(args),
    }
}

fn is_roll(mv: &MoveWrapper) -> bool {
    matches!(mv, MoveWrapper::Snakes(SnakesMove::Roll) | MoveWrapper::Backgammon(BgMove::Roll))
}

fn report(result: &MoveResult, name: &str) {
    match result {
        MoveResult::Success { move_made, .. } => println!("{} played {}", name.cyan(), move_made),
        MoveResult::Invalid { reason } => println!("{}", format!("Rejected: {}", reason).red()),
        MoveResult::GameOver => println!("{}", "The game is already over.".yellow()),
        MoveResult::NoMove => println!("{}", format!("{} has no move.", name).yellow()),
    }
}

async fn play(args: PlayArgs) -> anyhow::Result<()> {
    let config = GameConfig {
        seed: args.seed,
        uno_players: args.players,
        snakes_players: args.players,
        bot_delay: args.bot_delay_ms.map(Duration::from_millis),
        ..GameConfig::default()
    };
    let kind = args.game;
    let mut controller = GameController::new(kind.new_game(&config));
    for &player in &args.bot {
        controller.set_player_kind(player, PlayerKind::Bot);
    }
    let mut session = GameSession::new(controller, config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", format!("=== {} ===", kind).bold());
    println!("{}", "Commands: a move, 'moves', 'history', 'quit'".dimmed());

    loop {
        let (board, over, bot_turn, player) = session.with_controller(|c| {
            (c.get_render_state().to_string(), c.is_game_over(), c.is_bot_turn(), c.get_current_player())
        });
        println!("\n{}", board);
        if over {
            break;
        }
        let name = kind.player_name(player);

        if bot_turn {
            println!("{}", format!("{} (bot) is thinking...", name).dimmed());
            session.schedule_bot_move_default();
            let turns = session.join_pending().await;
            let stuck = turns.iter().flatten().any(|t| matches!(t, MoveResult::NoMove));
            for turn in turns.iter().flatten() {
                report(turn, &name);
            }
            if stuck {
                break;
            }
            continue;
        }

        print!("{} > ", name.green().bold());
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "quit" | "q" => break,
            "history" => {
                println!("{}", session.with_controller(|c| c.format_history()));
                continue;
            }
            "moves" => {
                let moves = session.with_controller(|c| c.get_legal_moves());
                let names: Vec<String> = moves.iter().map(MoveWrapper::to_string).collect();
                println!("{}", names.join("  "));
                continue;
            }
            _ => {}
        }

        let mv = match kind.parse_move(line) {
            Ok(mv) => mv,
            Err(e) => {
                println!("{}", e.red());
                continue;
            }
        };

        if is_roll(&mv) {
            let mut frames = session.roll_animation();
            while let Some(face) = frames.recv().await {
                print!("\r{} {}", "Rolling".dimmed(), face);
                std::io::stdout().flush()?;
            }
            println!();
        }
        let result = session.submit_move(player, mv);
        report(&result, &name);
    }

    let (status, history) = session.with_controller(|c| (c.get_status(), c.format_history()));
    println!("{}", history);
    match status {
        GameStatus::Win(winner) => println!("{}", format!("{} wins!", kind.player_name(winner)).green().bold()),
        GameStatus::Draw => println!("{}", "Draw.".yellow().bold()),
        GameStatus::InProgress => println!("{}", "Game abandoned.".dimmed()),
    }
    Ok(())
}

/// Plays one game with bots on every side. Returns the final status and the ply count.
fn play_bot_game(kind: GameKind, config: &GameConfig) -> (GameStatus, usize) {
    let mut controller = GameController::new(kind.new_game(config));
    let mut rng = seeded_rng(config.seed.map(|s| s.wrapping_mul(31).wrapping_add(7)));
    while !controller.is_game_over() && controller.move_count() < MAX_ARENA_PLIES {
        match controller.play_bot_turn(&mut rng) {
            MoveResult::Success { .. } => {}
            other => {
                log::warn!("{} stopped early: {:?}", kind, other);
                break;
            }
        }
    }
    (controller.get_status(), controller.move_count())
}

fn arena(args: ArenaArgs) -> anyhow::Result<()> {
    let threads = if args.threads == 0 { num_cpus::get() } else { args.threads };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("failed to build the arena thread pool")?;
    let base_seed = args.seed.unwrap_or_else(rand::random);
    let kind = args.game;

    println!(
        "Playing {} games of {} on {} threads (seed {})",
        args.games, kind, threads, base_seed
    );

    let results: Vec<(GameStatus, usize)> = pool.install(|| {
        (0..args.games)
            .into_par_iter()
            .map(|i| {
                let config = GameConfig {
                    seed: Some(base_seed.wrapping_add(i as u64)),
                    uno_players: args.players,
                    snakes_players: args.players,
                    ..GameConfig::default()
                };
                play_bot_game(kind, &config)
            })
            .collect()
    });

    let mut wins: BTreeMap<i32, usize> = BTreeMap::new();
    let mut draws = 0;
    let mut unfinished = 0;
    for (status, _) in &results {
        match status {
            GameStatus::Win(player) => *wins.entry(*player).or_default() += 1,
            GameStatus::Draw => draws += 1,
            GameStatus::InProgress => unfinished += 1,
        }
    }
    let total_plies: usize = results.iter().map(|(_, plies)| plies).sum();

    println!("{}", format!("=== {} arena ===", kind).bold());
    let mut ranking: Vec<(i32, usize)> = wins.into_iter().collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1));
    for (player, count) in ranking {
        println!("{:>14}: {}", kind.player_name(player), count.to_string().green());
    }
    println!("{:>14}: {}", "Draws", draws.to_string().yellow());
    if unfinished > 0 {
        println!("{:>14}: {}", "Unfinished", unfinished.to_string().red());
    }
    if !results.is_empty() {
        println!("{:>14}: {:.1}", "Avg plies", total_plies as f64 / results.len() as f64);
    }
    Ok(())
}
