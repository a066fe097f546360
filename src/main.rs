//! Gosifu: pick a Go move with Monte Carlo Tree Search.
//!
//! ## Usage
//!
//! - `gosifu` - Show a demo
//! - `gosifu search [MOVES]...` - Choose the next move after a setup sequence
//! - `gosifu demo` - Run the MCTS demo

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flexi_logger::Logger;

use gosifu::agents::{Agent, AgentLevel, build_agent};
use gosifu::board::{Board, Goban};
use gosifu::config::AgentConfig;
use gosifu::constants::{
    DEFAULT_BOARD_SIZE, DEFAULT_EXPLORATION, DEFAULT_KOMI, DEFAULT_ROLLOUT_LIMIT,
    DEFAULT_SIMULATIONS,
};
use gosifu::mcts::MctsAgent;
use gosifu::tree::Tree;
use gosifu::types::{Color, Move};

/// Gosifu: a Monte Carlo Tree Search Go move picker
#[derive(Parser)]
#[command(name = "gosifu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose the next move for a position built from setup moves
    Search(SearchArgs),
    /// Run a simple demo of the engine
    Demo,
}

#[derive(Args)]
struct SearchArgs {
    /// Board size
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,
    /// Komi added to White's score
    #[arg(long, default_value_t = DEFAULT_KOMI)]
    komi: f64,
    /// Agent strength
    #[arg(long, default_value_t = AgentLevel::Hard)]
    level: AgentLevel,
    /// Simulations per move
    #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
    sims: usize,
    /// UCT exploration constant
    #[arg(long, default_value_t = DEFAULT_EXPLORATION)]
    exploration: f64,
    /// Maximum moves per rollout
    #[arg(long, default_value_t = DEFAULT_ROLLOUT_LIMIT)]
    rollout_limit: usize,
    /// Seed for reproducible decisions
    #[arg(long)]
    seed: Option<u64>,
    /// Stop searching after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Setup moves played alternately from Black, as `row,col` or `pass`
    moves: Vec<Move>,
}

fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("info")
        .context("invalid log specification")?
        .log_to_stderr()
        .start()
        .context("failed to start logger")?;

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search(args)) => run_search(args),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_search(args: SearchArgs) -> Result<()> {
    let mut board = Goban::with_komi(args.size, args.komi);
    let mut color = Color::Black;
    for (i, &mv) in args.moves.iter().enumerate() {
        board
            .apply_move(color, mv)
            .with_context(|| format!("setup move {} ({color} {mv}) rejected", i + 1))?;
        color = color.opponent();
    }

    let mut config = AgentConfig::new(color, args.size)
        .with_simulations(args.sims)
        .with_exploration(args.exploration)
        .with_rollout_limit(args.rollout_limit);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(ms) = args.time_limit_ms {
        config = config.with_time_limit(Duration::from_millis(ms));
    }

    let mut agent = build_agent(args.level, config).context("invalid agent configuration")?;
    let legal = board.legal_moves(color);
    let mv = agent.select_move(&board, &legal);

    println!("{board}");
    println!("komi {}", board.komi());
    println!("{} ({}) plays {mv}", color, args.level);
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Gosifu: Monte Carlo Tree Search for Go\n");

    let mut board = Goban::new(DEFAULT_BOARD_SIZE);
    board.apply_move(Color::Black, Move::Place((2, 2)))?;
    board.apply_move(Color::White, Move::Place((6, 6)))?;
    println!("{board}");

    let config = AgentConfig::new(Color::Black, DEFAULT_BOARD_SIZE).with_simulations(100);
    let mut agent = MctsAgent::new(config)?;
    let legal = board.legal_moves(Color::Black);

    println!("Running {} MCTS simulations...", agent.config().simulation_budget);
    let tree = agent.search(&board, &legal);
    match tree.most_visited_child(Tree::<Goban>::ROOT) {
        Some(id) => {
            let best = tree.get(id);
            if let Some(mv) = best.mv {
                println!("Best move: {mv}");
            }
            println!("Winrate: {:.1}%", best.winrate() * 100.0);
        }
        None => println!("No move found"),
    }

    let mv = agent.select_move(&board, &legal);
    println!("select_move picks: {mv}");
    Ok(())
}
