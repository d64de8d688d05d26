//! NONAGA CLI - Command-line interface
//!
//! Commands:
//! - moves: Show a board and the legal moves of its current phase
//! - arena: Pit two search configurations against each other
//! - selfplay: Generate training samples

mod arena_cmd;
mod moves_cmd;
mod selfplay_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nonaga_arena::NonagaConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nonaga")]
#[command(about = "Nonaga rules engine and MCTS player")]
struct Cli {
    /// Seed overriding every seed in the configuration
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a board and its legal moves
    Moves(moves_cmd::MovesArgs),
    /// Play an arena match
    Arena(arena_cmd::ArenaArgs),
    /// Generate self-play training samples
    Selfplay(selfplay_cmd::SelfPlayArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => NonagaConfig::load(path)?,
        None => NonagaConfig::default(),
    };
    if let Some(seed) = cli.seed {
        apply_seed(&mut config, seed);
    }

    match cli.command {
        Commands::Moves(args) => moves_cmd::run(args, &config),
        Commands::Arena(args) => arena_cmd::run(args, &config),
        Commands::Selfplay(args) => selfplay_cmd::run(args, &config),
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_seed(config: &mut NonagaConfig, seed: u64) {
    config.mcts.seed = seed;
    config.oracle.seed = seed;
    config.arena.seed = seed;
    config.self_play.seed = seed;
}
