//! TRICHESS CLI - Command-line interface
//!
//! Commands:
//! - tournament: Run a tournament between built-in agents
//! - manual: Play a game with moves typed on stdin
//! - cheat: Manual play with legality checks switched off

mod players;
mod play_cmd;
mod tournament_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "trichess")]
#[command(about = "Three-player chess engine and tournament runner")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tournament between agents
    Tournament(tournament_cmd::TournamentArgs),
    /// Play a game, humans entering moves such as "BD2 BD4"
    Manual(play_cmd::PlayArgs),
    /// Manual play on a board that accepts any move, untimed
    Cheat(play_cmd::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tournament(args) => tournament_cmd::run(args, cli.seed),
        Commands::Manual(args) => play_cmd::run(args, cli.seed, false),
        Commands::Cheat(args) => play_cmd::run(args, cli.seed, true),
    }
}
