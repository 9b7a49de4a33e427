//! Tournament command - rank built-in agents over many games
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), report_results()
//! - Level 3: apply_overrides()
//! - Level 4: argument definitions

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use trichess_tournament::{run_tournament, GameLog, TournamentConfig, TournamentResult};

use crate::players::{build_agents, parse_roster};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct TournamentArgs {
    /// Tournament configuration JSON file; flags below override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Comma-separated agents (random, greedy)
    #[arg(long, default_value = "random,random,greedy,greedy")]
    pub agents: String,

    /// Games to play (0 = every triple of agents once)
    #[arg(long)]
    pub games: Option<usize>,

    /// Games run in parallel (1 = sequential, with full game records)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Clock per player in milliseconds (0 = untimed)
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Moves before a game is stopped (0 = unlimited)
    #[arg(long)]
    pub max_turns: Option<usize>,

    /// Minimum duration of a turn in milliseconds
    #[arg(long)]
    pub min_turn_ms: Option<u64>,

    /// Output standings as JSON on stdout; the game record goes to stderr
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

pub fn run(args: TournamentArgs, seed: Option<u64>) -> Result<()> {
    let config = apply_overrides(load_config(args.config.as_deref())?, &args, seed);
    let kinds = parse_roster(&args.agents)?;
    let agent_seed = config.seed.unwrap_or(42);
    let agents = build_agents(&kinds, agent_seed, None)?;

    tracing::info!(agents = agents.len(), games = config.games, "running tournament");

    let log = if args.json { GameLog::to_writer(std::io::stderr()) } else { GameLog::stdout() };
    let result = run_tournament(agents, config, log).context("Failed to start tournament")?;

    report_results(&result, args.json)
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<TournamentConfig> {
    let Some(path) = path else {
        return Ok(TournamentConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse config: {}", path.display()))
}

fn report_results(result: &TournamentResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    if result.games_failed > 0 {
        println!("{} games aborted by agent failures", result.games_failed);
    }
    if let Some(winner) = result.winner() {
        println!("Winner: {} (average {:.2})", winner.name, winner.average());
    }
    Ok(())
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

fn apply_overrides(mut config: TournamentConfig, args: &TournamentArgs, seed: Option<u64>) -> TournamentConfig {
    if let Some(games) = args.games {
        config.games = games;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(time_limit_ms) = args.time_limit_ms {
        config.game.time_limit_ms = time_limit_ms;
    }
    if let Some(max_turns) = args.max_turns {
        config.game.max_turns = max_turns;
    }
    if let Some(min_turn_ms) = args.min_turn_ms {
        config.game.min_turn_ms = min_turn_ms;
    }
    if let Some(seed) = seed {
        config.seed = Some(seed);
        config.game.seed = Some(seed);
    }
    config
}
