//! Manual and cheat commands - play a game from the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: spawn_stdin_reader(), report_outcome()
//! - Level 3: parse_input()
//! - Level 4: argument definitions

use std::io::BufRead;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;

use trichess_core::{Agent, Board, Move};
use trichess_tournament::{move_channel, Game, GameConfig, GameLog, GameOutcome, MoveSender, TextDisplay};

use crate::players::{build_agents, parse_roster, PlayerKind};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Comma-separated players for blue, green and red (human, random, greedy)
    #[arg(long, default_value = "human,human,human")]
    pub players: String,

    /// Clock per player in milliseconds (0 = untimed; ignored when cheating)
    #[arg(long, default_value = "0")]
    pub time_limit_ms: u64,

    /// Moves before the game is stopped (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_turns: usize,

    /// Minimum duration of a computer player's turn in milliseconds
    #[arg(long, default_value = "500")]
    pub min_turn_ms: u64,

    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

pub fn run(args: PlayArgs, seed: Option<u64>, cheat: bool) -> Result<()> {
    let kinds = parse_roster(&args.players)?;
    if kinds.len() != 3 {
        bail!("a game needs exactly 3 players, got {}", kinds.len());
    }

    let (sender, receiver) = move_channel();
    let agents = build_agents(&kinds, seed.unwrap_or(42), Some(&receiver))?;
    let agents: [Box<dyn Agent>; 3] = agents
        .try_into()
        .map_err(|_| anyhow!("a game needs exactly 3 players"))?;

    let mut config = GameConfig::timed(if cheat { 0 } else { args.time_limit_ms })
        .with_max_turns(args.max_turns)
        .with_min_turn_ms(args.min_turn_ms);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let game = if cheat {
        Game::from_board(Board::cheat(), agents, config)
    } else {
        Game::new(agents, config)
    }
    .context("Failed to set up game")?;

    if kinds.contains(&PlayerKind::Human) {
        println!("Enter moves such as \"BD2 BD4\" (colour, column, row).");
        spawn_stdin_reader(sender)?;
    }

    let outcome = game
        .with_log(GameLog::stdout())
        .with_display(Box::new(TextDisplay))
        .run()
        .context("Game aborted")?;

    report_outcome(&outcome, args.json)
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Forward typed moves to the manual players until the game stops listening
fn spawn_stdin_reader(sender: MoveSender) -> Result<()> {
    thread::Builder::new()
        .name("stdin-moves".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line) {
                    Some(mv) => {
                        if sender.send(mv).is_err() {
                            break;
                        }
                    }
                    None => println!("Invalid move format. Use style \"BA1 RA1\"."),
                }
            }
            tracing::debug!("stdin closed, no more manual moves");
        })
        .context("Failed to start stdin reader")?;
    Ok(())
}

fn report_outcome(outcome: &GameOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    match outcome.winner {
        Some(winner) => println!("{winner} wins after {} moves ({:?})", outcome.moves, outcome.status),
        None => println!("No winner after {} moves ({:?})", outcome.moves, outcome.status),
    }
    Ok(())
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

fn parse_input(line: &str) -> Option<Move> {
    line.trim().to_ascii_uppercase().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        let mv = parse_input("  bd2 bd4 ").unwrap();
        assert_eq!(mv.to_string(), "BD2-BD4");
        assert!(parse_input("BD2").is_none());
        assert!(parse_input("XX9 BD4").is_none());
    }

    #[test]
    fn test_player_count_is_checked() {
        let args = PlayArgs {
            players: "random,random".to_string(),
            time_limit_ms: 0,
            max_turns: 1,
            min_turn_ms: 0,
            json: false,
        };
        assert!(run(args, Some(1), false).is_err());
    }
}
