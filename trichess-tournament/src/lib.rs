//! TRICHESS Tournament - Games and tournaments between agents
//!
//! This crate provides the play infrastructure:
//! - A game runner driving one game under move deadlines
//! - Tournament scheduling over a thread pool
//! - Per-agent statistics and standings
//! - Manual (human) agents fed through a channel
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament (orchestration)
//! - Level 2: match-up generation and pooled execution (phases)
//! - Level 3: Game::run, Game::play_turn (steps)
//! - Level 4: utilities, configuration, logging, move worker

mod config;
mod display;
mod game_runner;
mod log;
mod manual;
mod stats;
mod tournament;
mod worker;

pub use config::{
    GameConfig, TournamentConfig, DEFAULT_DEADLINE_SLACK_MS, DEFAULT_REPORT_INTERVAL_SECS,
    DEFAULT_SHUTDOWN_GRACE_MS,
};
pub use display::{BoardDisplay, TextDisplay};
pub use game_runner::{Game, GameError, GameOutcome, GameStatus};
pub use log::{GameLog, LogBuffer};
pub use manual::{move_channel, ManualAgent, MoveReceiver, MoveSender};
pub use stats::{rank, AgentStats};
pub use tournament::{run_tournament, Matchup, Tournament, TournamentError, TournamentResult};
pub use worker::MoveWorker;
