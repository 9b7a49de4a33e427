//! Configuration types for games and tournaments
//!
//! Level 4 - Utilities and configuration

use serde::{Deserialize, Serialize};

/// Extra time allowed past an agent's remaining clock before it is cut off
pub const DEFAULT_DEADLINE_SLACK_MS: u64 = 3000;

/// How long to wait for a game's move worker to exit after the game
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 15_000;

/// Seconds between tournament progress reports
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 10;

/// Settings for a single game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Clock per player in milliseconds (0 = untimed)
    pub time_limit_ms: u64,
    /// Moves before the game is stopped as a draw (0 = unlimited)
    pub max_turns: usize,
    /// Minimum duration of a turn for autonomous agents, for watching games
    pub min_turn_ms: u64,
    /// Grace period past the remaining clock before a move is abandoned
    pub deadline_slack_ms: u64,
    /// Grace period for the move worker to exit when the game ends
    pub shutdown_grace_ms: u64,
    /// Seed for the fallback random mover (None = fixed default)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 0,
            max_turns: 0,
            min_turn_ms: 0,
            deadline_slack_ms: DEFAULT_DEADLINE_SLACK_MS,
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Timed game with `time_limit_ms` on each clock
    pub fn timed(time_limit_ms: u64) -> Self {
        Self {
            time_limit_ms,
            ..Default::default()
        }
    }

    pub fn is_timed(&self) -> bool {
        self.time_limit_ms > 0
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_min_turn_ms(mut self, min_turn_ms: u64) -> Self {
        self.min_turn_ms = min_turn_ms;
        self
    }

    pub fn with_deadline_slack_ms(mut self, slack_ms: u64) -> Self {
        self.deadline_slack_ms = slack_ms;
        self
    }

    pub fn with_shutdown_grace_ms(mut self, grace_ms: u64) -> Self {
        self.shutdown_grace_ms = grace_ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Tournament configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Games to play (0 = every triple of agents once)
    pub games: usize,
    /// Games run at the same time (1 = sequentially on the calling thread)
    pub threads: usize,
    /// Seconds between progress reports
    pub report_interval_secs: u64,
    /// Seed for match-ups and agent instances (None = from entropy)
    pub seed: Option<u64>,
    /// Settings for every game
    pub game: GameConfig,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            games: 0,
            threads: 1,
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
            seed: None,
            game: GameConfig::default(),
        }
    }
}

impl TournamentConfig {
    /// Tournament of `games` random match-ups
    pub fn new(games: usize) -> Self {
        Self {
            games,
            ..Default::default()
        }
    }

    /// Every triple of agents plays once
    pub fn all_triples() -> Self {
        Self::new(0)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_report_interval_secs(mut self, secs: u64) -> Self {
        self.report_interval_secs = secs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_defaults() {
        let config = GameConfig::default();
        assert!(!config.is_timed());
        assert_eq!(config.max_turns, 0);
        assert_eq!(config.deadline_slack_ms, 3000);
        assert_eq!(config.shutdown_grace_ms, 15_000);
    }

    #[test]
    fn test_game_config_builders() {
        let config = GameConfig::timed(60_000).with_max_turns(200).with_seed(5);
        assert!(config.is_timed());
        assert_eq!(config.time_limit_ms, 60_000);
        assert_eq!(config.max_turns, 200);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_tournament_config_defaults() {
        let config = TournamentConfig::default();
        assert_eq!(config.games, 0);
        assert_eq!(config.threads, 1);
        assert_eq!(config.report_interval_secs, 10);
        assert_eq!(config, TournamentConfig::all_triples());
    }

    #[test]
    fn test_tournament_config_from_partial_json() {
        let json = r#"{"games": 12, "threads": 4, "game": {"time_limit_ms": 30000}}"#;
        let config: TournamentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.games, 12);
        assert_eq!(config.threads, 4);
        assert_eq!(config.report_interval_secs, 10);
        assert_eq!(config.game.time_limit_ms, 30_000);
        assert_eq!(config.game.deadline_slack_ms, 3000);
    }
}
