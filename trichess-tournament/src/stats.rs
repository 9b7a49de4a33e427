//! Per-agent tournament statistics
//!
//! Level 4 - Utilities and configuration

use std::fmt;

use serde::Serialize;

use crate::game_runner::GameStatus;

/// Running record of one registered agent
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AgentStats {
    /// Registration index of the agent
    pub index: usize,
    pub name: String,
    /// Sum of positive game scores
    pub won: i32,
    /// Sum of negative game scores, as a positive number
    pub lost: i32,
    pub draws: u32,
    pub timed_out: u32,
    pub illegal_moves: u32,
    pub hit_max_turns: u32,
    pub games: u32,
    /// Milliseconds spent deciding, over all games
    pub total_time_ms: i64,
}

impl AgentStats {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Fold in the result of one game
    pub fn update(&mut self, score: i32, status: GameStatus, time_ms: i64) {
        self.games += 1;
        self.total_time_ms += time_ms;
        if score > 0 {
            self.won += score;
        } else if score < 0 {
            self.lost -= score;
            match status {
                GameStatus::TimedOut => self.timed_out += 1,
                GameStatus::IllegalMove => self.illegal_moves += 1,
                _ => {}
            }
        } else {
            self.draws += 1;
            if status == GameStatus::HitMaxTurns {
                self.hit_max_turns += 1;
            }
        }
    }

    /// Mean net score per game
    pub fn average(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            (self.won - self.lost) as f64 / self.games as f64
        }
    }

    /// Mean decision time per game in seconds
    pub fn seconds_per_game(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_time_ms as f64 / self.games as f64 / 1000.0
        }
    }
}

impl fmt::Display for AgentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<23}{:<16}{:<12}{:<13}{:<13}{:<18}{:<22}{:<22}{:<14}time: {:.2}",
            self.name,
            format!("avg: {:.2},", self.average()),
            format!("won: {},", self.won),
            format!("draw: {},", self.draws),
            format!("lost: {},", self.lost),
            format!("timed-out: {},", self.timed_out),
            format!("illegal-moves: {},", self.illegal_moves),
            format!("hit-max-turns: {},", self.hit_max_turns),
            format!("games: {}", self.games),
            self.seconds_per_game(),
        )
    }
}

/// Sort by descending average; equal averages keep registration order
pub fn rank(stats: &mut [AgentStats]) {
    stats.sort_by(|a, b| {
        b.average()
            .partial_cmp(&a.average())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_counts() {
        let mut stats = AgentStats::new(0, "random");
        stats.update(1, GameStatus::GameOver, 100);
        stats.update(-1, GameStatus::TimedOut, 300);
        stats.update(-2, GameStatus::IllegalMove, 0);
        stats.update(0, GameStatus::HitMaxTurns, 200);
        stats.update(0, GameStatus::GameOver, 0);
        assert_eq!((stats.won, stats.lost), (1, 3));
        assert_eq!((stats.timed_out, stats.illegal_moves), (1, 1));
        assert_eq!((stats.draws, stats.hit_max_turns), (2, 1));
        assert_eq!(stats.games, 5);
        assert_eq!(stats.total_time_ms, 600);
        assert!((stats.average() - (-0.4)).abs() < 1e-9);
        assert!((stats.seconds_per_game() - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_empty_average() {
        assert_eq!(AgentStats::new(0, "idle").average(), 0.0);
    }

    #[test]
    fn test_rank_is_stable() {
        let mut a = AgentStats::new(0, "a");
        let mut b = AgentStats::new(1, "b");
        let mut c = AgentStats::new(2, "c");
        a.update(0, GameStatus::HitMaxTurns, 0);
        b.update(1, GameStatus::GameOver, 0);
        c.update(0, GameStatus::HitMaxTurns, 0);
        let mut all = vec![a, b, c];
        rank(&mut all);
        let order: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_display_row() {
        let mut stats = AgentStats::new(0, "greedy");
        stats.update(1, GameStatus::GameOver, 1500);
        let row = stats.to_string();
        assert!(row.starts_with("greedy"));
        assert!(row.contains("avg: 1.00,"));
        assert!(row.contains("games: 1"));
        assert!(row.ends_with("time: 1.50"));
    }
}
