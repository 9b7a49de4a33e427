//! Game runner - drives a single game between three agents
//!
//! Level 3 - Step-level implementation

use std::sync::{Arc, Mutex, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trichess_core::{Agent, Board, CancelToken, Colour, Move, RandomAgent};

use crate::config::GameConfig;
use crate::display::BoardDisplay;
use crate::log::GameLog;
use crate::worker::MoveWorker;

/// Lifecycle of a game; every state but `Running` is final
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Running,
    /// A king was taken
    GameOver,
    /// A clock ran out
    TimedOut,
    HitMaxTurns,
    IllegalMove,
}

/// Outcome of a single game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameOutcome {
    pub status: GameStatus,
    /// Score per colour: +1/-1 for winner/loser, or -2 for an illegal move
    /// with +1 to the other two
    pub scores: [i32; 3],
    /// Milliseconds each colour spent deciding
    pub times: [i64; 3],
    /// Moves executed
    pub moves: usize,
    pub winner: Option<Colour>,
}

/// Failures that abort a game
#[derive(Debug, Error)]
pub enum GameError {
    #[error("{colour} agent {name} failed: {message}")]
    AgentFailure { colour: Colour, name: String, message: String },

    #[error("{colour} agent {name} panicked")]
    AgentPanicked { colour: Colour, name: String },

    #[error("move worker stopped unexpectedly")]
    WorkerLost,

    #[error("could not start move worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

type SharedAgent = Arc<Mutex<Box<dyn Agent>>>;

/// One game: the authoritative board, the three agents and the move worker
pub struct Game {
    board: Board,
    agents: [SharedAgent; 3],
    names: [String; 3],
    autonomous: [bool; 3],
    config: GameConfig,
    log: GameLog,
    display: Option<Box<dyn BoardDisplay>>,
    worker: Option<MoveWorker>,
    /// Workers left running a timed-out job, reclaimed when the game ends
    retired: Vec<MoveWorker>,
    fallback: RandomAgent,
    status: GameStatus,
    scores: [i32; 3],
    times: [i64; 3],
}

/// What the agent came back with for one turn
enum Decision {
    Move { mv: Move, elapsed_ms: i64 },
    TimedOut { fallback: Option<Move>, charge_ms: i64 },
    Forfeit,
}

impl Game {
    /// New game from the starting position; agents are given blue, green, red
    pub fn new(agents: [Box<dyn Agent>; 3], config: GameConfig) -> Result<Self, GameError> {
        let board = Board::new(config.time_limit_ms as i64);
        Self::from_board(board, agents, config)
    }

    /// New game continuing from an arranged board
    pub fn from_board(board: Board, agents: [Box<dyn Agent>; 3], config: GameConfig) -> Result<Self, GameError> {
        let names: [String; 3] = std::array::from_fn(|i| agents[i].name().to_string());
        let autonomous: [bool; 3] = std::array::from_fn(|i| agents[i].is_autonomous());
        let fallback = RandomAgent::with_seed("fallback", config.seed.unwrap_or(42));
        Ok(Self {
            board,
            agents: agents.map(|a| Arc::new(Mutex::new(a))),
            names,
            autonomous,
            config,
            log: GameLog::disabled(),
            display: None,
            worker: Some(MoveWorker::spawn("move-worker")?),
            retired: Vec::new(),
            fallback,
            status: GameStatus::Running,
            scores: [0; 3],
            times: [0; 3],
        })
    }

    pub fn with_log(mut self, log: GameLog) -> Self {
        self.log = log;
        self
    }

    pub fn with_display(mut self, display: Box<dyn BoardDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn names(&self) -> &[String; 3] {
        &self.names
    }

    // ========================================================================
    // Level 3 - Play
    // ========================================================================

    /// Play the game to the end
    pub fn run(mut self) -> Result<GameOutcome, GameError> {
        self.log.line("======NEW GAME======");
        for colour in Colour::ALL {
            self.log.line(format!("{colour}: {}", self.names[colour.index()]));
        }
        tracing::info!(blue = %self.names[0], green = %self.names[1], red = %self.names[2], "game started");
        self.repaint();

        let played = self.play_out();
        self.show_final_board();
        self.shutdown_workers();
        played?;

        let outcome = self.outcome();
        tracing::info!(status = ?outcome.status, moves = outcome.moves, "game finished");
        Ok(outcome)
    }

    fn play_out(&mut self) -> Result<(), GameError> {
        while self.status == GameStatus::Running {
            self.play_turn()?;
        }
        Ok(())
    }

    /// Ask the agent to move for one turn and apply the result
    pub fn play_turn(&mut self) -> Result<(), GameError> {
        if self.status != GameStatus::Running {
            return Ok(());
        }
        let colour = self.board.turn();
        let turn_started = Instant::now();

        let (mv, charge_ms, used_ms) = match self.decide(colour)? {
            Decision::Move { mv, elapsed_ms } => {
                let charge = if self.config.is_timed() { elapsed_ms } else { 0 };
                (Some(mv), charge, elapsed_ms)
            }
            Decision::TimedOut { fallback, charge_ms } => (fallback, charge_ms, charge_ms),
            Decision::Forfeit => (None, 0, 0),
        };

        let Some(mv) = mv else {
            self.log.line("INVALID MOVE: none");
            self.end_illegal(colour);
            return Ok(());
        };
        if let Err(err) = self.board.execute(mv.start, mv.end, charge_ms) {
            self.log.line(format!("INVALID MOVE: {mv}"));
            tracing::warn!(%colour, %mv, "{err}");
            self.end_illegal(colour);
            return Ok(());
        }
        self.times[colour.index()] += used_ms;
        self.log.line(format!("{colour}: {mv} t:{used_ms}"));
        tracing::debug!(%colour, %mv, ms = used_ms, "move played");
        self.repaint();

        self.pause(colour, turn_started);

        if self.board.is_game_over() {
            let status = if self.board.is_timed_out() { GameStatus::TimedOut } else { GameStatus::GameOver };
            let mut scores = [0; 3];
            if let Some(winner) = self.board.winner() {
                scores[winner.index()] = 1;
            }
            if let Some(loser) = self.board.loser() {
                scores[loser.index()] = -1;
            }
            self.end(status, scores);
        } else if self.config.max_turns > 0 && self.board.move_count() >= self.config.max_turns {
            self.end(GameStatus::HitMaxTurns, [0; 3]);
        }
        Ok(())
    }

    /// Run the agent on the move worker under the deadline
    fn decide(&mut self, colour: Colour) -> Result<Decision, GameError> {
        let name = self.names[colour.index()].clone();
        let agent = Arc::clone(&self.agents[colour.index()]);
        let deadline_ms = self.board.time_left(colour).max(0) + self.config.deadline_slack_ms as i64;

        // Still stuck in a timed-out job from an earlier turn
        if matches!(agent.try_lock(), Err(TryLockError::WouldBlock)) {
            return Ok(self.time_out(colour, &name, deadline_ms));
        }

        let snapshot = self.board.snapshot();
        let cancel = CancelToken::new();
        let job_cancel = cancel.clone();

        if self.worker.is_none() {
            self.worker = Some(MoveWorker::spawn("move-worker")?);
        }
        let worker = self.worker.as_ref().ok_or(GameError::WorkerLost)?;
        let reply = worker.submit(move || {
            let started = Instant::now();
            let mut agent = agent
                .lock()
                .map_err(|_| anyhow::anyhow!("agent state poisoned by an earlier panic"))?;
            let mv = agent.play_move(&snapshot, &job_cancel)?;
            Ok::<_, anyhow::Error>((mv, round_to_ms(started.elapsed())))
        });

        let received = if self.config.is_timed() {
            reply.recv_timeout(Duration::from_millis(deadline_ms as u64))
        } else {
            reply.recv().map_err(|_| RecvTimeoutError::Disconnected)
        };

        match received {
            Ok(Ok(Ok((Some(mv), elapsed_ms)))) => Ok(Decision::Move { mv, elapsed_ms }),
            Ok(Ok(Ok((None, _)))) => Ok(Decision::Forfeit),
            Ok(Ok(Err(err))) => Err(GameError::AgentFailure { colour, name, message: format!("{err:#}") }),
            Ok(Err(_)) => Err(GameError::AgentPanicked { colour, name }),
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                if let Some(mut stuck) = self.worker.take() {
                    stuck.retire();
                    self.retired.push(stuck);
                }
                Ok(self.time_out(colour, &name, deadline_ms))
            }
            Err(RecvTimeoutError::Disconnected) => Err(GameError::WorkerLost),
        }
    }

    /// Substitute a random move for an agent that missed its deadline
    fn time_out(&mut self, colour: Colour, name: &str, charge_ms: i64) -> Decision {
        self.log.line(format!("{colour} agent {name} TIMED OUT"));
        tracing::warn!(%colour, agent = %name, "agent timed out");
        let fallback = self.fallback.choose(&self.board);
        Decision::TimedOut { fallback, charge_ms }
    }

    /// Stop every worker, sharing one grace period between them
    fn shutdown_workers(&mut self) {
        let deadline = Instant::now() + Duration::from_millis(self.config.shutdown_grace_ms);
        let workers = self.worker.take().into_iter().chain(self.retired.drain(..));
        for worker in workers {
            worker.shutdown(deadline.saturating_duration_since(Instant::now()));
        }
    }

    /// Stretch an autonomous agent's turn to the configured minimum
    fn pause(&self, colour: Colour, turn_started: Instant) {
        if !self.autonomous[colour.index()] || self.config.min_turn_ms == 0 {
            return;
        }
        let minimum = Duration::from_millis(self.config.min_turn_ms);
        let spent = turn_started.elapsed();
        if spent < minimum {
            thread::sleep(minimum - spent);
        }
    }

    fn end_illegal(&mut self, offender: Colour) {
        let mut scores = [1; 3];
        scores[offender.index()] = -2;
        self.end(GameStatus::IllegalMove, scores);
    }

    fn end(&mut self, status: GameStatus, scores: [i32; 3]) {
        self.status = status;
        self.scores = scores;
        self.repaint();
        self.log.line("=====Game Over=====");
        for colour in Colour::ALL {
            self.log.line(format!(
                "{colour} - score: {}, time:{}",
                scores[colour.index()],
                self.board.time_left(colour)
            ));
        }
    }

    fn show_final_board(&self) {
        for (colour, agent) in Colour::ALL.iter().zip(&self.agents) {
            match agent.try_lock() {
                Ok(mut agent) => agent.final_board(&self.board),
                Err(_) => tracing::debug!(%colour, "agent still busy, final board not shown"),
            }
        }
    }

    fn repaint(&mut self) {
        if let Some(display) = self.display.as_mut() {
            display.repaint(&self.board);
        }
    }

    fn outcome(&self) -> GameOutcome {
        let winner = match self.status {
            GameStatus::GameOver | GameStatus::TimedOut => self.board.winner(),
            _ => None,
        };
        GameOutcome {
            status: self.status,
            scores: self.scores,
            times: self.times,
            moves: self.board.move_count(),
            winner,
        }
    }
}

/// Whole milliseconds, rounding half up
fn round_to_ms(elapsed: Duration) -> i64 {
    ((elapsed.as_nanos() + 500_000) / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use trichess_core::{GreedyAgent, PieceType, Position};

    fn pos(code: &str) -> Position {
        code.parse().unwrap()
    }

    fn randoms(seed: u64) -> [Box<dyn Agent>; 3] {
        [0, 1, 2].map(|i| Box::new(RandomAgent::with_seed(format!("random-{i}"), seed + i)) as Box<dyn Agent>)
    }

    /// Plays a fixed list of moves, then gives up
    struct Scripted {
        moves: Vec<Move>,
    }

    impl Scripted {
        fn new(moves: &[&str]) -> Self {
            Self { moves: moves.iter().rev().map(|m| m.parse().unwrap()).collect() }
        }
    }

    impl Agent for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn play_move(&mut self, _board: &Board, _cancel: &CancelToken) -> anyhow::Result<Option<Move>> {
            Ok(self.moves.pop())
        }

        fn fresh(&self, _seed: u64) -> Box<dyn Agent> {
            Box::new(Scripted { moves: self.moves.clone() })
        }
    }

    struct Failing;

    impl Agent for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn play_move(&mut self, _board: &Board, _cancel: &CancelToken) -> anyhow::Result<Option<Move>> {
            anyhow::bail!("no idea")
        }

        fn fresh(&self, _seed: u64) -> Box<dyn Agent> {
            Box::new(Failing)
        }
    }

    #[test]
    fn test_round_to_ms() {
        assert_eq!(round_to_ms(Duration::from_micros(1499)), 1);
        assert_eq!(round_to_ms(Duration::from_micros(1500)), 2);
        assert_eq!(round_to_ms(Duration::ZERO), 0);
    }

    #[test]
    fn test_max_turns_ends_game() {
        let config = GameConfig::default().with_max_turns(9);
        let outcome = Game::new(randoms(1), config).unwrap().run().unwrap();
        assert_eq!(outcome.status, GameStatus::HitMaxTurns);
        assert_eq!(outcome.scores, [0, 0, 0]);
        assert_eq!(outcome.moves, 9);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_forfeit_is_illegal_move() {
        let agents: [Box<dyn Agent>; 3] = [
            Box::new(Scripted::new(&["BD2 BD4"])),
            Box::new(Scripted::new(&["GD2 GD4"])),
            Box::new(Scripted::new(&[])),
        ];
        let (log, buffer) = GameLog::memory();
        let outcome = Game::new(agents, GameConfig::default()).unwrap().with_log(log).run().unwrap();
        assert_eq!(outcome.status, GameStatus::IllegalMove);
        assert_eq!(outcome.scores, [1, 1, -2]);
        assert_eq!(outcome.moves, 2);
        let lines = buffer.lines();
        assert_eq!(lines[0], "======NEW GAME======");
        assert_eq!(lines[1], "BLUE: scripted");
        assert_eq!(lines[4], "BLUE: BD2-BD4 t:0");
        assert!(lines.contains(&"INVALID MOVE: none".to_string()));
        assert!(lines.contains(&"=====Game Over=====".to_string()));
        assert!(lines.contains(&"RED - score: -2, time:0".to_string()));
    }

    #[test]
    fn test_king_capture_scores() {
        let mut board = Board::empty(0);
        board.place(pos("BA1"), PieceType::Rook, Colour::Blue);
        board.place(pos("BA4"), PieceType::King, Colour::Red);
        board.place(pos("GE1"), PieceType::King, Colour::Green);
        board.place(pos("BE1"), PieceType::King, Colour::Blue);
        let agents: [Box<dyn Agent>; 3] = [
            Box::new(GreedyAgent::with_seed("greedy", 3)),
            Box::new(Scripted::new(&[])),
            Box::new(Scripted::new(&[])),
        ];
        let outcome = Game::from_board(board, agents, GameConfig::default()).unwrap().run().unwrap();
        assert_eq!(outcome.status, GameStatus::GameOver);
        assert_eq!(outcome.scores, [1, 0, -1]);
        assert_eq!(outcome.winner, Some(Colour::Blue));
    }

    #[test]
    fn test_agent_error_aborts_game() {
        let agents: [Box<dyn Agent>; 3] = [Box::new(Failing), Box::new(Failing), Box::new(Failing)];
        let err = Game::new(agents, GameConfig::default()).unwrap().run().unwrap_err();
        assert!(matches!(err, GameError::AgentFailure { colour: Colour::Blue, .. }));
        assert!(err.to_string().contains("no idea"));
    }

    #[test]
    fn test_timed_game_charges_clock() {
        let config = GameConfig::timed(60_000).with_max_turns(6);
        let outcome = Game::new(randoms(4), config).unwrap().run().unwrap();
        assert_eq!(outcome.status, GameStatus::HitMaxTurns);
        assert!(outcome.times.iter().all(|&t| t >= 0 && t < 60_000));
    }
}
