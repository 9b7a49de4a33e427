//! Tournament execution - many three-player games and per-agent standings
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;
use trichess_core::{Agent, Colour};

use crate::config::{GameConfig, TournamentConfig};
use crate::game_runner::{Game, GameError, GameOutcome};
use crate::log::GameLog;
use crate::stats::{rank, AgentStats};

/// How often the scheduler checks for finished games
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Seatings of three agents, one of which is drawn per triple
const SEATINGS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

/// Problems detected when setting up a tournament
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("a tournament needs at least 3 agents, got {0}")]
    TooFewAgents(usize),

    #[error("a tournament needs at least one thread")]
    NoThreads,

    #[error("could not build game thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// One game to play: registration indices of the blue, green and red agents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Matchup {
    pub seats: [usize; 3],
}

/// Result of a tournament
#[derive(Clone, Debug, Serialize)]
pub struct TournamentResult {
    /// Final standings sorted by average score (descending)
    pub standings: Vec<AgentStats>,
    /// Games that finished and were counted
    pub games_played: usize,
    /// Games aborted by an agent failure
    pub games_failed: usize,
}

impl TournamentResult {
    /// Get winner (top standing)
    pub fn winner(&self) -> Option<&AgentStats> {
        self.standings.first()
    }

    /// Get standing for a registered agent
    pub fn standing_for(&self, index: usize) -> Option<&AgentStats> {
        self.standings.iter().find(|s| s.index == index)
    }
}

/// A set of registered agents and the games they will play
pub struct Tournament {
    agents: Vec<Box<dyn Agent>>,
    config: TournamentConfig,
    log: GameLog,
    rng: ChaCha8Rng,
    pool: Option<rayon::ThreadPool>,
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run a tournament with the given agents (Level 1 orchestration)
pub fn run_tournament(
    agents: Vec<Box<dyn Agent>>,
    config: TournamentConfig,
    log: GameLog,
) -> Result<TournamentResult, TournamentError> {
    Ok(Tournament::new(agents, config)?.with_log(log).run())
}

impl Tournament {
    pub fn new(agents: Vec<Box<dyn Agent>>, config: TournamentConfig) -> Result<Self, TournamentError> {
        if agents.len() < 3 {
            return Err(TournamentError::TooFewAgents(agents.len()));
        }
        if config.threads == 0 {
            return Err(TournamentError::NoThreads);
        }
        let pool = if config.threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.threads)
                    .thread_name(|i| format!("game-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            agents,
            config,
            log: GameLog::disabled(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            pool,
        })
    }

    /// Where tournament progress, standings and (single-threaded) game records go
    pub fn with_log(mut self, log: GameLog) -> Self {
        self.log = log;
        self
    }

    /// Play every match-up and rank the agents
    pub fn run(mut self) -> TournamentResult {
        let matchups = self.matchups();
        let total = matchups.len();
        self.log.line(format!("Starting tournament with {total} games"));
        tracing::info!(games = total, threads = self.config.threads, "tournament started");

        let mut stats: Vec<AgentStats> = self
            .agents
            .iter()
            .enumerate()
            .map(|(i, agent)| AgentStats::new(i, agent.name()))
            .collect();
        let mut progress = Progress::new(total, &self.config, self.log.clone());

        let games: Vec<(Matchup, [Box<dyn Agent>; 3])> = matchups
            .into_iter()
            .map(|m| {
                let seated = m.seats.map(|i| self.agents[i].fresh(self.rng.gen()));
                (m, seated)
            })
            .collect();

        match self.pool.take() {
            Some(pool) => {
                self.run_pooled(&pool, games, &mut stats, &mut progress);
                drop(pool);
                tracing::debug!("game pool released");
            }
            None => {
                for (matchup, agents) in games {
                    let result = play_game(agents, self.config.game.clone(), self.log.clone());
                    progress.record(matchup, result, &mut stats);
                }
            }
        }

        rank(&mut stats);
        self.log.line("");
        for row in &stats {
            self.log.line(row.to_string());
        }
        tracing::info!(played = progress.played, failed = progress.failed, "tournament finished");

        TournamentResult {
            standings: stats,
            games_played: progress.played,
            games_failed: progress.failed,
        }
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Games to play: every triple once when the game count is 0, otherwise
    /// that many triples drawn with replacement
    pub fn matchups(&mut self) -> Vec<Matchup> {
        let n = self.agents.len();
        if self.config.games == 0 {
            let mut matchups = Vec::new();
            for i in 0..n {
                for j in (i + 1)..n {
                    for k in (j + 1)..n {
                        let trio = [i, j, k];
                        let seating = SEATINGS[self.rng.gen_range(0..SEATINGS.len())];
                        matchups.push(Matchup { seats: seating.map(|s| trio[s]) });
                    }
                }
            }
            matchups
        } else {
            (0..self.config.games)
                .map(|_| Matchup { seats: [0; 3].map(|_| self.rng.gen_range(0..n)) })
                .collect()
        }
    }

    /// Run the games on the pool, folding results as they complete
    fn run_pooled(
        &self,
        pool: &rayon::ThreadPool,
        games: Vec<(Matchup, [Box<dyn Agent>; 3])>,
        stats: &mut [AgentStats],
        progress: &mut Progress,
    ) {
        let (done_tx, done_rx) = unbounded();
        for (matchup, agents) in games {
            let done_tx = done_tx.clone();
            // Interleaved games would garble a shared game log
            let config = self.config.game.clone();
            pool.spawn(move || {
                let result = play_game(agents, config, GameLog::disabled());
                let _ = done_tx.send((matchup, result));
            });
        }
        drop(done_tx);
        progress.collect(&done_rx, stats);
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Outcome of one game, with panics turned into a message
type GameResult = Result<GameOutcome, String>;

fn play_game(agents: [Box<dyn Agent>; 3], config: GameConfig, log: GameLog) -> GameResult {
    let run = panic::catch_unwind(AssertUnwindSafe(move || -> Result<GameOutcome, GameError> {
        Game::new(agents, config)?.with_log(log).run()
    }));
    match run {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(err)) => Err(err.to_string()),
        Err(_) => Err("game panicked".to_string()),
    }
}

/// Completion counting and periodic progress reports
struct Progress {
    total: usize,
    played: usize,
    failed: usize,
    interval: Duration,
    last_report: Instant,
    log: GameLog,
}

impl Progress {
    fn new(total: usize, config: &TournamentConfig, log: GameLog) -> Self {
        Self {
            total,
            played: 0,
            failed: 0,
            interval: Duration::from_secs(config.report_interval_secs),
            last_report: Instant::now(),
            log,
        }
    }

    fn done(&self) -> usize {
        self.played + self.failed
    }

    fn is_complete(&self) -> bool {
        self.done() >= self.total
    }

    fn record(&mut self, matchup: Matchup, result: GameResult, stats: &mut [AgentStats]) {
        match result {
            Ok(outcome) => {
                for colour in Colour::ALL {
                    let c = colour.index();
                    stats[matchup.seats[c]].update(outcome.scores[c], outcome.status, outcome.times[c]);
                }
                self.played += 1;
            }
            Err(message) => {
                tracing::warn!(seats = ?matchup.seats, "game failed: {message}");
                self.failed += 1;
            }
        }
        self.tick();
    }

    /// Wait for finished games until all are in or no game can still report
    fn collect(&mut self, done: &Receiver<(Matchup, GameResult)>, stats: &mut [AgentStats]) {
        while !self.is_complete() {
            match done.recv_timeout(POLL_INTERVAL) {
                Ok((matchup, result)) => self.record(matchup, result, stats),
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => {
                    let missing = self.total - self.done();
                    tracing::warn!(missing, "game pool stopped before every game reported");
                    self.failed += missing;
                    self.tick();
                }
            }
        }
    }

    /// Report if the interval has passed or everything is done
    fn tick(&mut self) {
        if self.is_complete() || self.last_report.elapsed() >= self.interval {
            self.log.line(format!("{} / {} games completed", self.done(), self.total));
            tracing::info!(done = self.done(), total = self.total, "tournament progress");
            self.last_report = Instant::now();
        }
    }
}
