//! Players: the agent trait and the built-in strategies

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::moves::Move;

/// Shared flag asking a running move computation to stop early
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A player.
///
/// `play_move` receives a private snapshot of the board and may take as long
/// as it likes, but should return promptly once `cancel` is set. Returning
/// `Ok(None)` forfeits the game as an illegal move.
pub trait Agent: Send {
    fn name(&self) -> &str;

    fn play_move(&mut self, board: &Board, cancel: &CancelToken) -> anyhow::Result<Option<Move>>;

    /// Whether the agent plays without a human in the loop
    fn is_autonomous(&self) -> bool {
        true
    }

    /// Called once with the board as the game ended
    fn final_board(&mut self, _board: &Board) {}

    /// New instance with the same strategy, for one tournament game
    fn fresh(&self, seed: u64) -> Box<dyn Agent>;
}

// ============================================================================
// RANDOM
// ============================================================================

/// Picks uniformly among the legal moves
pub struct RandomAgent {
    name: String,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_seed(name, 42)
    }

    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self { name: name.into(), rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// A uniformly chosen legal move, or `None` when there is none
    pub fn choose(&mut self, board: &Board) -> Option<Move> {
        board.legal_moves().choose(&mut self.rng).copied()
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn play_move(&mut self, board: &Board, _cancel: &CancelToken) -> anyhow::Result<Option<Move>> {
        Ok(self.choose(board))
    }

    fn fresh(&self, seed: u64) -> Box<dyn Agent> {
        Box::new(Self::with_seed(self.name.clone(), seed))
    }
}

// ============================================================================
// GREEDY
// ============================================================================

/// Takes the most valuable piece on offer, otherwise moves at random
pub struct GreedyAgent {
    name: String,
    rng: ChaCha8Rng,
}

impl GreedyAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_seed(name, 42)
    }

    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self { name: name.into(), rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn choose(&mut self, board: &Board) -> Option<Move> {
        let moves = board.legal_moves();
        let gain = |mv: &Move| board.piece(mv.end).map_or(0, |p| p.value());
        let best = moves.iter().map(gain).max()?;
        let candidates: Vec<Move> = moves.iter().copied().filter(|mv| gain(mv) == best).collect();
        candidates.choose(&mut self.rng).copied()
    }
}

impl Agent for GreedyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn play_move(&mut self, board: &Board, _cancel: &CancelToken) -> anyhow::Result<Option<Move>> {
        Ok(self.choose(board))
    }

    fn fresh(&self, seed: u64) -> Box<dyn Agent> {
        Box::new(Self::with_seed(self.name.clone(), seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceType;
    use crate::position::{Colour, Position};

    fn pos(code: &str) -> Position {
        code.parse().unwrap()
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_random_agent_plays_legal_moves() {
        let mut agent = RandomAgent::with_seed("random", 7);
        let mut board = Board::new(0);
        for _ in 0..60 {
            let Some(mv) = agent.play_move(&board, &CancelToken::new()).unwrap() else {
                break;
            };
            assert!(board.is_legal(mv.start, mv.end), "{mv}");
            board.execute(mv.start, mv.end, 0).unwrap();
            if board.is_game_over() {
                break;
            }
        }
        assert!(board.move_count() > 0);
    }

    #[test]
    fn test_random_agent_is_deterministic_per_seed() {
        let board = Board::new(0);
        let a: Vec<_> = (0..5).map(|_| RandomAgent::with_seed("a", 3).choose(&board)).collect();
        assert!(a.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_random_agent_without_moves() {
        let mut agent = RandomAgent::new("random");
        assert_eq!(agent.choose(&Board::empty(0)), None);
    }

    #[test]
    fn test_greedy_prefers_biggest_capture() {
        let mut board = Board::empty(0);
        board.place(pos("BD4"), PieceType::Queen, Colour::Blue);
        board.place(pos("BD2"), PieceType::Pawn, Colour::Green);
        board.place(pos("BA4"), PieceType::Rook, Colour::Red);
        board.place(pos("BG4"), PieceType::Knight, Colour::Red);
        let mut agent = GreedyAgent::with_seed("greedy", 1);
        assert_eq!(agent.choose(&board), Some(Move::new(pos("BD4"), pos("BA4"))));
    }

    #[test]
    fn test_fresh_keeps_name() {
        let agent = GreedyAgent::new("greedy");
        let fresh = agent.fresh(9);
        assert_eq!(fresh.name(), "greedy");
        assert!(fresh.is_autonomous());
    }
}
