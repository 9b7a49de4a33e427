//! TRICHESS Core - Three-player chess engine
//!
//! This crate provides the rules of three-player chess:
//! - Board topology (three 4x8 sections joined at the centre)
//! - Piece types and movement patterns
//! - Board state, move legality and move execution
//! - Scoring and game termination
//! - The agent trait with random and greedy players

pub mod position;
pub mod pieces;
pub mod board;
pub mod rules;
pub mod moves;
pub mod scoring;
pub mod agent;

// Re-exports for convenient access
pub use position::{Colour, Direction, Position, PositionError, BOARD_SIZE};
pub use pieces::{Piece, PieceId, PieceType, Step};
pub use board::{Board, Legality};
pub use moves::{Move, MoveError};
pub use agent::{Agent, CancelToken, GreedyAgent, RandomAgent};
