//! Moves and the move executor

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Board;
use crate::pieces::{Piece, PieceType};
use crate::position::{Position, PositionError};
use crate::rules::{king_home, CASTLES};

/// A (start, end) pair; written `BD2-BD4`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub start: Position,
    pub end: Position,
}

impl Move {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for Move {
    type Err = PositionError;

    /// Two position codes separated by whitespace or `-`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(|c: char| c.is_whitespace() || c == '-').filter(|p| !p.is_empty());
        match (parts.next(), parts.next(), parts.next()) {
            (Some(start), Some(end), None) => Ok(Move::new(start.parse()?, end.parse()?)),
            _ => Err(PositionError::InvalidCode(s.to_string())),
        }
    }
}

/// Reasons the executor refuses a move
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game is already over")]
    GameOver,

    #[error("illegal move {0}")]
    Illegal(Move),

    #[error("no piece on {0}")]
    EmptySquare(Position),
}

impl Board {
    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Execute a move for the player to move, charging `elapsed_ms` to their clock.
    ///
    /// If the charge takes the clock below zero the game ends and the move is
    /// not applied. Returns the captured piece, if any.
    pub fn execute(&mut self, start: Position, end: Position, elapsed_ms: i64) -> Result<Option<Piece>, MoveError> {
        let mv = Move::new(start, end);
        if self.game_over {
            return Err(MoveError::GameOver);
        }
        if !self.is_legal(start, end) {
            return Err(MoveError::Illegal(mv));
        }
        let Some(&mover) = self.piece(start) else {
            return Err(MoveError::EmptySquare(start));
        };

        let colour = self.turn;
        let clock = &mut self.time_left[colour.index()];
        *clock -= elapsed_ms;
        if *clock < 0 {
            self.game_over = true;
            return Ok(None);
        }

        self.squares.remove(&start);
        let promotes = mover.kind == PieceType::Pawn && end.row() == 0 && end.colour() != mover.colour;
        let landed = if promotes { self.new_piece(PieceType::Queen, mover.colour) } else { mover };
        let taken = self.squares.insert(end, landed);

        if mover.kind == PieceType::King && start == king_home(mover.colour) {
            self.relocate_castled_rook(mover, end);
        }

        self.history.push(mv);
        if let Some(piece) = taken {
            self.captured[colour.index()].push(piece);
            if piece.kind == PieceType::King {
                self.game_over = true;
            }
        }
        self.turn = colour.next();
        Ok(taken)
    }

    /// Apply a move to a copy of the board (clocks untouched)
    pub fn apply_move(&self, mv: Move) -> Result<Board, MoveError> {
        let mut next = self.clone();
        next.execute(mv.start, mv.end, 0)?;
        Ok(next)
    }

    fn relocate_castled_rook(&mut self, king: Piece, end: Position) {
        let home_row = |column| Position::at(king.colour, 0, column);
        if let Some(castle) = CASTLES.iter().find(|c| end == home_row(c.king_to)) {
            let (from, to) = (home_row(castle.rook_from), home_row(castle.rook_to));
            let own_rook = self
                .squares
                .get(&from)
                .is_some_and(|p| p.kind == PieceType::Rook && p.colour == king.colour);
            if own_rook && !self.squares.contains_key(&to) {
                if let Some(rook) = self.squares.remove(&from) {
                    self.squares.insert(to, rook);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Colour;

    fn pos(code: &str) -> Position {
        code.parse().unwrap()
    }

    fn play(board: &mut Board, mv: &str) -> Option<Piece> {
        let mv: Move = mv.parse().unwrap();
        board.execute(mv.start, mv.end, 0).unwrap()
    }

    #[test]
    fn test_move_text() {
        let mv: Move = "BD2 BD4".parse().unwrap();
        assert_eq!(mv, Move::new(pos("BD2"), pos("BD4")));
        assert_eq!(mv.to_string(), "BD2-BD4");
        assert_eq!("bd2-bd4".parse::<Move>().unwrap(), mv);
        assert_eq!("  BD2   BD4 ".parse::<Move>().unwrap(), mv);
        for bad in ["BD2", "BD2 BD4 BD5", "BD2 XX4", ""] {
            assert!(bad.parse::<Move>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_move_serde() {
        let mv: Move = "GA2 GA3".parse().unwrap();
        let json = serde_json::to_string(&mv).unwrap();
        assert_eq!(json, r#"{"start":"GA2","end":"GA3"}"#);
        assert_eq!(serde_json::from_str::<Move>(&json).unwrap(), mv);
    }

    #[test]
    fn test_execute_advances_turn_and_history() {
        let mut board = Board::new(1000);
        let pawn = *board.piece(pos("BD2")).unwrap();
        assert_eq!(board.execute(pos("BD2"), pos("BD4"), 30), Ok(None));
        assert_eq!(board.turn(), Colour::Green);
        assert_eq!(board.piece(pos("BD4")), Some(&pawn));
        assert!(board.piece(pos("BD2")).is_none());
        assert_eq!(board.time_left(Colour::Blue), 970);
        assert_eq!(board.time_left(Colour::Green), 1000);
        assert_eq!(board.move_at(0), Some("BD2 BD4".parse().unwrap()));
    }

    #[test]
    fn test_execute_rejects_illegal() {
        let mut board = Board::new(0);
        let err = board.execute(pos("GD2"), pos("GD3"), 0).unwrap_err();
        assert_eq!(err, MoveError::Illegal("GD2 GD3".parse().unwrap()));
        assert_eq!(board.turn(), Colour::Blue);
        assert_eq!(board.move_count(), 0);
    }

    #[test]
    fn test_capture_goes_to_capturer() {
        let mut board = Board::new(0);
        let victim = board.place(pos("BE3"), PieceType::Knight, Colour::Red);
        assert_eq!(play(&mut board, "BD2 BE3"), Some(victim));
        assert_eq!(board.captured(Colour::Blue), &[victim]);
        assert!(board.captured(Colour::Red).is_empty());
        assert!(!board.is_game_over());
    }

    #[test]
    fn test_promotion_on_foreign_back_rank() {
        let mut board = Board::empty(0);
        let pawn = board.place(pos("GC2"), PieceType::Pawn, Colour::Blue);
        play(&mut board, "GC2 GC1");
        let queen = *board.piece(pos("GC1")).unwrap();
        assert_eq!((queen.kind, queen.colour), (PieceType::Queen, Colour::Blue));
        assert_ne!(queen.id, pawn.id);
    }

    #[test]
    fn test_kingside_castle_moves_rook() {
        let mut board = Board::new(0);
        board.remove(pos("BF1"));
        board.remove(pos("BG1"));
        let rook = *board.piece(pos("BH1")).unwrap();
        play(&mut board, "BE1 BG1");
        assert_eq!(board.piece(pos("BG1")).unwrap().kind, PieceType::King);
        assert_eq!(board.piece(pos("BF1")), Some(&rook));
        assert!(board.piece(pos("BH1")).is_none());
        assert!(board.piece(pos("BE1")).is_none());
    }

    #[test]
    fn test_queenside_castle_moves_rook() {
        let mut board = Board::new(0);
        for code in ["BB1", "BC1", "BD1"] {
            board.remove(pos(code));
        }
        play(&mut board, "BE1 BC1");
        assert_eq!(board.piece(pos("BC1")).unwrap().kind, PieceType::King);
        assert_eq!(board.piece(pos("BD1")).unwrap().kind, PieceType::Rook);
        assert!(board.piece(pos("BA1")).is_none());
    }

    #[test]
    fn test_king_capture_ends_game() {
        let mut board = Board::empty(0);
        board.place(pos("BE1"), PieceType::King, Colour::Blue);
        board.place(pos("BA1"), PieceType::Rook, Colour::Blue);
        board.place(pos("BA4"), PieceType::King, Colour::Red);
        board.place(pos("GE1"), PieceType::King, Colour::Green);
        play(&mut board, "BA1 BA4");
        assert!(board.is_game_over());
        assert_eq!(board.execute(pos("GE1"), pos("GE2"), 0), Err(MoveError::GameOver));
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn test_clock_out_leaves_board_untouched() {
        let mut board = Board::new(100);
        board.execute(pos("BD2"), pos("BD4"), 101).unwrap();
        assert!(board.is_game_over());
        assert_eq!(board.time_left(Colour::Blue), -1);
        assert_eq!(board.move_count(), 0);
        assert_eq!(board.turn(), Colour::Blue);
        assert!(board.piece(pos("BD2")).is_some());
    }

    #[test]
    fn test_cheat_empty_start() {
        let mut board = Board::cheat();
        assert_eq!(board.execute(pos("BA3"), pos("BA4"), 0), Err(MoveError::EmptySquare(pos("BA3"))));
        assert_eq!(play(&mut board, "BA1 RA1").map(|p| p.kind), Some(PieceType::Rook));
        assert_eq!(board.turn(), Colour::Green);
    }

    #[test]
    fn test_apply_move_leaves_board_unchanged() {
        let board = Board::new(0);
        let next = board.apply_move("BB1 BC3".parse().unwrap()).unwrap();
        assert!(board.piece(pos("BB1")).is_some());
        assert_eq!(next.piece(pos("BC3")).unwrap().kind, PieceType::Knight);
    }
}
