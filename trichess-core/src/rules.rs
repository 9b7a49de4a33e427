//! Move legality

use crate::board::{Board, Legality};
use crate::moves::Move;
use crate::pieces::{Piece, PieceType, PAWN_ADVANCE, PAWN_DOUBLE_ADVANCE};
use crate::position::{Colour, Position};

/// A castling option: king destination, rook home and rook destination
/// columns, and the columns that must be empty
pub(crate) struct Castle {
    pub king_to: u8,
    pub rook_from: u8,
    pub rook_to: u8,
    pub must_be_empty: &'static [u8],
}

pub(crate) const KING_HOME_COLUMN: u8 = 4;

pub(crate) static CASTLES: [Castle; 2] = [
    Castle { king_to: 6, rook_from: 7, rook_to: 5, must_be_empty: &[5, 6] },
    Castle { king_to: 2, rook_from: 0, rook_to: 3, must_be_empty: &[1, 2, 3] },
];

/// Home square of `colour`'s king
pub(crate) fn king_home(colour: Colour) -> Position {
    Position::at(colour, 0, KING_HOME_COLUMN)
}

impl Board {
    /// Whether moving the piece on `start` to `end` is legal for the player to move.
    ///
    /// Check plays no part: kings may move into or stay in check, and castling
    /// depends only on which squares are occupied right now.
    pub fn is_legal(&self, start: Position, end: Position) -> bool {
        if self.legality == Legality::Bypassed {
            return true;
        }

        let Some(&mover) = self.piece(start) else {
            return false;
        };
        if mover.colour != self.turn {
            return false;
        }
        let target = self.piece(end);
        if target.is_some_and(|t| t.colour == mover.colour) {
            return false;
        }

        match mover.kind {
            PieceType::Pawn => self.pawn_reaches(&mover, start, end, target.is_some()),
            PieceType::Knight => reaches_in_one_step(&mover, start, end),
            PieceType::King => reaches_in_one_step(&mover, start, end) || self.can_castle(&mover, start, end),
            PieceType::Rook | PieceType::Bishop | PieceType::Queen => self.slides_to(&mover, start, end),
        }
    }

    /// Every legal move for the player to move, in position order
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.game_over {
            return vec![];
        }
        let mut moves = Vec::new();
        for start in self.positions(self.turn) {
            for end in Position::all() {
                if self.is_legal(start, end) {
                    moves.push(Move::new(start, end));
                }
            }
        }
        moves
    }

    fn pawn_reaches(&self, pawn: &Piece, start: Position, end: Position, capture: bool) -> bool {
        pawn.kind.steps().iter().enumerate().any(|(i, step)| {
            if pawn.walk(step, start, false) != Ok(end) {
                return false;
            }
            match i {
                PAWN_ADVANCE => !capture,
                PAWN_DOUBLE_ADVANCE => {
                    !capture
                        && start.colour() == pawn.colour
                        && start.row() == 1
                        && self.piece(Position::at(pawn.colour, 2, start.column())).is_none()
                }
                _ => capture,
            }
        })
    }

    /// Repeat one step at a time; every square before `end` must be empty
    fn slides_to(&self, mover: &Piece, start: Position, end: Position) -> bool {
        for step in mover.kind.steps() {
            let mut reached = mover.walk(step, start, false);
            for _ in 0..mover.kind.step_reps() {
                let Ok(square) = reached else { break };
                if square == end {
                    return true;
                }
                if self.piece(square).is_some() {
                    break;
                }
                reached = mover.walk(step, square, square.colour() != start.colour());
            }
        }
        false
    }

    fn can_castle(&self, king: &Piece, start: Position, end: Position) -> bool {
        let colour = king.colour;
        if start != king_home(colour) {
            return false;
        }
        CASTLES.iter().any(|castle| {
            end == Position::at(colour, 0, castle.king_to)
                && self
                    .piece(Position::at(colour, 0, castle.rook_from))
                    .is_some_and(|rook| rook.kind == PieceType::Rook && rook.colour == colour)
                && castle
                    .must_be_empty
                    .iter()
                    .all(|&column| self.piece(Position::at(colour, 0, column)).is_none())
        })
    }
}

/// Non-sliding move: one step lands exactly on `end`
fn reaches_in_one_step(mover: &Piece, start: Position, end: Position) -> bool {
    mover
        .kind
        .steps()
        .iter()
        .any(|step| mover.walk(step, start, false) == Ok(end))
}
