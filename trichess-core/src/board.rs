//! Board state: occupancy, turn, clocks, captures and history

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::moves::Move;
use crate::pieces::{Piece, PieceId, PieceType};
use crate::position::{Colour, Position, COLUMNS};

/// Back row layout shared by every section, by column
const BACK_ROW: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Whether move legality is enforced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Legality {
    #[default]
    Enforced,
    /// Every move is accepted, for free board setup
    Bypassed,
}

/// Authoritative game record (clone to snapshot)
#[derive(Clone, Debug)]
pub struct Board {
    /// Position -> piece (sparse representation)
    pub(crate) squares: FxHashMap<Position, Piece>,

    /// Player to move
    pub(crate) turn: Colour,

    /// Executed moves, oldest first
    pub(crate) history: Vec<Move>,

    /// Pieces taken, indexed by the capturing colour
    pub(crate) captured: [Vec<Piece>; 3],

    /// Remaining clock per colour in milliseconds
    pub(crate) time_left: [i64; 3],

    /// Set once a king is taken or a clock runs out
    pub(crate) game_over: bool,

    pub(crate) legality: Legality,

    next_id: PieceId,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Board with every army in its starting position and `time_ms` on each clock
    pub fn new(time_ms: i64) -> Self {
        let mut board = Self::empty(time_ms);
        for colour in Colour::ALL {
            for (column, &kind) in BACK_ROW.iter().enumerate() {
                board.place(Position::at(colour, 0, column as u8), kind, colour);
            }
            for column in 0..COLUMNS {
                board.place(Position::at(colour, 1, column), PieceType::Pawn, colour);
            }
        }
        board
    }

    /// Board without pieces, blue to move
    pub fn empty(time_ms: i64) -> Self {
        Self {
            squares: FxHashMap::default(),
            turn: Colour::Blue,
            history: Vec::new(),
            captured: Default::default(),
            time_left: [time_ms; 3],
            game_over: false,
            legality: Legality::Enforced,
            next_id: 0,
        }
    }

    /// Starting position with legality checking switched off and no clocks
    pub fn cheat() -> Self {
        Self::new(0).with_legality(Legality::Bypassed)
    }

    pub fn with_legality(mut self, legality: Legality) -> Self {
        self.legality = legality;
        self
    }

    /// Set the player to move, for arranging positions
    pub fn with_turn(mut self, turn: Colour) -> Self {
        self.turn = turn;
        self
    }

    /// Put a new piece on `position`, replacing whatever was there
    pub fn place(&mut self, position: Position, kind: PieceType, colour: Colour) -> Piece {
        let piece = self.new_piece(kind, colour);
        self.squares.insert(position, piece);
        piece
    }

    /// Take a piece off the board without recording a move
    pub fn remove(&mut self, position: Position) -> Option<Piece> {
        self.squares.remove(&position)
    }

    pub(crate) fn new_piece(&mut self, kind: PieceType, colour: Colour) -> Piece {
        let piece = Piece { kind, colour, id: self.next_id };
        self.next_id += 1;
        piece
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Player to move
    pub fn turn(&self) -> Colour {
        self.turn
    }

    pub fn legality(&self) -> Legality {
        self.legality
    }

    /// Piece on `position`, if any
    pub fn piece(&self, position: Position) -> Option<&Piece> {
        self.squares.get(&position)
    }

    /// Occupied squares and their pieces, in position order
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|p| self.squares.get(&p).map(|&piece| (p, piece)))
    }

    /// Squares holding pieces of `colour`, in position order
    pub fn positions(&self, colour: Colour) -> Vec<Position> {
        self.pieces()
            .filter(|(_, piece)| piece.colour == colour)
            .map(|(p, _)| p)
            .collect()
    }

    /// Pieces taken by `colour`
    pub fn captured(&self, colour: Colour) -> &[Piece] {
        &self.captured[colour.index()]
    }

    /// Remaining clock of `colour` in milliseconds (negative after a clock-out)
    pub fn time_left(&self, colour: Colour) -> i64 {
        self.time_left[colour.index()]
    }

    /// Number of moves executed so far
    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    /// Move at `index`, counting from 0
    pub fn move_at(&self, index: usize) -> Option<Move> {
        self.history.get(index).copied()
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Independent deep copy to hand to an agent
    pub fn snapshot(&self) -> Board {
        self.clone()
    }
}

impl fmt::Display for Board {
    /// Plain-text rendering, one section per block, back row last
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for colour in Colour::ALL {
            writeln!(f, "{colour} (time {} ms, score {})", self.time_left(colour), self.score(colour))?;
            for row in (0..4u8).rev() {
                write!(f, "  {}", row + 1)?;
                for column in 0..COLUMNS {
                    let cell = match self.piece(Position::at(colour, row, column)) {
                        Some(p) => format!("{}{}", p.colour.letter().to_ascii_lowercase(), p.kind.letter()),
                        None => " .".to_string(),
                    };
                    write!(f, " {cell}")?;
                }
                writeln!(f)?;
            }
            writeln!(f, "     A  B  C  D  E  F  G  H")?;
        }
        write!(f, "{} to move", self.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(code: &str) -> Position {
        code.parse().unwrap()
    }

    #[test]
    fn test_initial_placement() {
        let board = Board::new(1000);
        assert_eq!(board.turn(), Colour::Blue);
        assert_eq!(board.move_count(), 0);
        assert!(!board.is_game_over());

        for colour in Colour::ALL {
            assert_eq!(board.positions(colour).len(), 16);
            assert_eq!(board.time_left(colour), 1000);
            assert!(board.captured(colour).is_empty());
        }

        let king = board.piece(pos("GE1")).unwrap();
        assert_eq!((king.kind, king.colour), (PieceType::King, Colour::Green));
        let queen = board.piece(pos("RD1")).unwrap();
        assert_eq!(queen.kind, PieceType::Queen);
        assert_eq!(board.piece(pos("BA1")).unwrap().kind, PieceType::Rook);
        assert_eq!(board.piece(pos("BG1")).unwrap().kind, PieceType::Knight);
        assert_eq!(board.piece(pos("BF1")).unwrap().kind, PieceType::Bishop);
        assert_eq!(board.piece(pos("BH2")).unwrap().kind, PieceType::Pawn);
        assert!(board.piece(pos("BA3")).is_none());
        assert!(board.piece(pos("RH4")).is_none());
    }

    #[test]
    fn test_pieces_are_distinct() {
        let board = Board::new(0);
        let a = *board.piece(pos("BA2")).unwrap();
        let b = *board.piece(pos("BB2")).unwrap();
        assert_eq!((a.kind, a.colour), (b.kind, b.colour));
        assert_ne!(a, b);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let board = Board::new(0);
        let mut snapshot = board.snapshot();
        snapshot.remove(pos("BE1"));
        snapshot.place(pos("BA3"), PieceType::Queen, Colour::Red);
        assert!(board.piece(pos("BE1")).is_some());
        assert!(board.piece(pos("BA3")).is_none());
    }

    #[test]
    fn test_empty_board() {
        let mut board = Board::empty(5).with_turn(Colour::Red);
        assert_eq!(board.turn(), Colour::Red);
        assert_eq!(board.pieces().count(), 0);
        board.place(pos("GA1"), PieceType::King, Colour::Green);
        assert_eq!(board.positions(Colour::Green), vec![pos("GA1")]);
    }

    #[test]
    fn test_display_mentions_turn() {
        let text = Board::new(0).to_string();
        assert!(text.ends_with("BLUE to move"));
        assert!(text.contains("bK"));
    }
}
