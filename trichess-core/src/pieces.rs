//! Piece types, movement patterns and stepping

use serde::{Deserialize, Serialize};

use crate::position::{Colour, Direction, Position, PositionError};

use Direction::{Backward as B, Forward as F, Left as L, Right as R};

/// One atomic movement pattern, applied direction by direction
pub type Step = &'static [Direction];

/// Maximum repetitions of one step for sliding pieces
pub const SLIDER_REPS: usize = 8;

/// Index of the pawn's single advance within `PAWN_STEPS`
pub const PAWN_ADVANCE: usize = 0;
/// Index of the pawn's double advance within `PAWN_STEPS`
pub const PAWN_DOUBLE_ADVANCE: usize = 1;

static PAWN_STEPS: [Step; 6] = [&[F], &[F, F], &[F, L], &[L, F], &[F, R], &[R, F]];

static KNIGHT_STEPS: [Step; 16] = [
    &[F, F, L], &[F, F, R], &[F, L, L], &[F, R, R],
    &[B, B, L], &[B, B, R], &[B, L, L], &[B, R, R],
    &[L, L, F], &[L, L, B], &[L, F, F], &[L, B, B],
    &[R, R, F], &[R, R, B], &[R, F, F], &[R, B, B],
];

static BISHOP_STEPS: [Step; 8] = [&[F, L], &[F, R], &[L, F], &[R, F], &[B, L], &[B, R], &[L, B], &[R, B]];

static ROOK_STEPS: [Step; 4] = [&[F], &[B], &[L], &[R]];

/// Kings and queens share steps; only the queen may repeat them
static ROYAL_STEPS: [Step; 12] = [
    &[F, L], &[F, R], &[L, F], &[R, F], &[B, L], &[B, R], &[L, B], &[R, B],
    &[F], &[B], &[L], &[R],
];

/// Kind of piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Material value; the king is worth more than everything else combined
    pub fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 1,
            PieceType::Knight | PieceType::Bishop => 3,
            PieceType::Rook => 5,
            PieceType::Queen => 9,
            PieceType::King => 40,
        }
    }

    /// Movement patterns available to this type
    pub fn steps(self) -> &'static [Step] {
        match self {
            PieceType::Pawn => &PAWN_STEPS,
            PieceType::Knight => &KNIGHT_STEPS,
            PieceType::Bishop => &BISHOP_STEPS,
            PieceType::Rook => &ROOK_STEPS,
            PieceType::Queen | PieceType::King => &ROYAL_STEPS,
        }
    }

    /// How many times one step may be repeated in a single move
    pub fn step_reps(self) -> usize {
        if self.is_slider() {
            SLIDER_REPS
        } else {
            1
        }
    }

    pub fn is_slider(self) -> bool {
        matches!(self, PieceType::Rook | PieceType::Bishop | PieceType::Queen)
    }

    /// Unicode chess glyph
    pub fn symbol(self) -> char {
        match self {
            PieceType::King => '\u{265A}',
            PieceType::Queen => '\u{265B}',
            PieceType::Rook => '\u{265C}',
            PieceType::Bishop => '\u{265D}',
            PieceType::Knight => '\u{265E}',
            PieceType::Pawn => '\u{265F}',
        }
    }

    /// Single-letter code (knights are `N`)
    pub fn letter(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }
}

/// Identity of a piece within one board
pub type PieceId = u16;

/// A piece on the board.
///
/// Equality includes the identity, so two blue pawns are never equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceType,
    pub colour: Colour,
    pub id: PieceId,
}

impl Piece {
    pub fn value(&self) -> i32 {
        self.kind.value()
    }

    /// Walk one step pattern from `from`.
    ///
    /// Directions are mirrored once the walk crosses into another section,
    /// and from the outset when `reverse` is set. A pawn standing in a
    /// foreign section always has its directions mirrored, since its own
    /// forward points back toward its home side there.
    pub fn walk(&self, step: &[Direction], from: Position, mut reverse: bool) -> Result<Position, PositionError> {
        let mut current = from;
        for &direction in step {
            let foreign_pawn = self.kind == PieceType::Pawn && current.colour() != self.colour;
            let direction = if reverse || foreign_pawn { direction.reverse() } else { direction };
            let next = current.neighbour(direction)?;
            if next.colour() != current.colour() {
                reverse = true;
            }
            current = next;
        }
        Ok(current)
    }
}
